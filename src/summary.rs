use crate::time_entry::{Task, TimeEntry};

/// 日付の表示形式。
pub const DISPLAY_DATE_FORMAT: &str = "%d-%m-%Y";

const SEPARATOR: &str = ", ";

/// 1タスク分のタイムエントリーの集計結果。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeEntrySummary {
    /// 見積もり時間の合計。
    pub total_hours: f64,
    /// 入力されたままの見積もり文字列。
    pub estimated_hours: String,
    /// 開始日。
    pub start_dates: String,
    /// 状態。
    pub statuses: String,
}

/// タスク一覧の1行分。
#[derive(Clone, Debug, PartialEq)]
pub struct TaskSummary {
    pub id: u64,
    pub name: String,
    pub user: String,
    pub description: String,
    /// タスクの作成日。
    pub created_at: String,
    pub time: TimeEntrySummary,
}

/// タイムエントリーを集計する。
///
/// 見積もり時間は合計し、表示用の項目は入力順に`", "`で連結する。
/// タイムエントリーが空の場合は合計0、表示用の項目は空文字列になる。
///
/// # Arguments
///
/// * `entries` - 1つのタスクに紐づくタイムエントリー
pub fn aggregate(entries: &[TimeEntry]) -> TimeEntrySummary {
    let total_hours: f64 = entries.iter().map(TimeEntry::hours_estimated).sum();
    let estimated_hours = join(entries.iter().map(|entry| entry.estimated_time.clone()));
    let start_dates = join(
        entries
            .iter()
            .map(|entry| entry.date.format(DISPLAY_DATE_FORMAT).to_string()),
    );
    let statuses = join(entries.iter().map(|entry| entry.status.to_string()));

    TimeEntrySummary {
        total_hours,
        estimated_hours,
        start_dates,
        statuses,
    }
}

/// タスクとそのタイムエントリーから一覧表示用の行を作成する。
pub fn summarize_task(task: &Task, entries: &[TimeEntry]) -> TaskSummary {
    TaskSummary {
        id: task.id,
        name: task.name.clone(),
        user: task.user.clone(),
        description: task.description.clone(),
        created_at: task.created_at.format(DISPLAY_DATE_FORMAT).to_string(),
        time: aggregate(entries),
    }
}

fn join(values: impl Iterator<Item = String>) -> String {
    values.collect::<Vec<_>>().join(SEPARATOR)
}
