use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{info, warn};

use crate::datetime::{self, parse_date};
use crate::store::TaskRepository;
use crate::time_entry::{NewTimeEntry, Status, TimeEntry, TimeEntryChanges};

/// `log`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct LogArgs {
    #[clap(help = "Id of the task")]
    task_id: u64,

    #[clap(short = 'e', long = "estimate", help = "Estimate, e.g. \"1w 3d 2h 45m\"")]
    estimate: String,

    #[clap(
        short = 'd',
        long = "date",
        help = "Start date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    date: Option<NaiveDate>,

    #[clap(
        short = 's',
        long = "status",
        default_value = "pendente",
        help = "Status: pendente, em_andamento, feito or reavaliar"
    )]
    status: Status,

    #[clap(long = "description", default_value = "", help = "What was done")]
    description: String,
}

/// `status`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct StatusArgs {
    #[clap(help = "Id of the task")]
    task_id: u64,

    #[clap(help = "New status: pendente, em_andamento, feito or reavaliar")]
    status: Status,
}

/// `edit-entry`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct EditEntryArgs {
    #[clap(help = "Id of the time entry")]
    id: u64,

    #[clap(short = 'e', long = "estimate", help = "New estimate, e.g. \"3h 30m\"")]
    estimate: Option<String>,

    #[clap(
        short = 'd',
        long = "date",
        help = "New start date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    date: Option<NaiveDate>,

    #[clap(
        short = 's',
        long = "status",
        help = "New status: pendente, em_andamento, feito or reavaliar"
    )]
    status: Option<Status>,

    #[clap(long = "description", help = "New description")]
    description: Option<String>,
}

/// `delete-entry`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct DeleteEntryArgs {
    #[clap(help = "Id of the time entry")]
    id: u64,
}

/// タイムエントリーの追加、編集、削除と状態の更新を行うコマンド。
pub struct EntryCommand<'a, T: TaskRepository> {
    repository: &'a T,
}

impl<'a, T: TaskRepository> EntryCommand<'a, T> {
    /// 新しい`EntryCommand`を返す。
    pub fn new(repository: &'a T) -> Self {
        Self { repository }
    }

    /// `log`サブコマンドの処理を行う。
    ///
    /// 開始日が指定されていない場合は、今日の日付を利用する。
    pub fn log(&self, log_args: LogArgs) -> Result<TimeEntry> {
        let entry = NewTimeEntry {
            date: log_args.date.unwrap_or_else(datetime::today),
            estimated_time: log_args.estimate,
            description: log_args.description,
            status: log_args.status,
        };

        let created = self
            .repository
            .add_time_entry(log_args.task_id, entry)
            .with_context(|| format!("Failed to add time entry to task {}", log_args.task_id))?;
        info!(
            "Time entry {} added: {} hours",
            created.id,
            created.hours_estimated()
        );

        Ok(created)
    }

    /// `edit-entry`サブコマンドの処理を行う。指定された項目だけを変更する。
    pub fn edit(&self, edit: EditEntryArgs) -> Result<TimeEntry> {
        let changes = TimeEntryChanges {
            date: edit.date,
            estimated_time: edit.estimate,
            description: edit.description,
            status: edit.status,
        };

        let updated = self
            .repository
            .update_time_entry(edit.id, changes)
            .with_context(|| format!("Failed to update time entry {}", edit.id))?;
        info!(
            "Time entry {} updated: {} hours",
            updated.id,
            updated.hours_estimated()
        );

        Ok(updated)
    }

    /// `delete-entry`サブコマンドの処理を行い、削除したタイムエントリーのidを返す。
    pub fn delete(&self, delete: DeleteEntryArgs) -> Result<u64> {
        self.repository
            .delete_time_entry(delete.id)
            .with_context(|| format!("Failed to delete time entry {}", delete.id))?;
        info!("Time entry {} deleted.", delete.id);

        Ok(delete.id)
    }

    /// `status`サブコマンドの処理を行う。
    ///
    /// タイムエントリーがないタスクの場合は何もせず、エラーにもしない。
    pub fn status(&self, status: StatusArgs) -> Result<usize> {
        let updated = self
            .repository
            .update_status(status.task_id, status.status)
            .with_context(|| format!("Failed to update status of task {}", status.task_id))?;
        if updated == 0 {
            warn!("Task {} has no time entry to update.", status.task_id);
        } else {
            info!(
                "Task {}: {} time entries set to {}.",
                status.task_id,
                updated,
                status.status.label()
            );
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mockall::predicate::eq;
    use rstest::rstest;

    use super::{DeleteEntryArgs, EditEntryArgs, EntryCommand, LogArgs, StatusArgs};
    use crate::datetime::mock_datetime;
    use crate::store::MockTaskRepository;
    use crate::time_entry::{NewTimeEntry, Status, TimeEntry, TimeEntryChanges};

    fn created_entry(task_id: u64, entry: &NewTimeEntry) -> TimeEntry {
        TimeEntry {
            id: 10,
            task_id,
            date: entry.date,
            estimated_time: entry.estimated_time.clone(),
            description: entry.description.clone(),
            status: entry.status,
        }
    }

    #[test]
    fn test_log_with_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let args = LogArgs {
            task_id: 1,
            estimate: "1h".to_string(),
            date: Some(date),
            status: Status::Done,
            description: "review".to_string(),
        };
        let expected = NewTimeEntry {
            date,
            estimated_time: "1h".to_string(),
            description: "review".to_string(),
            status: Status::Done,
        };
        let mut repository = MockTaskRepository::new();
        repository
            .expect_add_time_entry()
            .with(eq(1), eq(expected))
            .times(1)
            .returning(|task_id, entry| Ok(created_entry(task_id, &entry)));

        let command = EntryCommand::new(&repository);
        let result = command.log(args).unwrap();

        assert_eq!(result.task_id, 1);
        assert_eq!(result.hours_estimated(), 1.0);
    }

    /// 開始日が指定されていない場合は今日の日付を利用する。
    #[test]
    fn test_log_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 10, 19).unwrap();
        mock_datetime::set_mock_date(today);
        let args = LogArgs {
            task_id: 2,
            estimate: "45m".to_string(),
            date: None,
            status: Status::Pending,
            description: String::new(),
        };
        let mut repository = MockTaskRepository::new();
        repository
            .expect_add_time_entry()
            .withf(move |task_id, entry| *task_id == 2 && entry.date == today)
            .times(1)
            .returning(|task_id, entry| Ok(created_entry(task_id, &entry)));

        let command = EntryCommand::new(&repository);
        let result = command.log(args).unwrap();

        assert_eq!(result.date, today);
        mock_datetime::clear_mock_date();
    }

    #[test]
    fn test_log_unknown_task() {
        let args = LogArgs {
            task_id: 99,
            estimate: "1h".to_string(),
            date: None,
            status: Status::Pending,
            description: String::new(),
        };
        let mut repository = MockTaskRepository::new();
        repository
            .expect_add_time_entry()
            .times(1)
            .returning(|task_id, _| Err(anyhow::anyhow!("Task not found: {}", task_id)));

        let command = EntryCommand::new(&repository);

        assert!(command.log(args).is_err());
    }

    #[rstest]
    #[case::updated(1)]
    #[case::no_entry(0)]
    fn test_status(#[case] updated: usize) {
        let args = StatusArgs {
            task_id: 3,
            status: Status::Reassess,
        };
        let mut repository = MockTaskRepository::new();
        repository
            .expect_update_status()
            .with(eq(3), eq(Status::Reassess))
            .times(1)
            .returning(move |_, _| Ok(updated));

        let command = EntryCommand::new(&repository);
        let result = command.status(args).unwrap();

        assert_eq!(result, updated);
    }

    #[test]
    fn test_edit() {
        let args = EditEntryArgs {
            id: 5,
            estimate: Some("2h 30m".to_string()),
            date: None,
            status: Some(Status::InProgress),
            description: None,
        };
        let expected = TimeEntryChanges {
            estimated_time: Some("2h 30m".to_string()),
            status: Some(Status::InProgress),
            ..Default::default()
        };
        let mut repository = MockTaskRepository::new();
        repository
            .expect_update_time_entry()
            .with(eq(5), eq(expected))
            .times(1)
            .returning(|id, changes| {
                let mut entry = TimeEntry {
                    id,
                    task_id: 1,
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    estimated_time: "2h".to_string(),
                    description: String::new(),
                    status: Status::Pending,
                };
                changes.apply(&mut entry);
                Ok(entry)
            });

        let command = EntryCommand::new(&repository);
        let result = command.edit(args).unwrap();

        assert_eq!(result.id, 5);
        assert_eq!(result.hours_estimated(), 2.5);
        assert_eq!(result.status, Status::InProgress);
    }

    #[test]
    fn test_edit_unknown_entry() {
        let args = EditEntryArgs {
            id: 99,
            estimate: None,
            date: None,
            status: Some(Status::Done),
            description: None,
        };
        let mut repository = MockTaskRepository::new();
        repository
            .expect_update_time_entry()
            .times(1)
            .returning(|id, _| Err(anyhow::anyhow!("Time entry not found: {}", id)));

        let command = EntryCommand::new(&repository);

        assert!(command.edit(args).is_err());
    }

    #[rstest]
    #[case::deleted(true)]
    #[case::not_found(false)]
    fn test_delete(#[case] exists: bool) {
        let args = DeleteEntryArgs { id: 7 };
        let mut repository = MockTaskRepository::new();
        repository
            .expect_delete_time_entry()
            .with(eq(7))
            .times(1)
            .returning(move |id| {
                if exists {
                    Ok(())
                } else {
                    Err(anyhow::anyhow!("Time entry not found: {}", id))
                }
            });

        let command = EntryCommand::new(&repository);
        let result = command.delete(args);

        assert_eq!(result.ok(), exists.then(|| 7));
    }
}
