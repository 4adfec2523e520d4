use std::collections::HashMap;

use anyhow::{Context, Result};
use log::info;

use crate::store::TaskRepository;
use crate::summary::{self, TaskSummary};
use crate::time_entry::TimeEntry;

/// タスク一覧を出力するためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct ListArgs {
    #[clap(short = 'u', long = "user", help = "Shows only the tasks of the user")]
    user: Option<String>,
}

pub struct ListCommand<'a, T: TaskRepository> {
    repository: &'a T,
}

impl<'a, T: TaskRepository> ListCommand<'a, T> {
    /// 新しい`ListCommand`を返す。
    ///
    /// # Arguments
    /// * `repository` - タスクを保存しているリポジトリ
    pub fn new(repository: &'a T) -> Self {
        Self { repository }
    }

    /// `list`サブコマンドの処理を行う。
    ///
    /// タイムエントリーは一度だけ取得し、タスクごとにまとめて集計する。
    /// ユーザーが指定された場合は、そのユーザーのタスクのみを対象とする。
    ///
    /// # Arguments
    ///
    /// * `list` - `list`サブコマンドの引数
    pub fn run(&self, list: ListArgs) -> Result<Vec<TaskSummary>> {
        let tasks = self
            .repository
            .list_tasks()
            .context("Failed to retrieve tasks")?;
        info!("length of tasks: {}", tasks.len());
        let entries = self
            .repository
            .list_time_entries()
            .context("Failed to retrieve time entries")?;
        info!("length of time entries: {}", entries.len());

        let entries_by_task =
            entries
                .into_iter()
                .fold(HashMap::new(), |mut acc: HashMap<u64, Vec<TimeEntry>>, entry| {
                    acc.entry(entry.task_id).or_default().push(entry);
                    acc
                });

        Ok(tasks
            .iter()
            .filter(|task| list.user.as_ref().map_or(true, |user| &task.user == user))
            .map(|task| {
                let entries = entries_by_task
                    .get(&task.id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                summary::summarize_task(task, entries)
            })
            .collect())
    }
}
