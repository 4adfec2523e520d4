use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::datetime::{self, parse_date};
use crate::store::TaskRepository;
use crate::time_entry::{NewTask, NewTimeEntry, Status, Task, TaskChanges};

/// `add`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct AddArgs {
    #[clap(short = 'u', long = "user", help = "Username of the owner of the task")]
    user: String,

    #[clap(short = 'n', long = "name", help = "Name of the task")]
    name: String,

    #[clap(long = "description", default_value = "", help = "Description of the task")]
    description: String,

    #[clap(
        short = 'e',
        long = "estimate",
        help = "Creates the first time entry with the estimate, e.g. \"3h 30m\""
    )]
    estimate: Option<String>,

    #[clap(
        short = 'd',
        long = "date",
        help = "Start date of the time entry in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    date: Option<NaiveDate>,

    #[clap(
        short = 's',
        long = "status",
        default_value = "pendente",
        help = "Status of the time entry: pendente, em_andamento, feito or reavaliar"
    )]
    status: Status,

    #[clap(
        long = "entry-description",
        default_value = "",
        help = "Description of the time entry"
    )]
    entry_description: String,
}

/// `update`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct UpdateArgs {
    #[clap(help = "Id of the task")]
    id: u64,

    #[clap(short = 'u', long = "user", help = "New owner of the task")]
    user: Option<String>,

    #[clap(short = 'n', long = "name", help = "New name of the task")]
    name: Option<String>,

    #[clap(long = "description", help = "New description of the task")]
    description: Option<String>,
}

/// `delete`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct DeleteArgs {
    #[clap(help = "Id of the task")]
    id: u64,
}

/// タスクの作成、更新、削除を行うコマンド。
pub struct TaskCommand<'a, T: TaskRepository> {
    repository: &'a T,
}

impl<'a, T: TaskRepository> TaskCommand<'a, T> {
    /// 新しい`TaskCommand`を返す。
    pub fn new(repository: &'a T) -> Self {
        Self { repository }
    }

    /// `add`サブコマンドの処理を行う。
    ///
    /// 見積もりが指定された場合は、最初のタイムエントリーも作成する。
    /// 開始日が指定されていない場合は、今日の日付を利用する。
    pub fn add(&self, add: AddArgs) -> Result<Task> {
        let entry = add.estimate.map(|estimated_time| NewTimeEntry {
            date: add.date.unwrap_or_else(datetime::today),
            estimated_time,
            description: add.entry_description,
            status: add.status,
        });
        let task = NewTask {
            user: add.user,
            name: add.name,
            description: add.description,
        };

        let created = self
            .repository
            .create_task(task, entry)
            .context("Failed to create task")?;
        info!("Task {} created.", created.id);

        Ok(created)
    }

    /// `update`サブコマンドの処理を行う。
    pub fn update(&self, update: UpdateArgs) -> Result<Task> {
        let changes = TaskChanges {
            user: update.user,
            name: update.name,
            description: update.description,
        };

        let updated = self
            .repository
            .update_task(update.id, changes)
            .with_context(|| format!("Failed to update task {}", update.id))?;
        info!("Task {} updated.", updated.id);

        Ok(updated)
    }

    /// `delete`サブコマンドの処理を行い、削除したタスクのidを返す。
    ///
    /// タスクのタイムエントリーも削除される。
    pub fn delete(&self, delete: DeleteArgs) -> Result<u64> {
        self.repository
            .delete_task(delete.id)
            .with_context(|| format!("Failed to delete task {}", delete.id))?;
        info!("Task {} deleted.", delete.id);

        Ok(delete.id)
    }
}
