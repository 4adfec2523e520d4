use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;

mod console;
mod datetime;
mod duration;
mod entry_command;
mod hours_command;
mod list_command;
mod logger;
mod profile;
mod store;
mod summary;
mod task_command;
mod time_entry;
mod user_command;

use console::{ConsoleMarkdownList, ConsolePresenter};
use entry_command::{DeleteEntryArgs, EditEntryArgs, EntryCommand, LogArgs, StatusArgs};
use hours_command::{hours_command, HoursArgs};
use list_command::{ListArgs, ListCommand};
use store::JsonFileStore;
use task_command::{AddArgs, DeleteArgs, TaskCommand, UpdateArgs};
use user_command::{PositionArgs, PositionSubCommands, UserArgs, UserCommand, UserSubCommands};

/// タスクとタイムエントリーを管理し、見積もり時間を集計するCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- user add alice -m alice@example.com
/// $ cargo run -- add -u alice -n "Write docs" -e "3h 30m"
/// $ cargo run -- list
/// $ cargo run -- hours "1w 3d 2h 45m"
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(
        long = "store",
        env = "TASKHOURS_STORE",
        global = true,
        parse(from_os_str),
        help = "Path of the JSON file that stores users and tasks"
    )]
    store: Option<PathBuf>,

    #[clap(
        short = 'v',
        long = "verbose",
        global = true,
        parse(from_occurrences),
        help = "Increases log verbosity"
    )]
    verbose: u64,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Lists tasks with the total of their estimates
    List(ListArgs),
    /// Converts estimates to hours
    Hours(HoursArgs),
    /// Creates a task
    Add(AddArgs),
    /// Updates a task
    Update(UpdateArgs),
    /// Deletes a task and its time entries
    Delete(DeleteArgs),
    /// Adds a time entry to a task
    Log(LogArgs),
    /// Edits a time entry
    EditEntry(EditEntryArgs),
    /// Deletes a time entry
    DeleteEntry(DeleteEntryArgs),
    /// Changes the status of the time entries of a task
    Status(StatusArgs),
    /// Manages users
    User(UserArgs),
    /// Manages positions
    Position(PositionArgs),
}

fn main() -> Result<()> {
    let args = Args::parse();

    logger::init(args.verbose)?;

    let store_path = match args.store {
        Some(path) => path,
        None => store::default_store_path()?,
    };
    info!("Store: {}", store_path.display());
    let repository = JsonFileStore::new(store_path);

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut presenter = ConsoleMarkdownList::new(&mut writer);

    match args.subcommand {
        SubCommands::List(list) => {
            let summaries = ListCommand::new(&repository).run(list)?;
            presenter.show_task_summaries(&summaries)?;
        }
        SubCommands::Hours(hours) => {
            let estimates = hours_command(hours);
            presenter.show_estimates(&estimates)?;
        }
        SubCommands::Add(add) => {
            let task = TaskCommand::new(&repository).add(add)?;
            presenter.show_message(&format!("Task #{} created.", task.id))?;
        }
        SubCommands::Update(update) => {
            let task = TaskCommand::new(&repository).update(update)?;
            presenter.show_message(&format!("Task #{} updated.", task.id))?;
        }
        SubCommands::Delete(delete) => {
            let id = TaskCommand::new(&repository).delete(delete)?;
            presenter.show_message(&format!("Task #{} deleted.", id))?;
        }
        SubCommands::Log(log_args) => {
            let entry = EntryCommand::new(&repository).log(log_args)?;
            presenter.show_message(&format!(
                "Time entry #{} added to task #{}: {:.2}h",
                entry.id,
                entry.task_id,
                entry.hours_estimated()
            ))?;
        }
        SubCommands::EditEntry(edit) => {
            let entry = EntryCommand::new(&repository).edit(edit)?;
            presenter.show_message(&format!(
                "Time entry #{} updated: {:.2}h",
                entry.id,
                entry.hours_estimated()
            ))?;
        }
        SubCommands::DeleteEntry(delete) => {
            let id = EntryCommand::new(&repository).delete(delete)?;
            presenter.show_message(&format!("Time entry #{} deleted.", id))?;
        }
        SubCommands::Status(status) => {
            let updated = EntryCommand::new(&repository).status(status)?;
            presenter.show_message(&format!("{} time entries updated.", updated))?;
        }
        SubCommands::User(user) => {
            let command = UserCommand::new(&repository);
            match user.subcommand {
                UserSubCommands::Add(add) => {
                    let user = command.add(add)?;
                    presenter.show_message(&format!("User #{} created.", user.id))?;
                }
                UserSubCommands::List => {
                    let profiles = command.list()?;
                    presenter.show_profiles(&profiles)?;
                }
                UserSubCommands::Update(update) => {
                    let user = command.update(update)?;
                    presenter.show_message(&format!("User #{} updated.", user.id))?;
                }
                UserSubCommands::Delete(delete) => {
                    let deleted_tasks = command.delete(delete)?;
                    presenter.show_message(&format!(
                        "User deleted with {} tasks.",
                        deleted_tasks
                    ))?;
                }
            }
        }
        SubCommands::Position(position) => {
            let command = UserCommand::new(&repository);
            match position.subcommand {
                PositionSubCommands::Add(add) => {
                    let position = command.add_position(add)?;
                    presenter.show_message(&format!("Position #{} created.", position.id))?;
                }
                PositionSubCommands::List => {
                    let positions = command.list_positions()?;
                    presenter.show_positions(&positions)?;
                }
            }
        }
    }

    Ok(())
}
