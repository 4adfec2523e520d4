use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::datetime::parse_date;
use crate::profile::{NewUser, Position, Profile, User, UserChanges};
use crate::store::TaskRepository;

/// `user`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct UserArgs {
    #[clap(subcommand)]
    pub subcommand: UserSubCommands,
}

/// `user`サブコマンドの操作を表す列挙型。
#[derive(Debug, clap::Subcommand)]
pub enum UserSubCommands {
    /// Registers a user
    Add(UserAddArgs),
    /// Lists users with their positions
    List,
    /// Updates the profile of a user
    Update(UserUpdateArgs),
    /// Deletes a user and the tasks of the user
    Delete(UserDeleteArgs),
}

#[derive(Debug, clap::Args)]
pub struct UserAddArgs {
    #[clap(help = "Username, used as the owner of tasks")]
    username: String,

    #[clap(short = 'm', long = "email", help = "Email address")]
    email: String,

    #[clap(long = "first-name", default_value = "", help = "First name")]
    first_name: String,

    #[clap(long = "last-name", default_value = "", help = "Last name")]
    last_name: String,

    #[clap(short = 'p', long = "position", help = "Id of the position")]
    position_id: Option<u64>,

    #[clap(long = "phone", help = "Phone number")]
    phone: Option<String>,

    #[clap(
        long = "birth",
        help = "Birth date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    birth: Option<NaiveDate>,

    #[clap(long = "description", default_value = "", help = "About the user")]
    description: String,
}

#[derive(Debug, clap::Args)]
pub struct UserUpdateArgs {
    #[clap(help = "Id of the user")]
    id: u64,

    #[clap(short = 'm', long = "email", help = "New email address")]
    email: Option<String>,

    #[clap(long = "first-name", help = "New first name")]
    first_name: Option<String>,

    #[clap(long = "last-name", help = "New last name")]
    last_name: Option<String>,

    #[clap(short = 'p', long = "position", help = "Id of the new position")]
    position_id: Option<u64>,

    #[clap(long = "phone", help = "New phone number")]
    phone: Option<String>,

    #[clap(
        long = "birth",
        help = "New birth date in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    birth: Option<NaiveDate>,

    #[clap(long = "description", help = "New description")]
    description: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct UserDeleteArgs {
    #[clap(help = "Id of the user")]
    id: u64,
}

/// `position`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct PositionArgs {
    #[clap(subcommand)]
    pub subcommand: PositionSubCommands,
}

/// `position`サブコマンドの操作を表す列挙型。
#[derive(Debug, clap::Subcommand)]
pub enum PositionSubCommands {
    /// Registers a position
    Add(PositionAddArgs),
    /// Lists positions
    List,
}

#[derive(Debug, clap::Args)]
pub struct PositionAddArgs {
    #[clap(help = "Name of the position")]
    name: String,
}

/// ユーザーと役職の管理を行うコマンド。
pub struct UserCommand<'a, T: TaskRepository> {
    repository: &'a T,
}

impl<'a, T: TaskRepository> UserCommand<'a, T> {
    /// 新しい`UserCommand`を返す。
    pub fn new(repository: &'a T) -> Self {
        Self { repository }
    }

    /// `user add`サブコマンドの処理を行う。
    pub fn add(&self, add: UserAddArgs) -> Result<User> {
        let user = NewUser {
            username: add.username,
            email: add.email,
            first_name: add.first_name,
            last_name: add.last_name,
            position_id: add.position_id,
            phone: add.phone,
            birth: add.birth,
            description: add.description,
        };

        let created = self
            .repository
            .create_user(user)
            .context("Failed to create user")?;
        info!("User {} created: {}", created.id, created.username);

        Ok(created)
    }

    /// `user list`サブコマンドの処理を行う。
    ///
    /// 役職はidから名前に置き換える。見つからない役職は`None`になる。
    pub fn list(&self) -> Result<Vec<Profile>> {
        let users = self
            .repository
            .list_users()
            .context("Failed to retrieve users")?;
        let positions = self
            .repository
            .list_positions()
            .context("Failed to retrieve positions")?;
        info!("length of users: {}", users.len());

        Ok(users
            .into_iter()
            .map(|user| {
                let position = user.position_id.and_then(|id| {
                    positions
                        .iter()
                        .find(|position| position.id == id)
                        .map(|position| position.name.clone())
                });
                Profile { user, position }
            })
            .collect())
    }

    /// `user update`サブコマンドの処理を行う。ユーザー名は変更できない。
    pub fn update(&self, update: UserUpdateArgs) -> Result<User> {
        let changes = UserChanges {
            email: update.email,
            first_name: update.first_name,
            last_name: update.last_name,
            position_id: update.position_id,
            phone: update.phone,
            birth: update.birth,
            description: update.description,
        };

        let updated = self
            .repository
            .update_user(update.id, changes)
            .with_context(|| format!("Failed to update user {}", update.id))?;
        info!("User {} updated.", updated.id);

        Ok(updated)
    }

    /// `user delete`サブコマンドの処理を行い、削除したタスクの件数を返す。
    ///
    /// ユーザーが担当するタスクとそのタイムエントリーも削除される。
    pub fn delete(&self, delete: UserDeleteArgs) -> Result<usize> {
        let deleted_tasks = self
            .repository
            .delete_user(delete.id)
            .with_context(|| format!("Failed to delete user {}", delete.id))?;
        info!("User {} deleted with {} tasks.", delete.id, deleted_tasks);

        Ok(deleted_tasks)
    }

    /// `position add`サブコマンドの処理を行う。
    pub fn add_position(&self, add: PositionAddArgs) -> Result<Position> {
        let created = self
            .repository
            .create_position(add.name)
            .context("Failed to create position")?;
        info!("Position {} created: {}", created.id, created.name);

        Ok(created)
    }

    /// `position list`サブコマンドの処理を行う。
    pub fn list_positions(&self) -> Result<Vec<Position>> {
        self.repository
            .list_positions()
            .context("Failed to retrieve positions")
    }
}
