use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use log::{debug, info};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::datetime;
use crate::profile::{self, NewUser, Position, User, UserChanges};
use crate::time_entry::{
    NewTask, NewTimeEntry, Status, Task, TaskChanges, TimeEntry, TimeEntryChanges,
};

/// ユーザー、タスク、タイムエントリーを保存するためのtrait。
#[cfg_attr(test, automock)]
pub trait TaskRepository {
    /// 全てのタスクをid順に取得する。
    fn list_tasks(&self) -> Result<Vec<Task>>;

    /// 全てのタイムエントリーをid順に取得する。
    fn list_time_entries(&self) -> Result<Vec<TimeEntry>>;

    /// タスクを作成する。
    ///
    /// `entry`が指定された場合は、最初のタイムエントリーも同時に作成する。
    /// 担当者が登録されていない場合はエラーを返す。
    fn create_task(&self, task: NewTask, entry: Option<NewTimeEntry>) -> Result<Task>;

    /// タスクを更新する。存在しないidや未登録の担当者の場合はエラーを返す。
    fn update_task(&self, id: u64, changes: TaskChanges) -> Result<Task>;

    /// タスクとそのタイムエントリーを削除する。存在しないidの場合はエラーを返す。
    fn delete_task(&self, id: u64) -> Result<()>;

    /// タスクにタイムエントリーを追加する。
    fn add_time_entry(&self, task_id: u64, entry: NewTimeEntry) -> Result<TimeEntry>;

    /// タイムエントリーを更新する。存在しないidの場合はエラーを返す。
    fn update_time_entry(&self, id: u64, changes: TimeEntryChanges) -> Result<TimeEntry>;

    /// タイムエントリーを削除する。存在しないidの場合はエラーを返す。
    fn delete_time_entry(&self, id: u64) -> Result<()>;

    /// タスクの全てのタイムエントリーの状態を更新し、更新した件数を返す。
    fn update_status(&self, task_id: u64, status: Status) -> Result<usize>;

    /// 全てのユーザーをid順に取得する。
    fn list_users(&self) -> Result<Vec<User>>;

    /// ユーザーを作成する。ユーザー名とメールアドレスは重複できない。
    fn create_user(&self, user: NewUser) -> Result<User>;

    /// ユーザーを更新する。存在しないidの場合はエラーを返す。
    fn update_user(&self, id: u64, changes: UserChanges) -> Result<User>;

    /// ユーザーと、そのユーザーが担当するタスクを削除し、削除したタスクの件数を返す。
    fn delete_user(&self, id: u64) -> Result<usize>;

    /// 全ての役職をid順に取得する。
    fn list_positions(&self) -> Result<Vec<Position>>;

    /// 役職を作成する。
    fn create_position(&self, name: String) -> Result<Position>;
}

/// ファイルに保存する内容。
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    last_task_id: u64,
    #[serde(default)]
    last_entry_id: u64,
    #[serde(default)]
    last_user_id: u64,
    #[serde(default)]
    last_position_id: u64,
    #[serde(default)]
    positions: Vec<Position>,
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    time_entries: Vec<TimeEntry>,
}

impl StoreData {
    fn next_task_id(&mut self) -> u64 {
        self.last_task_id += 1;
        self.last_task_id
    }

    fn next_entry_id(&mut self) -> u64 {
        self.last_entry_id += 1;
        self.last_entry_id
    }

    fn next_user_id(&mut self) -> u64 {
        self.last_user_id += 1;
        self.last_user_id
    }

    fn next_position_id(&mut self) -> u64 {
        self.last_position_id += 1;
        self.last_position_id
    }

    fn find_task_mut(&mut self, id: u64) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .with_context(|| format!("Task not found: {}", id))
    }

    fn find_time_entry_mut(&mut self, id: u64) -> Result<&mut TimeEntry> {
        self.time_entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .with_context(|| format!("Time entry not found: {}", id))
    }

    fn find_user_mut(&mut self, id: u64) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|user| user.id == id)
            .with_context(|| format!("User not found: {}", id))
    }

    fn ensure_username_exists(&self, username: &str) -> Result<()> {
        ensure!(
            self.users.iter().any(|user| user.username == username),
            "User not found: {}",
            username
        );
        Ok(())
    }

    fn ensure_position_exists(&self, position_id: Option<u64>) -> Result<()> {
        if let Some(id) = position_id {
            ensure!(
                self.positions.iter().any(|position| position.id == id),
                "Position not found: {}",
                id
            );
        }
        Ok(())
    }

    /// `except`以外のユーザーがメールアドレスを使っていないことを確認する。
    fn ensure_email_available(&self, email: &str, except: Option<u64>) -> Result<()> {
        ensure!(
            !self
                .users
                .iter()
                .any(|user| user.email == email && Some(user.id) != except),
            "Email already in use: {}",
            email
        );
        Ok(())
    }

    fn push_time_entry(&mut self, task_id: u64, entry: NewTimeEntry) -> TimeEntry {
        let time_entry = TimeEntry {
            id: self.next_entry_id(),
            task_id,
            date: entry.date,
            estimated_time: entry.estimated_time,
            description: entry.description,
            status: entry.status,
        };
        self.time_entries.push(time_entry.clone());
        time_entry
    }

    /// 指定されたタスクとそのタイムエントリーを削除する。
    fn remove_tasks(&mut self, task_ids: &HashSet<u64>) {
        self.tasks.retain(|task| !task_ids.contains(&task.id));
        self.time_entries
            .retain(|entry| !task_ids.contains(&entry.task_id));
    }
}

/// 1つのJSONファイルに全てのデータを保存するリポジトリ。
///
/// # Examples
///
/// ```
/// let store = JsonFileStore::new("store.json");
/// let tasks = store.list_tasks().unwrap();
/// ```
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// 新しい`JsonFileStore`を返す。ファイルは最初の書き込み時に作成される。
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// ファイルを読み込む。ファイルが存在しない、または空の場合は空の内容を返す。
    fn load(&self) -> Result<StoreData> {
        if !self.path.exists() {
            debug!("Store file does not exist yet: {}", self.path.display());
            return Ok(StoreData::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read store file: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(StoreData::default());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse store file: {}", self.path.display()))
    }

    /// 一時ファイルに書き込んでから置き換える。
    fn save(&self, data: &StoreData) -> Result<()> {
        let content = serde_json::to_string_pretty(data).context("Failed to serialize store")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace store file: {}", self.path.display()))?;
        debug!("Store saved: {}", self.path.display());

        Ok(())
    }

    /// 読み込んだ内容を変更して保存する。変更に失敗した場合は保存しない。
    fn modify<R>(&self, f: impl FnOnce(&mut StoreData) -> Result<R>) -> Result<R> {
        let mut data = self.load()?;
        let result = f(&mut data)?;
        self.save(&data)?;
        Ok(result)
    }
}

impl TaskRepository for JsonFileStore {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut tasks = self.load()?.tasks;
        tasks.sort_by_key(|task| task.id);
        Ok(tasks)
    }

    fn list_time_entries(&self) -> Result<Vec<TimeEntry>> {
        let mut entries = self.load()?.time_entries;
        entries.sort_by_key(|entry| entry.id);
        Ok(entries)
    }

    fn create_task(&self, task: NewTask, entry: Option<NewTimeEntry>) -> Result<Task> {
        task.validate().context("Invalid task")?;
        if let Some(entry) = &entry {
            entry.validate().context("Invalid time entry")?;
        }

        self.modify(|data| {
            data.ensure_username_exists(&task.user)?;
            let created = Task {
                id: data.next_task_id(),
                user: task.user,
                name: task.name,
                description: task.description,
                created_at: datetime::today(),
            };
            data.tasks.push(created.clone());
            if let Some(entry) = entry {
                data.push_time_entry(created.id, entry);
            }
            info!("Task created: {}", created.id);
            Ok(created)
        })
    }

    fn update_task(&self, id: u64, changes: TaskChanges) -> Result<Task> {
        changes.validate().context("Invalid task")?;

        self.modify(|data| {
            if let Some(user) = &changes.user {
                data.ensure_username_exists(user)?;
            }
            let task = data.find_task_mut(id)?;
            changes.apply(task);
            info!("Task updated: {}", id);
            Ok(task.clone())
        })
    }

    fn delete_task(&self, id: u64) -> Result<()> {
        self.modify(|data| {
            data.find_task_mut(id)?;
            data.remove_tasks(&HashSet::from([id]));
            info!("Task deleted: {}", id);
            Ok(())
        })
    }

    fn add_time_entry(&self, task_id: u64, entry: NewTimeEntry) -> Result<TimeEntry> {
        entry.validate().context("Invalid time entry")?;

        self.modify(|data| {
            data.find_task_mut(task_id)?;
            let created = data.push_time_entry(task_id, entry);
            info!("Time entry {} added to task {}", created.id, task_id);
            Ok(created)
        })
    }

    fn update_time_entry(&self, id: u64, changes: TimeEntryChanges) -> Result<TimeEntry> {
        changes.validate().context("Invalid time entry")?;

        self.modify(|data| {
            let entry = data.find_time_entry_mut(id)?;
            changes.apply(entry);
            info!("Time entry updated: {}", id);
            Ok(entry.clone())
        })
    }

    fn delete_time_entry(&self, id: u64) -> Result<()> {
        self.modify(|data| {
            data.find_time_entry_mut(id)?;
            data.time_entries.retain(|entry| entry.id != id);
            info!("Time entry deleted: {}", id);
            Ok(())
        })
    }

    fn update_status(&self, task_id: u64, status: Status) -> Result<usize> {
        self.modify(|data| {
            let mut updated = 0;
            for entry in data
                .time_entries
                .iter_mut()
                .filter(|entry| entry.task_id == task_id)
            {
                entry.status = status;
                updated += 1;
            }
            info!("Status of {} time entries set to {}", updated, status);
            Ok(updated)
        })
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let mut users = self.load()?.users;
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    fn create_user(&self, user: NewUser) -> Result<User> {
        user.validate().context("Invalid user")?;

        self.modify(|data| {
            ensure!(
                !data.users.iter().any(|u| u.username == user.username),
                "Username already in use: {}",
                user.username
            );
            data.ensure_email_available(&user.email, None)?;
            data.ensure_position_exists(user.position_id)?;
            let created = User {
                id: data.next_user_id(),
                username: user.username,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                position_id: user.position_id,
                phone: user.phone,
                birth: user.birth,
                description: user.description,
            };
            data.users.push(created.clone());
            info!("User created: {}", created.id);
            Ok(created)
        })
    }

    fn update_user(&self, id: u64, changes: UserChanges) -> Result<User> {
        changes.validate().context("Invalid user")?;

        self.modify(|data| {
            if let Some(email) = &changes.email {
                data.ensure_email_available(email, Some(id))?;
            }
            data.ensure_position_exists(changes.position_id)?;
            let user = data.find_user_mut(id)?;
            changes.apply(user);
            info!("User updated: {}", id);
            Ok(user.clone())
        })
    }

    fn delete_user(&self, id: u64) -> Result<usize> {
        self.modify(|data| {
            let username = data.find_user_mut(id)?.username.clone();
            let task_ids: HashSet<u64> = data
                .tasks
                .iter()
                .filter(|task| task.user == username)
                .map(|task| task.id)
                .collect();
            data.users.retain(|user| user.id != id);
            data.remove_tasks(&task_ids);
            info!("User {} deleted with {} tasks", id, task_ids.len());
            Ok(task_ids.len())
        })
    }

    fn list_positions(&self) -> Result<Vec<Position>> {
        let mut positions = self.load()?.positions;
        positions.sort_by_key(|position| position.id);
        Ok(positions)
    }

    fn create_position(&self, name: String) -> Result<Position> {
        profile::validate_position_name(&name).context("Invalid position")?;

        self.modify(|data| {
            let created = Position {
                id: data.next_position_id(),
                name,
            };
            data.positions.push(created.clone());
            info!("Position created: {}", created.id);
            Ok(created)
        })
    }
}

/// 保存先が指定されていない場合に利用するファイルのパスを返す。
pub fn default_store_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Failed to find the data directory")?;
    Ok(default_store_path_in(&data_dir))
}

fn default_store_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join("taskhours").join("store.json")
}
