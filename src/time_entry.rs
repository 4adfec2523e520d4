use std::fmt;
use std::str::FromStr;

use anyhow::{bail, ensure, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::duration;

/// タスク名の最大文字数。
pub const MAX_TASK_NAME_LEN: usize = 200;
/// 見積もり文字列の最大文字数。
pub const MAX_ESTIMATED_TIME_LEN: usize = 20;

/// タイムエントリーの状態。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "em_andamento")]
    InProgress,
    #[serde(rename = "feito")]
    Done,
    #[serde(rename = "reavaliar")]
    Reassess,
}

impl Status {
    /// 保存と表示に利用するキーを返す。
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pendente",
            Status::InProgress => "em_andamento",
            Status::Done => "feito",
            Status::Reassess => "reavaliar",
        }
    }

    /// 人が読むためのラベルを返す。
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pendente",
            Status::InProgress => "Em Andamento",
            Status::Done => "Feito",
            Status::Reassess => "Reavaliar",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pendente" => Ok(Status::Pending),
            "em_andamento" => Ok(Status::InProgress),
            "feito" => Ok(Status::Done),
            "reavaliar" => Ok(Status::Reassess),
            _ => bail!(
                "Unknown status: {} (expected pendente, em_andamento, feito or reavaliar)",
                s
            ),
        }
    }
}

/// ユーザーが担当するタスク。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    /// 担当者のユーザー名。
    pub user: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: NaiveDate,
}

/// タスクに対する見積もりと状態の記録。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    pub task_id: u64,
    /// 作業の開始日。
    pub date: NaiveDate,
    /// 見積もり文字列。入力された文字列のまま保持する。
    pub estimated_time: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
}

impl TimeEntry {
    /// 見積もり文字列を時間に換算した値を返す。
    pub fn hours_estimated(&self) -> f64 {
        duration::parse_hours(&self.estimated_time)
    }
}

/// 新しく作成するタスクの入力値。
#[derive(Clone, Debug, PartialEq)]
pub struct NewTask {
    pub user: String,
    pub name: String,
    pub description: String,
}

impl NewTask {
    /// 入力値を検証する。
    pub fn validate(&self) -> Result<()> {
        validate_user(&self.user)?;
        validate_task_name(&self.name)?;
        Ok(())
    }
}

/// 新しく作成するタイムエントリーの入力値。
#[derive(Clone, Debug, PartialEq)]
pub struct NewTimeEntry {
    pub date: NaiveDate,
    pub estimated_time: String,
    pub description: String,
    pub status: Status,
}

impl NewTimeEntry {
    /// 入力値を検証する。
    ///
    /// 見積もり文字列は空でなく、最大文字数以内である必要がある。
    /// 単位が読み取れない文字列でもエラーにはしない。
    pub fn validate(&self) -> Result<()> {
        validate_estimated_time(&self.estimated_time)
    }
}

/// タイムエントリーの更新内容。`None`の項目は変更しない。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeEntryChanges {
    pub date: Option<NaiveDate>,
    pub estimated_time: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
}

impl TimeEntryChanges {
    /// 入力値を検証する。
    pub fn validate(&self) -> Result<()> {
        if let Some(estimated_time) = &self.estimated_time {
            validate_estimated_time(estimated_time)?;
        }
        Ok(())
    }

    /// タイムエントリーに更新内容を反映する。
    pub fn apply(self, entry: &mut TimeEntry) {
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(estimated_time) = self.estimated_time {
            entry.estimated_time = estimated_time;
        }
        if let Some(description) = self.description {
            entry.description = description;
        }
        if let Some(status) = self.status {
            entry.status = status;
        }
    }
}

/// タスクの更新内容。`None`の項目は変更しない。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskChanges {
    pub user: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl TaskChanges {
    /// 入力値を検証する。
    pub fn validate(&self) -> Result<()> {
        if let Some(user) = &self.user {
            validate_user(user)?;
        }
        if let Some(name) = &self.name {
            validate_task_name(name)?;
        }
        Ok(())
    }

    /// タスクに更新内容を反映する。
    pub fn apply(self, task: &mut Task) {
        if let Some(user) = self.user {
            task.user = user;
        }
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
    }
}

fn validate_estimated_time(estimated_time: &str) -> Result<()> {
    ensure!(
        !estimated_time.trim().is_empty(),
        "Estimated time must not be empty"
    );
    ensure!(
        estimated_time.chars().count() <= MAX_ESTIMATED_TIME_LEN,
        "Estimated time must be at most {} characters: {}",
        MAX_ESTIMATED_TIME_LEN,
        estimated_time
    );
    Ok(())
}

fn validate_user(user: &str) -> Result<()> {
    ensure!(!user.trim().is_empty(), "User must not be empty");
    Ok(())
}

fn validate_task_name(name: &str) -> Result<()> {
    ensure!(!name.trim().is_empty(), "Task name must not be empty");
    ensure!(
        name.chars().count() <= MAX_TASK_NAME_LEN,
        "Task name must be at most {} characters",
        MAX_TASK_NAME_LEN
    );
    Ok(())
}
