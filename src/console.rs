use std::io::Write;

use anyhow::{Context, Result};

use crate::hours_command::Estimate;
use crate::profile::{Position, Profile};
use crate::summary::{TaskSummary, DISPLAY_DATE_FORMAT};

/// Consoleに結果を表示するためのtrait。
pub trait ConsolePresenter {
    /// タスク一覧を表示する。
    ///
    /// # Arguments
    ///
    /// * `summaries` - 表示するタスク
    fn show_task_summaries(&mut self, summaries: &[TaskSummary]) -> Result<()>;

    /// 見積もり文字列とその換算結果を表示する。
    fn show_estimates(&mut self, estimates: &[Estimate]) -> Result<()>;

    /// ユーザーの一覧を表示する。
    fn show_profiles(&mut self, profiles: &[Profile]) -> Result<()>;

    /// 役職の一覧を表示する。
    fn show_positions(&mut self, positions: &[Position]) -> Result<()>;

    /// 処理結果のメッセージを表示する。
    fn show_message(&mut self, message: &str) -> Result<()>;
}

/// Markdownのlist形式で表示する。
pub struct ConsoleMarkdownList<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleMarkdownList<'a, W> {
    /// 新しい`ConsoleMarkdownList`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }

    fn write_task_summary(&mut self, summary: &TaskSummary) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "- #{} {} ({}, {})",
            summary.id, summary.name, summary.user, summary.created_at
        )?;
        if !summary.description.is_empty() {
            writeln!(self.writer, "  - description: {}", summary.description)?;
        }
        writeln!(self.writer, "  - estimated: {}", summary.time.estimated_hours)?;
        writeln!(self.writer, "  - start: {}", summary.time.start_dates)?;
        writeln!(self.writer, "  - status: {}", summary.time.statuses)?;
        writeln!(self.writer, "  - total: {:.2}h", summary.time.total_hours)
    }

    fn write_profile(&mut self, profile: &Profile) -> std::io::Result<()> {
        let user = &profile.user;
        writeln!(self.writer, "- #{} {} <{}>", user.id, user.username, user.email)?;
        let full_name = user.full_name();
        if !full_name.is_empty() {
            writeln!(self.writer, "  - name: {}", full_name)?;
        }
        if let Some(position) = &profile.position {
            writeln!(self.writer, "  - position: {}", position)?;
        }
        if let Some(phone) = &user.phone {
            writeln!(self.writer, "  - phone: {}", phone)?;
        }
        if let Some(birth) = user.birth {
            writeln!(self.writer, "  - birth: {}", birth.format(DISPLAY_DATE_FORMAT))?;
        }
        if !user.description.is_empty() {
            writeln!(self.writer, "  - description: {}", user.description)?;
        }
        Ok(())
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdownList<'a, W> {
    // タスクごとにタイムエントリーの集計結果を入れ子のlist形式で表示する。
    fn show_task_summaries(&mut self, summaries: &[TaskSummary]) -> Result<()> {
        for summary in summaries {
            self.write_task_summary(summary)
                .with_context(|| format!("Failed to write task: {:?}", summary))?;
        }

        Ok(())
    }

    fn show_estimates(&mut self, estimates: &[Estimate]) -> Result<()> {
        for estimate in estimates {
            writeln!(self.writer, "- {}: {:.2}", estimate.input, estimate.hours)
                .with_context(|| format!("Failed to write estimate: {:?}", estimate))?;
        }

        Ok(())
    }

    fn show_profiles(&mut self, profiles: &[Profile]) -> Result<()> {
        for profile in profiles {
            self.write_profile(profile)
                .with_context(|| format!("Failed to write user: {:?}", profile))?;
        }

        Ok(())
    }

    fn show_positions(&mut self, positions: &[Position]) -> Result<()> {
        for position in positions {
            writeln!(self.writer, "- #{} {}", position.id, position.name)
                .with_context(|| format!("Failed to write position: {:?}", position))?;
        }

        Ok(())
    }

    fn show_message(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{}", message).context("Failed to write message")?;
        Ok(())
    }
}
