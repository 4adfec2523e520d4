use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

/// `YYYY-MM-DD`形式の日付をパースする。
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}

#[cfg(not(test))]
/// ローカルタイムゾーンでの今日の日付を取得する。
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}


#[cfg(test)]
pub use mock_datetime::today;
