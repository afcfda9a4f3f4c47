//! Timestamps - 时间戳解析与固定格式显示
//!
//! 上游服务返回的 `created_at` 统一按绝对时间 (UTC) 解析；
//! 不带时区的时间串视为 UTC。显示时使用固定的 en-GB 风格格式和
//! 固定的显示时区（由配置决定，默认 UTC），不做按用户的时区转换。

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 不带时区信息时尝试的格式
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// 显示格式（带秒）
const FULL_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";
/// 显示格式（不带秒，历史表格使用）
const SHORT_FORMAT: &str = "%d/%m/%Y, %H:%M";

/// 显示时区允许的最大偏移（分钟）
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// 显示时钟错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayClockError {
    #[error("Display offset {0} minutes is outside ±14 hours")]
    OffsetOutOfRange(i32),
}

/// 上游时间戳
///
/// 保留原始字符串；解析失败时显示原文而不是报错。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    raw: String,
    instant: Option<DateTime<Utc>>,
}

impl Timestamp {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let instant = parse_instant(raw.trim());
        Self { raw, instant }
    }

    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self {
            raw: instant.to_rfc3339(),
            instant: Some(instant),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.instant
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// 固定时区的显示时钟
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayClock {
    offset: FixedOffset,
}

impl DisplayClock {
    /// 以 UTC 偏移（分钟）创建
    pub fn new(utc_offset_minutes: i32) -> Result<Self, DisplayClockError> {
        if utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(DisplayClockError::OffsetOutOfRange(utc_offset_minutes));
        }
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
            .ok_or(DisplayClockError::OffsetOutOfRange(utc_offset_minutes))?;
        Ok(Self { offset })
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// 显示时区下的当天日期
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }

    /// 带秒格式，例如 `01/05/2024, 10:00:00`
    pub fn format_full(&self, timestamp: &Timestamp) -> String {
        self.format_with(timestamp, FULL_FORMAT)
    }

    /// 不带秒格式，例如 `01/05/2024, 10:00`
    pub fn format_short(&self, timestamp: &Timestamp) -> String {
        self.format_with(timestamp, SHORT_FORMAT)
    }

    fn format_with(&self, timestamp: &Timestamp, format: &str) -> String {
        match timestamp.instant() {
            Some(instant) => instant.with_timezone(&self.offset).format(format).to_string(),
            None => timestamp.raw().to_string(),
        }
    }
}

impl Default for DisplayClock {
    fn default() -> Self {
        Self::utc()
    }
}
