//! History Context - Value Objects

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::HistoryDomainError;

/// 查询日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 历史记录 ID（上游的 id_qc）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(i64);

impl RecordId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 查询范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRange {
    Day,
    Week,
    Month,
    Year,
}

impl HistoryRange {
    pub const ALL: [HistoryRange; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl FromStr for HistoryRange {
    type Err = HistoryDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(HistoryDomainError::InvalidRange(s.to_string())),
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 时间窗口 [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// 历史筛选条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub range: HistoryRange,
    pub date: NaiveDate,
}

impl HistoryFilter {
    pub fn new(range: HistoryRange, date: NaiveDate) -> Self {
        Self { range, date }
    }

    pub fn parse(range: &str, date: &str) -> Result<Self, HistoryDomainError> {
        let range = range.parse()?;
        let date = parse_date(date)?;
        Ok(Self { range, date })
    }

    /// 与历史服务一致的时间窗口：周从周一开始，月和年按自然月和自然年
    pub fn window(&self) -> DateWindow {
        let date = self.date;
        let (start, end) = match self.range {
            HistoryRange::Day => (date, date + Duration::days(1)),
            HistoryRange::Week => {
                let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
                (start, start + Duration::days(7))
            }
            HistoryRange::Month => {
                let start = date.with_day(1).unwrap_or(date);
                let end = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
                };
                (start, end.unwrap_or(start))
            }
            HistoryRange::Year => {
                let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
                let end = NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).unwrap_or(start);
                (start, end)
            }
        };
        DateWindow { start, end }
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, HistoryDomainError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| HistoryDomainError::InvalidDate(raw.to_string()))
}

/// 一次历史查询
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryQuery {
    /// 首次显示：不带参数，取全部记录
    All,
    Filtered(HistoryFilter),
}

impl HistoryQuery {
    /// 查询参数 (range, date)
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::All => Vec::new(),
            Self::Filtered(filter) => vec![
                ("range", filter.range.as_str().to_string()),
                ("date", filter.date.format(DATE_FORMAT).to_string()),
            ],
        }
    }
}

impl fmt::Display for HistoryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Filtered(filter) => write!(
                f,
                "range={}&date={}",
                filter.range,
                filter.date.format(DATE_FORMAT)
            ),
        }
    }
}

/// 展开状态：至多一条记录展开
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionState(Option<RecordId>);

impl ExpansionState {
    pub fn expanded(&self) -> Option<RecordId> {
        self.0
    }

    pub fn is_expanded(&self, id: RecordId) -> bool {
        self.0 == Some(id)
    }

    /// 再次选择已展开的记录时折叠，否则只展开这一条
    pub fn toggle(&mut self, id: RecordId) {
        self.0 = if self.0 == Some(id) { None } else { Some(id) };
    }

    pub fn collapse(&mut self) {
        self.0 = None;
    }
}
