//! History Presentation - 历史表格展示模型

use crate::domain::history::{
    HistoryFilter, HistoryQuery, HistoryRecord, HistoryViewState, LoadStatus, DATE_FORMAT,
};
use crate::domain::inspection::{ReportedVerdict, Verdict};
use crate::domain::DisplayClock;

pub const LOADING_TEXT: &str = "Loading QC history...";
pub const NO_DATA_TEXT: &str = "No QC data yet";
pub const NO_ITEMS_TEXT: &str = "No item data";
pub const SHOW_DETAIL_LABEL: &str = "Details";
pub const HIDE_DETAIL_LABEL: &str = "Hide";

/// 状态列
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCell {
    Pass,
    Fail,
    /// 未知状态值，作为显示错误
    Unrecognized(String),
}

impl StatusCell {
    fn from_reported(status: &ReportedVerdict) -> Self {
        match status {
            ReportedVerdict::Known(Verdict::Pass) => Self::Pass,
            ReportedVerdict::Known(Verdict::Fail) => Self::Fail,
            ReportedVerdict::Unrecognized(raw) => Self::Unrecognized(raw.clone()),
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::Pass => "PASS".to_string(),
            Self::Fail => "FAIL".to_string(),
            Self::Unrecognized(raw) => format!("?{}?", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub category: String,
    /// 两位小数
    pub weight: String,
    /// 百分比，一位小数
    pub ratio: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryDetail {
    NoItems,
    Items(Vec<DetailRow>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub id: i64,
    pub date: String,
    pub image_name: String,
    pub total_weight: String,
    pub status: StatusCell,
    pub toggle_label: &'static str,
    /// 只有展开的那一行有明细
    pub detail: Option<HistoryDetail>,
}

impl HistoryRow {
    fn derive(record: &HistoryRecord, expanded: bool, clock: &DisplayClock) -> Self {
        let detail = expanded.then(|| {
            if record.items().is_empty() {
                HistoryDetail::NoItems
            } else {
                HistoryDetail::Items(
                    record
                        .items()
                        .iter()
                        .map(|item| DetailRow {
                            category: item.category.clone(),
                            weight: format!("{:.2}", item.weight),
                            ratio: format!("{:.1}", item.share.value()),
                        })
                        .collect(),
                )
            }
        });
        Self {
            id: record.id().value(),
            date: clock.format_short(record.created_at()),
            image_name: record.image_name().to_string(),
            total_weight: format!("{:.2}", record.total_weight()),
            status: StatusCell::from_reported(record.status()),
            toggle_label: if expanded {
                HIDE_DETAIL_LABEL
            } else {
                SHOW_DETAIL_LABEL
            },
            detail,
        }
    }
}

/// 表格主体，加载中/错误/空/表格互斥
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryBody {
    Loading,
    Error(String),
    Empty,
    Table(Vec<HistoryRow>),
}

/// 筛选栏
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBar {
    pub range: &'static str,
    pub date: String,
    /// 筛选条件对应的时间窗口
    pub window: String,
    /// 当前显示的是否为全部记录（首次加载）
    pub showing_all: bool,
}

impl FilterBar {
    fn derive(filter: HistoryFilter, query: HistoryQuery) -> Self {
        Self {
            range: filter.range.as_str(),
            date: filter.date.format(DATE_FORMAT).to_string(),
            window: filter.window().to_string(),
            showing_all: query == HistoryQuery::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryScreen {
    pub filter: FilterBar,
    pub body: HistoryBody,
}

impl HistoryScreen {
    pub fn derive(state: &HistoryViewState, clock: &DisplayClock) -> Self {
        let body = match state.status() {
            LoadStatus::Loading => HistoryBody::Loading,
            LoadStatus::Error(message) => HistoryBody::Error(message.clone()),
            LoadStatus::Ready if state.records().is_empty() => HistoryBody::Empty,
            LoadStatus::Ready => {
                let expansion = state.expansion();
                HistoryBody::Table(
                    state
                        .records()
                        .iter()
                        .map(|record| {
                            HistoryRow::derive(record, expansion.is_expanded(record.id()), clock)
                        })
                        .collect(),
                )
            }
        };
        Self {
            filter: FilterBar::derive(state.filter(), state.active_query()),
            body,
        }
    }
}
