//! History Queries - 历史记录查询

use chrono::NaiveDate;

use crate::domain::history::{HistoryFilter, HistoryRange, RecordId};

/// 首次显示：不带筛选条件取全部记录
#[derive(Debug, Clone, Default)]
pub struct LoadHistory;

/// 按当前条件重新查询
#[derive(Debug, Clone, Default)]
pub struct RefreshHistory;

/// 修改筛选条件（范围或日期任一变化都会重新查询）
///
/// 只改一个字段时，另一个字段取存储中的当前值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeHistoryFilter {
    Range(HistoryRange),
    Date(NaiveDate),
    Both(HistoryFilter),
}

/// 展开/折叠某条记录的明细（不重新查询）
#[derive(Debug, Clone)]
pub struct ToggleHistoryDetail {
    pub record_id: RecordId,
}
