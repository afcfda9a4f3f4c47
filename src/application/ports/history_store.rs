//! History Store Port - 历史视图状态存储

use chrono::NaiveDate;

use crate::domain::history::{
    ApplyOutcome, HistoryDomainError, HistoryFilter, HistoryRange, HistoryRecord,
    HistoryViewState, QueryTicket, RecordId,
};

pub trait HistoryStorePort: Send + Sync {
    /// 首次显示的全量查询
    fn begin_initial(&self) -> QueryTicket;

    /// 重新发出当前查询
    fn refresh(&self) -> QueryTicket;

    /// 筛选条件变化；未变化返回 None
    fn set_filter(&self, filter: HistoryFilter) -> Option<QueryTicket>;

    /// 只改范围，日期取当前值（读与写在同一次加锁内完成）
    fn set_range(&self, range: HistoryRange) -> Option<QueryTicket>;

    /// 只改日期，范围取当前值
    fn set_date(&self, date: NaiveDate) -> Option<QueryTicket>;

    /// 应用响应；与当前查询不匹配的响应被丢弃
    fn apply(
        &self,
        ticket: QueryTicket,
        response: Result<Vec<HistoryRecord>, String>,
    ) -> ApplyOutcome;

    fn toggle(&self, id: RecordId) -> Result<Option<RecordId>, HistoryDomainError>;

    fn snapshot(&self) -> HistoryViewState;
}
