//! History Context - View State
//!
//! 每次查询都带一个递增的 generation 和产生它的查询条件；
//! 响应到达时二者必须都与当前状态一致才会被应用，
//! 否则说明筛选条件已经改变，旧响应直接丢弃。

use chrono::NaiveDate;

use super::{
    ExpansionState, HistoryDomainError, HistoryFilter, HistoryQuery, HistoryRange,
    HistoryRecord, RecordId,
};

/// 加载状态（加载中与错误互斥显示）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Error(String),
}

/// 在途查询的标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket {
    pub generation: u64,
    pub query: HistoryQuery,
}

/// 响应应用结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct HistoryViewState {
    filter: HistoryFilter,
    active_query: HistoryQuery,
    generation: u64,
    records: Vec<HistoryRecord>,
    status: LoadStatus,
    expansion: ExpansionState,
}

impl HistoryViewState {
    /// 筛选器默认 day + 当天，但首次查询不带参数
    pub fn new(today: NaiveDate) -> Self {
        Self {
            filter: HistoryFilter::new(HistoryRange::Day, today),
            active_query: HistoryQuery::All,
            generation: 0,
            records: Vec::new(),
            status: LoadStatus::Loading,
            expansion: ExpansionState::default(),
        }
    }

    /// 首次显示的全量查询
    pub fn begin_initial(&mut self) -> QueryTicket {
        self.issue(HistoryQuery::All)
    }

    /// 重新发出当前查询（用户手动刷新）
    pub fn refresh(&mut self) -> QueryTicket {
        self.issue(self.active_query)
    }

    /// 筛选条件变化时发出新查询；条件未变返回 None
    pub fn set_filter(&mut self, filter: HistoryFilter) -> Option<QueryTicket> {
        let query = HistoryQuery::Filtered(filter);
        if self.filter == filter && self.active_query == query {
            return None;
        }
        self.filter = filter;
        Some(self.issue(query))
    }

    pub fn set_range(&mut self, range: HistoryRange) -> Option<QueryTicket> {
        self.set_filter(HistoryFilter::new(range, self.filter.date))
    }

    pub fn set_date(&mut self, date: NaiveDate) -> Option<QueryTicket> {
        self.set_filter(HistoryFilter::new(self.filter.range, date))
    }

    fn issue(&mut self, query: HistoryQuery) -> QueryTicket {
        self.generation += 1;
        self.active_query = query;
        self.status = LoadStatus::Loading;
        QueryTicket {
            generation: self.generation,
            query,
        }
    }

    /// 应用查询响应
    ///
    /// 成功时整体替换记录；传输错误时保留旧记录但显示错误。
    pub fn apply(
        &mut self,
        ticket: QueryTicket,
        response: Result<Vec<HistoryRecord>, String>,
    ) -> ApplyOutcome {
        if ticket.generation != self.generation || ticket.query != self.active_query {
            return ApplyOutcome::Stale;
        }
        match response {
            Ok(records) => {
                if let Some(expanded) = self.expansion.expanded() {
                    if !records.iter().any(|record| record.id() == expanded) {
                        self.expansion.collapse();
                    }
                }
                self.records = records;
                self.status = LoadStatus::Ready;
            }
            Err(message) => {
                self.status = LoadStatus::Error(message);
            }
        }
        ApplyOutcome::Applied
    }

    /// 展开/折叠明细，不重新查询
    pub fn toggle(&mut self, id: RecordId) -> Result<Option<RecordId>, HistoryDomainError> {
        if !self.records.iter().any(|record| record.id() == id) {
            return Err(HistoryDomainError::UnknownRecord(id));
        }
        self.expansion.toggle(id);
        Ok(self.expansion.expanded())
    }

    // Getters
    pub fn filter(&self) -> HistoryFilter {
        self.filter
    }

    pub fn active_query(&self) -> HistoryQuery {
        self.active_query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn expansion(&self) -> ExpansionState {
        self.expansion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inspection::{ReportedVerdict, Verdict};
    use crate::domain::Timestamp;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn record(id: i64) -> HistoryRecord {
        HistoryRecord::new(
            RecordId::new(id),
            format!("img_{id}.jpg"),
            100.0,
            ReportedVerdict::Known(Verdict::Pass),
            Timestamp::parse("2024-05-01T10:00:00Z"),
            vec![],
        )
    }

    #[test]
    fn test_initial_query_is_unfiltered() {
        let mut state = HistoryViewState::new(day(1));
        let ticket = state.begin_initial();
        assert_eq!(ticket.query, HistoryQuery::All);
        assert_eq!(state.status(), &LoadStatus::Loading);

        assert_eq!(state.apply(ticket, Ok(vec![record(1)])), ApplyOutcome::Applied);
        assert_eq!(state.status(), &LoadStatus::Ready);
        assert_eq!(state.records().len(), 1);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut state = HistoryViewState::new(day(1));
        let initial = state.begin_initial();
        state.apply(initial, Ok(vec![]));

        let f1 = state.set_date(day(2)).unwrap();
        let f2 = state.set_range(HistoryRange::Week).unwrap();

        assert_eq!(state.apply(f2, Ok(vec![record(20)])), ApplyOutcome::Applied);
        assert_eq!(state.apply(f1, Ok(vec![record(10), record(11)])), ApplyOutcome::Stale);

        let ids: Vec<i64> = state.records().iter().map(|r| r.id().value()).collect();
        assert_eq!(ids, vec![20]);
        assert_eq!(state.status(), &LoadStatus::Ready);
    }

    #[test]
    fn test_stale_error_is_discarded() {
        let mut state = HistoryViewState::new(day(1));
        let f1 = state.set_date(day(2)).unwrap();
        let f2 = state.set_date(day(3)).unwrap();
        state.apply(f2, Ok(vec![record(1)]));
        assert_eq!(state.apply(f1, Err("boom".to_string())), ApplyOutcome::Stale);
        assert_eq!(state.status(), &LoadStatus::Ready);
    }

    #[test]
    fn test_unchanged_filter_does_not_requery() {
        let mut state = HistoryViewState::new(day(1));
        assert!(state.set_date(day(2)).is_some());
        assert!(state.set_date(day(2)).is_none());
        assert!(state.set_range(HistoryRange::Day).is_none());
    }

    #[test]
    fn test_selecting_default_filter_after_initial_query_requeries() {
        let mut state = HistoryViewState::new(day(1));
        let initial = state.begin_initial();
        state.apply(initial, Ok(vec![]));
        let ticket = state.set_filter(HistoryFilter::new(HistoryRange::Day, day(1)));
        assert!(ticket.is_some());
    }

    #[test]
    fn test_transport_error_keeps_records() {
        let mut state = HistoryViewState::new(day(1));
        let initial = state.begin_initial();
        state.apply(initial, Ok(vec![record(1), record(2)]));

        let ticket = state.set_date(day(2)).unwrap();
        state.apply(ticket, Err("connection refused".to_string()));
        assert_eq!(state.status(), &LoadStatus::Error("connection refused".to_string()));
        assert_eq!(state.records().len(), 2);
    }

    #[test]
    fn test_toggle_and_replacement() {
        let mut state = HistoryViewState::new(day(1));
        let initial = state.begin_initial();
        state.apply(initial, Ok(vec![record(1), record(2)]));

        assert_eq!(state.toggle(RecordId::new(1)).unwrap(), Some(RecordId::new(1)));
        assert_eq!(state.toggle(RecordId::new(2)).unwrap(), Some(RecordId::new(2)));
        assert_eq!(state.toggle(RecordId::new(2)).unwrap(), None);
        assert_eq!(
            state.toggle(RecordId::new(9)),
            Err(HistoryDomainError::UnknownRecord(RecordId::new(9)))
        );

        state.toggle(RecordId::new(1)).unwrap();
        let ticket = state.refresh();
        state.apply(ticket, Ok(vec![record(3)]));
        assert_eq!(state.expansion().expanded(), None);
    }
}
