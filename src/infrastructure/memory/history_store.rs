//! In-Memory History Store Implementation
//!
//! 状态在 Mutex 中，每次变化递增修订号并通过 watch 通知渲染端。

use chrono::NaiveDate;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

use crate::application::ports::HistoryStorePort;
use crate::domain::history::{
    ApplyOutcome, HistoryDomainError, HistoryFilter, HistoryRange, HistoryRecord,
    HistoryViewState, QueryTicket, RecordId,
};

/// 内存历史视图状态
pub struct InMemoryHistoryStore {
    state: Mutex<HistoryViewState>,
    revision: watch::Sender<u64>,
}

impl InMemoryHistoryStore {
    /// 筛选日期默认为 today
    pub fn new(today: NaiveDate) -> Self {
        let (revision, _rx) = watch::channel(0);
        Self {
            state: Mutex::new(HistoryViewState::new(today)),
            revision,
        }
    }

    /// 订阅修订号；收到变化后调用 snapshot 读取
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, HistoryViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl HistoryStorePort for InMemoryHistoryStore {
    fn begin_initial(&self) -> QueryTicket {
        let ticket = self.lock().begin_initial();
        self.bump();
        ticket
    }

    fn refresh(&self) -> QueryTicket {
        let ticket = self.lock().refresh();
        self.bump();
        ticket
    }

    fn set_filter(&self, filter: HistoryFilter) -> Option<QueryTicket> {
        let ticket = self.lock().set_filter(filter)?;
        self.bump();
        Some(ticket)
    }

    fn set_range(&self, range: HistoryRange) -> Option<QueryTicket> {
        let ticket = self.lock().set_range(range)?;
        self.bump();
        Some(ticket)
    }

    fn set_date(&self, date: NaiveDate) -> Option<QueryTicket> {
        let ticket = self.lock().set_date(date)?;
        self.bump();
        Some(ticket)
    }

    fn apply(
        &self,
        ticket: QueryTicket,
        response: Result<Vec<HistoryRecord>, String>,
    ) -> ApplyOutcome {
        let outcome = self.lock().apply(ticket, response);
        if outcome == ApplyOutcome::Applied {
            self.bump();
        }
        outcome
    }

    fn toggle(&self, id: RecordId) -> Result<Option<RecordId>, HistoryDomainError> {
        let expanded = self.lock().toggle(id)?;
        self.bump();
        Ok(expanded)
    }

    fn snapshot(&self) -> HistoryViewState {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::history::{HistoryQuery, HistoryRange, LoadStatus};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_revision_tracks_changes() {
        let store = InMemoryHistoryStore::new(date(3));
        let rx = store.subscribe();

        let ticket = store.begin_initial();
        assert_eq!(ticket.query, HistoryQuery::All);
        assert_eq!(*rx.borrow(), 1);

        assert_eq!(store.apply(ticket, Ok(vec![])), ApplyOutcome::Applied);
        assert_eq!(*rx.borrow(), 2);
        assert_eq!(store.snapshot().status(), &LoadStatus::Ready);
    }

    #[test]
    fn test_stale_apply_leaves_revision() {
        let store = InMemoryHistoryStore::new(date(3));
        let rx = store.subscribe();
        let first = store
            .set_filter(HistoryFilter::new(HistoryRange::Day, date(3)))
            .unwrap();
        let _second = store
            .set_filter(HistoryFilter::new(HistoryRange::Week, date(3)))
            .unwrap();
        let before = *rx.borrow();

        assert_eq!(store.apply(first, Ok(vec![])), ApplyOutcome::Stale);
        assert_eq!(*rx.borrow(), before);
        assert_eq!(store.snapshot().status(), &LoadStatus::Loading);
    }

    #[test]
    fn test_default_filter_uses_today() {
        let store = InMemoryHistoryStore::new(date(9));
        let filter = store.snapshot().filter();
        assert_eq!(filter.range, HistoryRange::Day);
        assert_eq!(filter.date, date(9));
    }

    #[test]
    fn test_range_then_date_keeps_both_fields() {
        let store = InMemoryHistoryStore::new(date(9));
        let first = store.set_range(HistoryRange::Week).unwrap();
        let second = store.set_date(date(2)).unwrap();

        assert_eq!(
            first.query,
            HistoryQuery::Filtered(HistoryFilter::new(HistoryRange::Week, date(9)))
        );
        assert_eq!(
            second.query,
            HistoryQuery::Filtered(HistoryFilter::new(HistoryRange::Week, date(2)))
        );
        assert!(second.generation > first.generation);
        assert_eq!(store.snapshot().filter(), HistoryFilter::new(HistoryRange::Week, date(2)));
        assert!(store.set_date(date(2)).is_none());
    }
}
