//! History Query Handlers
//!
//! 查询票据在发出请求之前同步生成，响应回来时由 HistoryStorePort
//! 判断是否仍然是当前查询。

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{HistoryServicePort, HistoryStorePort};
use crate::application::queries::{
    ChangeHistoryFilter, LoadHistory, RefreshHistory, ToggleHistoryDetail,
};
use crate::domain::history::{ApplyOutcome, QueryTicket, RecordId};
use crate::infrastructure::events::EventPublisher;

// ============================================================================
// Response DTOs
// ============================================================================

/// 历史查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryQueryOutcome {
    /// 记录已整体替换
    Loaded { records: usize },
    /// 传输错误已显示，旧记录保留
    Failed { error: String },
    /// 响应到达时条件已改变，被丢弃
    Stale,
    /// 条件未变化，没有发出查询
    Unchanged,
}

// ============================================================================
// Handlers
// ============================================================================

/// 执行一次已登记的查询并应用响应
async fn run_ticket(
    service: &dyn HistoryServicePort,
    store: &dyn HistoryStorePort,
    events: &EventPublisher,
    ticket: QueryTicket,
) -> HistoryQueryOutcome {
    tracing::debug!(
        query = %ticket.query,
        generation = ticket.generation,
        "Fetching history"
    );

    let response = service
        .fetch(&ticket.query)
        .await
        .map_err(|e| e.to_string());
    let summary = match &response {
        Ok(records) => HistoryQueryOutcome::Loaded {
            records: records.len(),
        },
        Err(error) => HistoryQueryOutcome::Failed {
            error: error.clone(),
        },
    };

    match store.apply(ticket, response) {
        ApplyOutcome::Stale => {
            tracing::debug!(
                query = %ticket.query,
                generation = ticket.generation,
                "Discarding stale history response"
            );
            events.publish_history_discarded(&ticket);
            HistoryQueryOutcome::Stale
        }
        ApplyOutcome::Applied => {
            match &summary {
                HistoryQueryOutcome::Loaded { records } => {
                    tracing::info!(query = %ticket.query, records = records, "History loaded");
                    events.publish_history_updated(&ticket, *records);
                }
                HistoryQueryOutcome::Failed { error } => {
                    tracing::warn!(query = %ticket.query, error = %error, "History fetch failed");
                    events.publish_history_failed(&ticket, error);
                }
                _ => {}
            }
            summary
        }
    }
}

/// LoadHistory Handler - 首次显示与手动刷新
pub struct LoadHistoryHandler {
    service: Arc<dyn HistoryServicePort>,
    store: Arc<dyn HistoryStorePort>,
    events: Arc<EventPublisher>,
}

impl LoadHistoryHandler {
    pub fn new(
        service: Arc<dyn HistoryServicePort>,
        store: Arc<dyn HistoryStorePort>,
        events: Arc<EventPublisher>,
    ) -> Self {
        Self {
            service,
            store,
            events,
        }
    }

    pub async fn handle(&self, _query: LoadHistory) -> HistoryQueryOutcome {
        let ticket = self.store.begin_initial();
        self.finish(ticket).await
    }

    pub async fn refresh(&self, query: RefreshHistory) -> HistoryQueryOutcome {
        let ticket = self.begin_refresh(query);
        self.finish(ticket).await
    }

    /// 同步登记刷新查询
    pub fn begin_refresh(&self, _query: RefreshHistory) -> QueryTicket {
        self.store.refresh()
    }

    pub async fn finish(&self, ticket: QueryTicket) -> HistoryQueryOutcome {
        run_ticket(self.service.as_ref(), self.store.as_ref(), &self.events, ticket).await
    }
}

/// ChangeHistoryFilter Handler
pub struct ChangeHistoryFilterHandler {
    service: Arc<dyn HistoryServicePort>,
    store: Arc<dyn HistoryStorePort>,
    events: Arc<EventPublisher>,
}

impl ChangeHistoryFilterHandler {
    pub fn new(
        service: Arc<dyn HistoryServicePort>,
        store: Arc<dyn HistoryStorePort>,
        events: Arc<EventPublisher>,
    ) -> Self {
        Self {
            service,
            store,
            events,
        }
    }

    pub async fn handle(&self, query: ChangeHistoryFilter) -> HistoryQueryOutcome {
        match self.begin(query) {
            Some(ticket) => self.finish(ticket).await,
            None => HistoryQueryOutcome::Unchanged,
        }
    }

    /// 同步写入新条件并登记查询；条件未变返回 None
    ///
    /// 票据在 await 之前登记，后发的条件总是最终生效。
    pub fn begin(&self, query: ChangeHistoryFilter) -> Option<QueryTicket> {
        let ticket = match query {
            ChangeHistoryFilter::Range(range) => self.store.set_range(range),
            ChangeHistoryFilter::Date(date) => self.store.set_date(date),
            ChangeHistoryFilter::Both(filter) => self.store.set_filter(filter),
        };
        if ticket.is_none() {
            tracing::debug!(change = ?query, "History filter unchanged");
        }
        ticket
    }

    pub async fn finish(&self, ticket: QueryTicket) -> HistoryQueryOutcome {
        run_ticket(self.service.as_ref(), self.store.as_ref(), &self.events, ticket).await
    }
}

/// ToggleHistoryDetail Handler - 只改变展开状态
pub struct ToggleHistoryDetailHandler {
    store: Arc<dyn HistoryStorePort>,
}

impl ToggleHistoryDetailHandler {
    pub fn new(store: Arc<dyn HistoryStorePort>) -> Self {
        Self { store }
    }

    /// 返回切换后展开的记录
    pub fn handle(&self, query: ToggleHistoryDetail) -> Result<Option<RecordId>, ApplicationError> {
        let expanded = self.store.toggle(query.record_id)?;
        tracing::debug!(record_id = %query.record_id, expanded = ?expanded, "History detail toggled");
        Ok(expanded)
    }
}
