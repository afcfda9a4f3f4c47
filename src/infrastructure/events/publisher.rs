//! Event Publisher Implementation
//!
//! 控制台事件广播（提交、摄像头、历史记录的状态变化）

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::domain::history::QueryTicket;
use crate::domain::inspection::{ImageSource, SubmissionId};

/// 广播通道容量
const CHANNEL_CAPACITY: usize = 100;

/// 控制台事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ConsoleEvent {
    /// 提交被接纳，进入 Pending
    SubmissionStarted {
        submission_id: String,
        source: String,
    },
    /// 提交成功
    SubmissionSucceeded {
        submission_id: String,
        verdict: String,
    },
    /// 提交失败
    SubmissionFailed {
        submission_id: String,
        reason: String,
    },
    /// 已有提交在途，本次触发被丢弃
    SubmissionDropped { source: String },
    /// 摄像头已打开
    CameraOpened { device_label: String },
    /// 摄像头已关闭
    CameraClosed,
    /// 摄像头打开失败
    CameraFailed { error: String },
    /// 历史记录已更新
    HistoryUpdated {
        query: String,
        generation: u64,
        records: usize,
    },
    /// 历史查询失败
    HistoryFailed {
        query: String,
        generation: u64,
        error: String,
    },
    /// 过期的历史响应被丢弃
    HistoryDiscarded { query: String, generation: u64 },
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<ConsoleEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { channel: tx }
    }

    /// 订阅所有控制台事件
    pub fn subscribe(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.channel.subscribe()
    }

    pub fn publish_submission_started(&self, submission_id: SubmissionId, source: ImageSource) {
        self.publish(ConsoleEvent::SubmissionStarted {
            submission_id: submission_id.to_string(),
            source: source.label().to_string(),
        });
    }

    pub fn publish_submission_succeeded(&self, submission_id: SubmissionId, verdict: &str) {
        self.publish(ConsoleEvent::SubmissionSucceeded {
            submission_id: submission_id.to_string(),
            verdict: verdict.to_string(),
        });
    }

    pub fn publish_submission_failed(&self, submission_id: SubmissionId, reason: &str) {
        self.publish(ConsoleEvent::SubmissionFailed {
            submission_id: submission_id.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn publish_submission_dropped(&self, source: ImageSource) {
        self.publish(ConsoleEvent::SubmissionDropped {
            source: source.label().to_string(),
        });
    }

    pub fn publish_camera_opened(&self, device_label: &str) {
        self.publish(ConsoleEvent::CameraOpened {
            device_label: device_label.to_string(),
        });
    }

    pub fn publish_camera_closed(&self) {
        self.publish(ConsoleEvent::CameraClosed);
    }

    pub fn publish_camera_failed(&self, error: &str) {
        self.publish(ConsoleEvent::CameraFailed {
            error: error.to_string(),
        });
    }

    pub fn publish_history_updated(&self, ticket: &QueryTicket, records: usize) {
        self.publish(ConsoleEvent::HistoryUpdated {
            query: ticket.query.to_string(),
            generation: ticket.generation,
            records,
        });
    }

    pub fn publish_history_failed(&self, ticket: &QueryTicket, error: &str) {
        self.publish(ConsoleEvent::HistoryFailed {
            query: ticket.query.to_string(),
            generation: ticket.generation,
            error: error.to_string(),
        });
    }

    pub fn publish_history_discarded(&self, ticket: &QueryTicket) {
        self.publish(ConsoleEvent::HistoryDiscarded {
            query: ticket.query.to_string(),
            generation: ticket.generation,
        });
    }

    fn publish(&self, event: ConsoleEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish console event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe();

        publisher.publish_camera_opened("cctv");
        publisher.publish_submission_dropped(ImageSource::UploadedFile);

        assert_eq!(
            rx.recv().await.unwrap(),
            ConsoleEvent::CameraOpened {
                device_label: "cctv".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ConsoleEvent::SubmissionDropped {
                source: "uploaded file".to_string()
            }
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let publisher = EventPublisher::new();
        publisher.publish_camera_closed();
    }

    #[test]
    fn test_event_json_shape() {
        let event = ConsoleEvent::CameraFailed {
            error: "busy".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "CameraFailed");
        assert_eq!(json["data"]["error"], "busy");
    }
}
