//! Inspection Context - Submission Guard
//!
//! 单飞锁：所有提交入口共享，同一时刻最多一个检验请求在途。
//! 获取是同步的（在任何异步工作之前），释放绑定在 permit 的 Drop 上。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::SubmissionId;

#[derive(Debug, Default)]
pub struct SubmissionGuard {
    held: AtomicBool,
}

impl SubmissionGuard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// 尝试获取；已被占用时返回 None（调用方直接丢弃这次触发）
    pub fn try_acquire(self: &Arc<Self>) -> Option<SubmissionPermit> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionPermit {
                guard: Arc::clone(self),
                submission_id: SubmissionId::new(),
            })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// 持有期间锁不可再被获取
#[derive(Debug)]
pub struct SubmissionPermit {
    guard: Arc<SubmissionGuard>,
    submission_id: SubmissionId,
}

impl SubmissionPermit {
    pub fn submission_id(&self) -> SubmissionId {
        self.submission_id
    }
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        self.guard.held.store(false, Ordering::Release);
    }
}
