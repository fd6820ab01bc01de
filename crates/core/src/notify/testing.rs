//! 测试替身：固定结果的目标解析器与记录事件的失败订阅端。

use crate::notify::entity::{BatchResult, NotificationFailed, Recipient};
use crate::notify::port::{FailureSink, MessageSource, RecipientResolver};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// # Summary
/// 总是返回同一结果的 `RecipientResolver`，并统计调用次数。
#[derive(Debug, Default)]
pub struct FixedResolver {
    recipient: Option<Recipient>,
    calls: AtomicUsize,
}

impl FixedResolver {
    pub fn new(recipient: Option<Recipient>) -> Self {
        Self {
            recipient,
            calls: AtomicUsize::new(0),
        }
    }

    /// 解析不到任何目标
    pub fn none() -> Self {
        Self::new(None)
    }

    pub fn returning(recipient: impl Into<Recipient>) -> Self {
        Self::new(Some(recipient.into()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<N> RecipientResolver<N> for FixedResolver {
    fn route_notification_for(
        &self,
        _channel: &str,
        _notifiable: &N,
        _notification: &dyn MessageSource<N>,
    ) -> Option<Recipient> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.recipient.clone()
    }
}

/// 一次被记录的失败事件
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedFailure<N> {
    pub notifiable: N,
    pub channel: String,
    pub report: BatchResult,
}

/// # Summary
/// 按触发顺序记录失败事件的 `FailureSink`。
#[derive(Debug)]
pub struct RecordingFailureSink<N> {
    events: Mutex<Vec<RecordedFailure<N>>>,
}

impl<N> Default for RecordingFailureSink<N> {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

impl<N: Clone> RecordingFailureSink<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedFailure<N>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl<N: Clone + Send + Sync> FailureSink<N> for RecordingFailureSink<N> {
    fn notification_failed(&self, event: &NotificationFailed<'_, N>) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedFailure {
                notifiable: event.notifiable.clone(),
                channel: event.channel.to_string(),
                report: event.report.clone(),
            });
    }
}
