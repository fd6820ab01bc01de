use fcm_core::notify::entity::NotificationFailed;
use fcm_core::notify::port::FailureSink;
use tracing::warn;

/// # Summary
/// A `FailureSink` that reports failed batches through `tracing`.
///
/// # Invariants
/// * Stateless; safe to share between channels.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureSink;

impl<N> FailureSink<N> for TracingFailureSink {
    fn notification_failed(&self, event: &NotificationFailed<'_, N>) {
        warn!(
            "Notification failed on channel {}: success={}, failure={}, errors={:?}",
            event.channel,
            event.report.success,
            event.report.failure,
            event.report.errors()
        );
    }
}
