use crate::notify::entity::{DeliveryReport, NotificationFailed, Recipient};
use crate::notify::error::NotifyError;
use crate::notify::message::FcmMessage;
use async_trait::async_trait;

/// # Summary
/// 能够为指定的被通知实体构造 FCM 消息的通知。
///
/// # Invariants
/// - 实现必须是 `Send` 和 `Sync`，以便在异步发送过程中跨 await 持有引用。
pub trait MessageSource<N>: Send + Sync {
    /// # Summary
    /// 为被通知实体构造消息。
    ///
    /// # Arguments
    /// * `notifiable` - 被通知的实体 (例如用户)。
    ///
    /// # Returns
    /// * 待发送的 `FcmMessage`，目标与条件可以都为空。
    fn to_fcm(&self, notifiable: &N) -> FcmMessage;
}

/// 已构造好的消息本身即可作为通知使用
impl<N> MessageSource<N> for FcmMessage {
    fn to_fcm(&self, _notifiable: &N) -> FcmMessage {
        self.clone()
    }
}

/// # Summary
/// 兜底目标解析策略，消息既无目标也无条件时才会调用。
pub trait RecipientResolver<N>: Send + Sync {
    /// # Summary
    /// 查询被通知实体在指定渠道上的推送目标。
    ///
    /// # Arguments
    /// * `channel` - 渠道名称，例如 "fcm"。
    /// * `notifiable` - 被通知的实体。
    /// * `notification` - 原始通知。
    ///
    /// # Returns
    /// * 有可用目标返回 `Some`，否则返回 `None` (本次不发送)。
    fn route_notification_for(
        &self,
        channel: &str,
        notifiable: &N,
        notification: &dyn MessageSource<N>,
    ) -> Option<Recipient>;
}

/// # Summary
/// 投递失败事件的订阅端。
///
/// # Invariants
/// - 在 `send` 调用内同步触发，每个失败批次触发一次。
pub trait FailureSink<N>: Send + Sync {
    fn notification_failed(&self, event: &NotificationFailed<'_, N>);
}

/// # Summary
/// 通知渠道接口定义。
///
/// # Invariants
/// - 实现必须是 `Send` 和 `Sync` 以支持并发调用。
/// - 返回的报告包含全部已提交批次，平台侧失败不会以 `Err` 返回。
#[async_trait]
pub trait NotificationChannel<N: Sync + 'static>: Send + Sync {
    /// 渠道名称
    fn name(&self) -> &'static str;

    /// # Summary
    /// 将通知投递给被通知实体。
    ///
    /// # Returns
    /// * 成功返回按批次顺序排列的 `DeliveryReport`。
    /// * 传输或解析失败返回 `Err(NotifyError)`，剩余批次不再发送。
    async fn send(
        &self,
        notifiable: &N,
        notification: &dyn MessageSource<N>,
    ) -> Result<DeliveryReport, NotifyError>;
}
