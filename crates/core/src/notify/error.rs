use thiserror::Error;

/// # Summary
/// 通知渠道错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 推送平台按批次报告的失败 (failure 计数) 不属于错误，通过失败事件上报。
#[derive(Error, Debug)]
pub enum NotifyError {
    /// 网络连接或传输错误 (DNS、TLS、超时等)
    #[error("Network error: {0}")]
    Network(String),

    /// 配置错误 (如缺少 API Key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// 推送平台返回了无法解析的非 2xx 响应
    #[error("Platform error: {0}")]
    Platform(String),

    /// 消息编码失败，或响应体不是合法的 FCM JSON
    #[error("Serialization error: {0}")]
    Serialization(String),
}
