//! # fcm-core
//!
//! FCM 推送渠道的领域层：消息实体、端口 (Port) 定义、错误类型与配置。
//! 具体的 HTTP 实现位于 `fcm-notify`。

pub mod config;
pub mod notify;
pub mod tls;
