use std::sync::Arc;

use fcm_core::config::{AppConfig, LogConfig};
use fcm_core::notify::entity::Recipient;
use fcm_core::notify::error::NotifyError;
use fcm_core::notify::message::FcmMessage;
use fcm_core::notify::port::{MessageSource, RecipientResolver};
use fcm_notify::fcm::FcmChannel;
use fcm_notify::sink::TracingFailureSink;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// 命令行调用者，没有消息目标时使用配置中的兜底 token
struct Operator {
    fallback_token: Option<String>,
}

/// 从 `Operator` 读取兜底 token
struct OperatorRoute;

impl RecipientResolver<Operator> for OperatorRoute {
    fn route_notification_for(
        &self,
        _channel: &str,
        notifiable: &Operator,
        _notification: &dyn MessageSource<Operator>,
    ) -> Option<Recipient> {
        notifiable.fallback_token.clone().map(Recipient::Single)
    }
}

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 可选读取 `config/fcm.toml`。
/// 2. 叠加 `FCM__` 前缀的环境变量，例如 `FCM__FCM__API_KEY`。
fn load_config() -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("config/fcm").required(false))
        .add_source(
            config::Environment::with_prefix("FCM")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 初始化全局日志。
///
/// # Logic
/// 1. `RUST_LOG` 优先，否则使用配置中的级别。
/// 2. 配置了日志目录时按天滚动写文件，返回的 guard 必须存活到进程结束。
fn init_tracing(log: &LogConfig) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log.level))?;

    match &log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "fcm-send.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}

/// # Summary
/// 读取消息文件并解析为 `FcmMessage`。
///
/// # Logic
/// 1. 文件不可读返回 `NotifyError::Config`。
/// 2. `to` 与 `registration_ids` 指向同一个目标，同时出现返回 `NotifyError::Config`。
/// 3. 其余解析错误返回 `NotifyError::Serialization`。
async fn read_message(path: &str) -> Result<FcmMessage, NotifyError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| NotifyError::Config(format!("Cannot read message file {}: {}", path, e)))?;
    let invalid =
        |e: serde_json::Error| NotifyError::Serialization(format!("Invalid message file {}: {}", path, e));

    let value: serde_json::Value = serde_json::from_str(&raw).map_err(invalid)?;
    if value.get("to").is_some() && value.get("registration_ids").is_some() {
        return Err(NotifyError::Config(format!(
            "Message file {} sets both `to` and `registration_ids`, use only one",
            path
        )));
    }
    serde_json::from_value(value).map_err(invalid)
}

/// # Summary
/// `fcm-send` 入口：发送一条消息文件中的 FCM 消息。
///
/// # Logic
/// 1. 加载 .env 与配置。
/// 2. 初始化日志。
/// 3. 读取第一个命令行参数指定的消息文件。
/// 4. 构造 FcmChannel 并发送，失败批次由 TracingFailureSink 记录。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 加载环境与配置
    let env_file = dotenvy::dotenv();
    let app_config = load_config()?;

    // 2. 初始化日志
    let _guard = init_tracing(&app_config.log)?;
    match env_file {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    // 3. 读取消息
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| NotifyError::Config("usage: fcm-send <message.json>".to_string()))?;
    let message = read_message(&path).await?;

    // 4. 发送
    let operator = Operator {
        fallback_token: app_config.fcm.fallback_token.clone(),
    };
    let channel = FcmChannel::<Operator>::from_config(
        app_config.fcm,
        Arc::new(OperatorRoute),
        Arc::new(TracingFailureSink),
    )?;

    let report = channel.send(&operator, &message).await?;
    if report.is_empty() {
        info!("No recipient available, nothing was sent");
    } else {
        info!(
            "Sent {} batch(es): success={}, failure={}",
            report.len(),
            report.total_success(),
            report.total_failure()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_route_uses_fallback_token() {
        let message = FcmMessage::new();
        let operator = Operator {
            fallback_token: Some("device-1".to_string()),
        };
        assert_eq!(
            OperatorRoute.route_notification_for("fcm", &operator, &message),
            Some(Recipient::Single("device-1".to_string()))
        );

        let operator = Operator {
            fallback_token: None,
        };
        assert_eq!(
            OperatorRoute.route_notification_for("fcm", &operator, &message),
            None
        );
    }

    #[tokio::test]
    async fn test_read_message_file() {
        let path = std::env::temp_dir().join("fcm-send-message-test.json");
        tokio::fs::write(&path, r#"{"to": "abc", "priority": "high"}"#)
            .await
            .unwrap();

        let message = read_message(path.to_str().unwrap()).await.unwrap();
        assert_eq!(message.get_to(), Some(&Recipient::Single("abc".to_string())));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_message_file_with_both_targets_is_rejected() {
        let path = std::env::temp_dir().join("fcm-send-both-targets-test.json");
        tokio::fs::write(&path, r#"{"to": "abc", "registration_ids": ["a", "b"]}"#)
            .await
            .unwrap();

        let result = read_message(path.to_str().unwrap()).await;
        assert!(
            matches!(&result, Err(NotifyError::Config(msg)) if msg.contains("registration_ids")),
            "unexpected result: {:?}",
            result
        );

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_message_json_is_serialization_error() {
        let path = std::env::temp_dir().join("fcm-send-invalid-json-test.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let result = read_message(path.to_str().unwrap()).await;
        assert!(matches!(result, Err(NotifyError::Serialization(_))));

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_message_file() {
        let result = read_message("/nonexistent/fcm-message.json").await;
        assert!(matches!(result, Err(NotifyError::Config(_))));
    }
}
