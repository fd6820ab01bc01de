use crate::notify::error::NotifyError;
use serde::{Deserialize, Serialize};

/// FCM legacy HTTP 接口地址
pub const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fcm: FcmConfig,
    pub log: LogConfig,
}

/// # Summary
/// FCM 渠道配置。
///
/// # Invariants
/// - `api_key` 与 `endpoint` 不能为空，由 `validate` 检查。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FcmConfig {
    // 服务端密钥 (Server Key)
    pub api_key: String,
    // 推送接口地址，测试时可指向本地 mock
    pub endpoint: String,
    // 单次 HTTP 请求超时 (秒)
    pub timeout_secs: u64,
    // 消息与通知对象都没有目标时使用的兜底设备 token
    pub fallback_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // EnvFilter 指令，RUST_LOG 优先
    pub level: String,
    // 日志目录，为空时输出到 stdout
    pub dir: Option<String>,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: FCM_ENDPOINT.to_string(),
            timeout_secs: 10,
            fallback_token: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl FcmConfig {
    /// # Summary
    /// 校验渠道配置是否可用。
    ///
    /// # Returns
    /// * 合法返回 `Ok(())`，否则返回 `NotifyError::Config`。
    pub fn validate(&self) -> Result<(), NotifyError> {
        if self.api_key.trim().is_empty() {
            return Err(NotifyError::Config("FCM api_key is empty".to_string()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(NotifyError::Config("FCM endpoint is empty".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(NotifyError::Config(
                "FCM timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.fcm.endpoint, "https://fcm.googleapis.com/fcm/send");
        assert_eq!(config.fcm.timeout_secs, 10);
        assert!(config.fcm.api_key.is_empty());
        assert!(config.fcm.fallback_token.is_none());
        assert_eq!(config.log.level, "info");
        assert!(config.log.dir.is_none());
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let config = FcmConfig::default();
        assert!(matches!(config.validate(), Err(NotifyError::Config(_))));

        let config = FcmConfig {
            api_key: "server-key".to_string(),
            ..FcmConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"fcm": {"api_key": "k"}}"#).unwrap();
        assert_eq!(config.fcm.api_key, "k");
        assert_eq!(config.fcm.endpoint, FCM_ENDPOINT);
        assert_eq!(config.log.level, "info");
    }
}
