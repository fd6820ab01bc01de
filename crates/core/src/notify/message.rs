use crate::notify::entity::Recipient;
use crate::notify::error::NotifyError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// FCM 允许的最大存活时间：4 周 (秒)
pub const MAX_TIME_TO_LIVE: u32 = 2_419_200;

/// # Summary
/// 消息优先级。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
}

/// # Summary
/// 展示型通知内容 (`notification` 字段)。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FcmNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl FcmNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            ..Self::default()
        }
    }
}

/// # Summary
/// 一条待发送的 FCM 消息。
///
/// # Invariants
/// - `to` 与 `condition` 作为输入互斥，也可以都为空 (由渠道兜底解析目标)。
/// - 渠道只读取目标与条件，其余字段仅在 `format_data` 中编码。
/// - 反序列化时 `registration_ids` 是 `to` 的别名，两者同时出现会被拒绝。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FcmMessage {
    #[serde(default, alias = "registration_ids")]
    to: Option<Recipient>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    notification: Option<FcmNotification>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    collapse_key: Option<String>,
    #[serde(default)]
    content_available: Option<bool>,
    #[serde(default)]
    mutable_content: Option<bool>,
    #[serde(default)]
    time_to_live: Option<u32>,
    #[serde(default)]
    dry_run: Option<bool>,
    #[serde(default)]
    restricted_package_name: Option<String>,
}

/// 实际发送到 FCM 的 JSON 结构
#[derive(Serialize)]
struct WirePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    registration_ids: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<&'a str>,
    priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<&'a FcmNotification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collapse_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mutable_content: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_to_live: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    restricted_package_name: Option<&'a str>,
}

impl FcmMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, recipient: impl Into<Recipient>) -> Self {
        self.to = Some(recipient.into());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn notification(mut self, notification: FcmNotification) -> Self {
        self.notification = Some(notification);
        self
    }

    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn collapse_key(mut self, key: impl Into<String>) -> Self {
        self.collapse_key = Some(key.into());
        self
    }

    pub fn content_available(mut self, enabled: bool) -> Self {
        self.content_available = Some(enabled);
        self
    }

    pub fn mutable_content(mut self, enabled: bool) -> Self {
        self.mutable_content = Some(enabled);
        self
    }

    pub fn time_to_live(mut self, seconds: u32) -> Self {
        self.time_to_live = Some(seconds);
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = Some(enabled);
        self
    }

    pub fn restricted_package_name(mut self, package: impl Into<String>) -> Self {
        self.restricted_package_name = Some(package.into());
        self
    }

    /// 替换当前目标，渠道在逐批发送时使用
    pub fn set_to(&mut self, recipient: Recipient) {
        self.to = Some(recipient);
    }

    /// 取出当前目标，消息随后没有目标
    pub fn take_to(&mut self) -> Option<Recipient> {
        self.to.take()
    }

    pub fn get_to(&self) -> Option<&Recipient> {
        self.to.as_ref()
    }

    pub fn get_condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    /// # Summary
    /// 将消息编码为 FCM 请求体。
    ///
    /// # Logic
    /// 1. 列表目标写入 `registration_ids`，单个目标写入 `to`。
    /// 2. 未设置的可选字段不输出，`priority` 始终输出。
    /// 3. `time_to_live` 超过 4 周时拒绝编码。
    ///
    /// # Returns
    /// * 成功返回 JSON 字符串。
    /// * `time_to_live` 越界返回 `NotifyError::Config`，编码失败返回 `NotifyError::Serialization`。
    pub fn format_data(&self) -> Result<String, NotifyError> {
        if let Some(ttl) = self.time_to_live.filter(|ttl| *ttl > MAX_TIME_TO_LIVE) {
            return Err(NotifyError::Config(format!(
                "time_to_live {} exceeds the maximum of {} seconds",
                ttl, MAX_TIME_TO_LIVE
            )));
        }

        let (to, registration_ids) = match &self.to {
            Some(Recipient::Single(token)) => (Some(token.as_str()), None),
            Some(Recipient::Many(tokens)) => (None, Some(tokens.as_slice())),
            None => (None, None),
        };

        let payload = WirePayload {
            to,
            registration_ids,
            condition: self.condition.as_deref(),
            priority: self.priority,
            notification: self.notification.as_ref(),
            data: self.data.as_ref(),
            collapse_key: self.collapse_key.as_deref(),
            content_available: self.content_available,
            mutable_content: self.mutable_content,
            time_to_live: self.time_to_live,
            dry_run: self.dry_run,
            restricted_package_name: self.restricted_package_name.as_deref(),
        };

        serde_json::to_string(&payload).map_err(|e| NotifyError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encoded(message: &FcmMessage) -> Value {
        serde_json::from_str(&message.format_data().unwrap()).unwrap()
    }

    #[test]
    fn test_single_recipient_uses_to() {
        let message = FcmMessage::new().to("abc");
        assert_eq!(encoded(&message), json!({"to": "abc", "priority": "normal"}));
    }

    #[test]
    fn test_list_recipient_uses_registration_ids() {
        let message = FcmMessage::new()
            .to(vec!["a".to_string(), "b".to_string()])
            .priority(Priority::High);
        assert_eq!(
            encoded(&message),
            json!({"registration_ids": ["a", "b"], "priority": "high"})
        );
    }

    #[test]
    fn test_full_payload() {
        let mut data = Map::new();
        data.insert("order_id".to_string(), json!("42"));

        let message = FcmMessage::new()
            .condition("'news' in topics || 'sport' in topics")
            .notification(FcmNotification::new("Hello", "World"))
            .data(data)
            .collapse_key("updates")
            .content_available(true)
            .mutable_content(false)
            .time_to_live(3600)
            .dry_run(true)
            .restricted_package_name("com.example.app");

        assert_eq!(
            encoded(&message),
            json!({
                "condition": "'news' in topics || 'sport' in topics",
                "priority": "normal",
                "notification": {"title": "Hello", "body": "World"},
                "data": {"order_id": "42"},
                "collapse_key": "updates",
                "content_available": true,
                "mutable_content": false,
                "time_to_live": 3600,
                "dry_run": true,
                "restricted_package_name": "com.example.app"
            })
        );
    }

    #[test]
    fn test_take_to_moves_recipient_out() {
        let mut message = FcmMessage::new().to(vec!["a".to_string()]);
        assert_eq!(message.take_to(), Some(Recipient::Many(vec!["a".to_string()])));
        assert_eq!(message.get_to(), None);
    }

    #[test]
    fn test_time_to_live_limit() {
        let message = FcmMessage::new().to("abc").time_to_live(MAX_TIME_TO_LIVE);
        assert!(message.format_data().is_ok());

        let message = FcmMessage::new().to("abc").time_to_live(MAX_TIME_TO_LIVE + 1);
        assert!(matches!(message.format_data(), Err(NotifyError::Config(_))));
    }

    #[test]
    fn test_deserialize_from_file_format() {
        let message: FcmMessage = serde_json::from_value(json!({
            "registration_ids": ["t1", "t2"],
            "priority": "high",
            "notification": {"title": "Hi"}
        }))
        .unwrap();

        assert_eq!(
            message.get_to(),
            Some(&Recipient::Many(vec!["t1".to_string(), "t2".to_string()]))
        );
        assert_eq!(message.get_condition(), None);
        assert_eq!(
            encoded(&message),
            json!({
                "registration_ids": ["t1", "t2"],
                "priority": "high",
                "notification": {"title": "Hi"}
            })
        );
    }
}
