use crate::notify::port::MessageSource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// # Summary
/// 推送目标：单个设备 token 或有序的 token 列表。
///
/// # Invariants
/// - `Many` 中的顺序即投递顺序，分批时必须保持。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipient {
    // 单个设备 token
    Single(String),
    // 多个设备 token，超过上限时按批发送
    Many(Vec<String>),
}

impl Recipient {
    /// 空字符串或空列表视为没有可用目标
    pub fn is_empty(&self) -> bool {
        match self {
            Recipient::Single(token) => token.is_empty(),
            Recipient::Many(tokens) => tokens.is_empty(),
        }
    }
}

impl From<&str> for Recipient {
    fn from(token: &str) -> Self {
        Recipient::Single(token.to_string())
    }
}

impl From<String> for Recipient {
    fn from(token: String) -> Self {
        Recipient::Single(token)
    }
}

impl From<Vec<String>> for Recipient {
    fn from(tokens: Vec<String>) -> Self {
        Recipient::Many(tokens)
    }
}

/// # Summary
/// 单个设备的投递结果，对应响应中 `results` 数组的一项。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    // token 已被替换时返回的新 token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    // 例如 InvalidRegistration、NotRegistered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// # Summary
/// 一次批量提交的响应体解析结果。
///
/// # Invariants
/// - 缺失的计数字段按 0 处理。
/// - 未识别的字段原样保存在 `extra` 中。
/// - topic / condition 请求的响应只有 `message_id` 或 `error`，没有计数字段。
/// - ID 字段不做类型约束，数字与字符串形式都原样保留。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    // 响应的 HTTP 状态码，不来自响应体
    #[serde(skip)]
    pub http_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multicast_id: Option<Value>,
    #[serde(default)]
    pub success: u64,
    #[serde(default)]
    pub failure: u64,
    #[serde(default)]
    pub canonical_ids: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<SendResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BatchResult {
    /// # Summary
    /// 判断该批次是否被推送平台判定为失败。
    ///
    /// # Logic
    /// 1. 非 2xx 的 HTTP 状态即失败，与响应体内容无关。
    /// 2. `failure` 计数非零即失败。
    /// 3. 没有计数字段的 topic / condition 响应，以顶层 `error` 判定。
    pub fn is_failure(&self) -> bool {
        let rejected = self
            .http_status
            .is_some_and(|status| !(200..300).contains(&status));
        rejected || self.failure > 0 || self.error.is_some()
    }

    /// 收集 `results` 中出现的错误码
    pub fn errors(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter_map(|r| r.error.as_deref())
            .chain(self.error.as_deref())
            .collect()
    }
}

/// # Summary
/// 一次 `send` 调用的全部批次结果。
///
/// # Invariants
/// - 顺序与分批顺序一致，每个已提交批次恰好一项。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryReport {
    batches: Vec<BatchResult>,
}

impl DeliveryReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: BatchResult) {
        self.batches.push(result);
    }

    pub fn batches(&self) -> &[BatchResult] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<BatchResult> {
        self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BatchResult> {
        self.batches.iter()
    }

    pub fn failed_batches(&self) -> impl Iterator<Item = &BatchResult> {
        self.batches.iter().filter(|b| b.is_failure())
    }

    pub fn total_success(&self) -> u64 {
        self.batches.iter().map(|b| b.success).sum()
    }

    pub fn total_failure(&self) -> u64 {
        self.batches.iter().map(|b| b.failure).sum()
    }
}

impl<'a> IntoIterator for &'a DeliveryReport {
    type Item = &'a BatchResult;
    type IntoIter = std::slice::Iter<'a, BatchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches.iter()
    }
}

impl IntoIterator for DeliveryReport {
    type Item = BatchResult;
    type IntoIter = std::vec::IntoIter<BatchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.batches.into_iter()
    }
}

/// # Summary
/// 批次投递失败事件，交给 `FailureSink` 订阅者处理。
///
/// # Invariants
/// - `report` 即该批次解析后的响应体，与 `DeliveryReport` 中对应项相同。
pub struct NotificationFailed<'a, N> {
    // 被通知的实体
    pub notifiable: &'a N,
    // 原始通知
    pub notification: &'a dyn MessageSource<N>,
    // 渠道标识，例如 "fcm"
    pub channel: &'a str,
    // 失败批次的响应体
    pub report: &'a BatchResult,
}
