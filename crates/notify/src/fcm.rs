use crate::chunk::{MAX_RECIPIENTS_PER_REQUEST, into_batches};
use async_trait::async_trait;
use fcm_core::config::FcmConfig;
use fcm_core::notify::entity::{BatchResult, DeliveryReport, NotificationFailed, Recipient};
use fcm_core::notify::error::NotifyError;
use fcm_core::notify::message::FcmMessage;
use fcm_core::notify::port::{FailureSink, MessageSource, NotificationChannel, RecipientResolver};
use fcm_core::tls::install_crypto_provider;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// # Summary
/// A notification channel that delivers push messages via the FCM legacy HTTP API.
///
/// # Invariants
/// * All fields are read-only after construction; one instance can serve concurrent sends.
/// * Batches of a single `send` are submitted strictly in order, one round-trip at a time.
/// * `auth` always holds a valid `key=<api key>` header value.
pub struct FcmChannel<N> {
    /// The HTTP client used for requests.
    client: Client,
    /// Endpoint and credentials.
    config: FcmConfig,
    /// Pre-built `Authorization` header.
    auth: HeaderValue,
    /// Fallback lookup used when a message has no target.
    resolver: Arc<dyn RecipientResolver<N>>,
    /// Receives one event per failed batch.
    sink: Arc<dyn FailureSink<N>>,
}

impl<N: Sync + 'static> FcmChannel<N> {
    /// Channel identifier passed to the resolver and carried by failure events.
    pub const NAME: &'static str = "fcm";

    /// # Summary
    /// Creates a new `FcmChannel` around an existing HTTP client.
    ///
    /// # Logic
    /// 1. Validates the configuration.
    /// 2. Builds the `Authorization: key=...` header once and marks it sensitive.
    ///
    /// # Arguments
    /// * `client` - The shared reqwest client.
    /// * `config` - Endpoint, API key and timeout.
    /// * `resolver` - Fallback recipient lookup.
    /// * `sink` - Failure event subscriber.
    ///
    /// # Returns
    /// * A new instance of `FcmChannel` or `NotifyError::Config`.
    pub fn new(
        client: Client,
        config: FcmConfig,
        resolver: Arc<dyn RecipientResolver<N>>,
        sink: Arc<dyn FailureSink<N>>,
    ) -> Result<Self, NotifyError> {
        config.validate()?;

        let mut auth = HeaderValue::from_str(&format!("key={}", config.api_key))
            .map_err(|e| NotifyError::Config(format!("Invalid FCM api key: {}", e)))?;
        auth.set_sensitive(true);

        Ok(Self {
            client,
            config,
            auth,
            resolver,
            sink,
        })
    }

    /// # Summary
    /// Creates a new `FcmChannel` with its own HTTP client.
    ///
    /// # Logic
    /// 1. Installs the rustls crypto provider.
    /// 2. Builds a reqwest client with the configured timeout.
    /// 3. Delegates to `FcmChannel::new`.
    pub fn from_config(
        config: FcmConfig,
        resolver: Arc<dyn RecipientResolver<N>>,
        sink: Arc<dyn FailureSink<N>>,
    ) -> Result<Self, NotifyError> {
        install_crypto_provider();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Self::new(client, config, resolver, sink)
    }

    /// # Summary
    /// Delivers a notification to a notifiable entity.
    ///
    /// # Logic
    /// 1. Asks the notification for its message.
    /// 2. Without a recipient or condition, falls back to the resolver. No usable
    ///    recipient means nothing to send: an empty report is returned.
    /// 3. A recipient list is split into batches of at most 1000 tokens, each
    ///    submitted in order. A single token or a condition is submitted once.
    /// 4. Every failed batch raises a failure event right after its response.
    ///
    /// # Arguments
    /// * `notifiable` - The entity being notified.
    /// * `notification` - Produces the message for `notifiable`.
    ///
    /// # Returns
    /// * `Ok(DeliveryReport)` with one result per submitted batch, failed or not.
    /// * `Err(NotifyError)` on a transport or decoding error; later batches are not sent.
    pub async fn send(
        &self,
        notifiable: &N,
        notification: &dyn MessageSource<N>,
    ) -> Result<DeliveryReport, NotifyError> {
        let mut message = notification.to_fcm(notifiable);

        if message.get_to().is_none() && message.get_condition().is_none() {
            match self
                .resolver
                .route_notification_for(Self::NAME, notifiable, notification)
            {
                Some(recipient) if !recipient.is_empty() => message.set_to(recipient),
                _ => {
                    debug!("No FCM recipient resolved, nothing to send");
                    return Ok(DeliveryReport::new());
                }
            }
        }

        let mut report = DeliveryReport::new();

        match message.take_to() {
            Some(Recipient::Many(tokens)) => {
                let batches = into_batches(tokens, MAX_RECIPIENTS_PER_REQUEST);
                for (index, batch) in batches.enumerate() {
                    debug!("Submitting FCM batch {} with {} recipients", index, batch.len());
                    message.set_to(Recipient::Many(batch));

                    let result = self.submit(&message).await?;
                    self.inspect(notifiable, notification, &result);
                    report.push(result);
                }
            }
            single => {
                if let Some(recipient) = single {
                    message.set_to(recipient);
                }
                let result = self.submit(&message).await?;
                self.inspect(notifiable, notification, &result);
                report.push(result);
            }
        }

        info!(
            "FCM delivery finished: batches={}, success={}, failure={}",
            report.len(),
            report.total_success(),
            report.total_failure()
        );

        Ok(report)
    }

    /// # Summary
    /// Posts one message to FCM and parses the response.
    ///
    /// # Logic
    /// 1. Encodes the message.
    /// 2. POSTs it with the authorization and JSON content-type headers.
    /// 3. Parses the body and records the HTTP status on the result, so a
    ///    non-2xx status marks the batch failed whatever the body says.
    /// 4. A body that is not a JSON object is an error: a serialization error
    ///    on 2xx, a platform error otherwise.
    async fn submit(&self, message: &FcmMessage) -> Result<BatchResult, NotifyError> {
        let body = message.format_data()?;

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(AUTHORIZATION, self.auth.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        match serde_json::from_str::<BatchResult>(&text) {
            Ok(mut result) => {
                result.http_status = Some(status.as_u16());
                Ok(result)
            }
            Err(e) if status.is_success() => Err(NotifyError::Serialization(format!(
                "Invalid FCM response: {}",
                e
            ))),
            Err(_) => Err(NotifyError::Platform(format!(
                "FCM API error ({}): {}",
                status, text
            ))),
        }
    }

    fn inspect(&self, notifiable: &N, notification: &dyn MessageSource<N>, result: &BatchResult) {
        if !result.is_failure() {
            return;
        }

        debug!("Dispatching failure event for FCM batch: failure={}", result.failure);

        self.sink.notification_failed(&NotificationFailed {
            notifiable,
            notification,
            channel: Self::NAME,
            report: result,
        });
    }
}

#[async_trait]
impl<N: Sync + 'static> NotificationChannel<N> for FcmChannel<N> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn send(
        &self,
        notifiable: &N,
        notification: &dyn MessageSource<N>,
    ) -> Result<DeliveryReport, NotifyError> {
        FcmChannel::<N>::send(self, notifiable, notification).await
    }
}
