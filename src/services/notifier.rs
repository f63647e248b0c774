// src/services/notifier.rs

//! Notification dispatch.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, Result};

/// What the dispatch service reported for a publish call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReceipt {
    /// HTTP-style status code, if the service reported one
    pub status_code: Option<u16>,

    /// Identifier assigned to the published message
    pub message_id: Option<String>,
}

/// Pub/sub dispatch service.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, message: &str) -> Result<PublishReceipt>;
}

/// Sends text notifications to a configured topic.
pub struct Notifier {
    publisher: Arc<dyn Publisher>,
    topic: Option<String>,
}

impl Notifier {
    pub fn new(publisher: Arc<dyn Publisher>, topic: Option<String>) -> Self {
        Self { publisher, topic }
    }

    /// Publish `message`, returning whether the service answered 200.
    ///
    /// Errors if no topic is configured or the publish call itself fails.
    pub async fn send(&self, message: &str) -> Result<bool> {
        log::info!("Sending notification...");
        let topic = self
            .topic
            .as_deref()
            .ok_or_else(|| AppError::config("No notification topic configured"))?;

        let receipt = self
            .publisher
            .publish(topic, message)
            .await
            .map_err(|e| AppError::notify(format!("Failed to publish to {topic}"), e))?;

        log::info!(
            "Notification send response received with status {:?} (message id {:?})",
            receipt.status_code,
            receipt.message_id
        );
        Ok(receipt.status_code == Some(200))
    }
}

/// Publisher that prints messages instead of dispatching them.
#[derive(Debug, Default)]
pub struct ConsolePublisher;

#[async_trait]
impl Publisher for ConsolePublisher {
    async fn publish(&self, topic: &str, message: &str) -> Result<PublishReceipt> {
        println!("[{topic}] {message}");
        Ok(PublishReceipt {
            status_code: Some(200),
            message_id: None,
        })
    }
}

#[cfg(feature = "sns")]
pub use sns::SnsPublisher;

#[cfg(feature = "sns")]
mod sns {
    use async_trait::async_trait;
    use aws_sdk_sns::Client;

    use super::{PublishReceipt, Publisher};
    use crate::error::{AppError, Result};

    /// Amazon SNS publisher.
    #[derive(Clone)]
    pub struct SnsPublisher {
        client: Client,
    }

    impl SnsPublisher {
        pub fn new(client: Client) -> Self {
            Self { client }
        }
    }

    #[async_trait]
    impl Publisher for SnsPublisher {
        async fn publish(&self, topic: &str, message: &str) -> Result<PublishReceipt> {
            let output = self
                .client
                .publish()
                .topic_arn(topic)
                .message(message)
                .send()
                .await
                .map_err(|e| AppError::notify("SNS publish failed", e.into_service_error()))?;

            // The SDK only yields an output for a successful exchange, and SNS
            // answers a successful Publish with 200.
            Ok(PublishReceipt {
                status_code: Some(200),
                message_id: output.message_id().map(str::to_string),
            })
        }
    }
}
