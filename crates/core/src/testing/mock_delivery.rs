//! Mock output delivery for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::delivery::{is_valid_filename, DeliveryError, DeliveryReceipt, OutputDelivery};
use crate::pipeline::ConversionResult;

/// A recorded delivery for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDelivery {
    pub request_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Mock implementation of the OutputDelivery trait. Keeps delivered bytes in memory.
#[derive(Debug, Default)]
pub struct MockDelivery {
    deliveries: Arc<RwLock<Vec<RecordedDelivery>>>,
    /// If set, the next delivery will fail with this error.
    next_error: Arc<RwLock<Option<DeliveryError>>>,
}

impl MockDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_next_error(&self, error: DeliveryError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded(&self) -> Vec<RecordedDelivery> {
        self.deliveries.read().await.clone()
    }

    pub async fn delivery_count(&self) -> usize {
        self.deliveries.read().await.len()
    }
}

#[async_trait]
impl OutputDelivery for MockDelivery {
    fn name(&self) -> &str {
        "mock"
    }

    async fn deliver(
        &self,
        result: &ConversionResult,
        filename: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if !is_valid_filename(filename) {
            return Err(DeliveryError::InvalidFilename {
                filename: filename.to_string(),
            });
        }

        self.deliveries.write().await.push(RecordedDelivery {
            request_id: result.request_id(),
            filename: filename.to_string(),
            mime_type: result.mime_type().to_string(),
            bytes: result.bytes().to_vec(),
        });

        Ok(DeliveryReceipt {
            request_id: result.request_id(),
            filename: filename.to_string(),
            mime_type: result.mime_type().to_string(),
            size_bytes: result.size_bytes(),
            destination: None,
            delivered_at: Utc::now(),
        })
    }
}
