//! Trait definitions for the delivery module.

use async_trait::async_trait;

use super::error::DeliveryError;
use super::types::DeliveryReceipt;
use crate::pipeline::ConversionResult;

/// Hands extracted audio to the user under a given filename.
#[async_trait]
pub trait OutputDelivery: Send + Sync {
    /// Returns the name of this delivery implementation.
    fn name(&self) -> &str;

    /// Saves `result` as `filename`. Any transient resource acquired for the
    /// save is released before this returns, whether it succeeded or not.
    async fn deliver(
        &self,
        result: &ConversionResult,
        filename: &str,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}
