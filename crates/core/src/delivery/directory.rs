//! Delivery into a local directory.

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use super::error::DeliveryError;
use super::traits::OutputDelivery;
use super::types::{is_valid_filename, DeliveryReceipt};
use crate::metrics::DELIVERIES_TOTAL;
use crate::pipeline::ConversionResult;

/// Saves results into a directory.
///
/// Bytes go to a hidden `.<filename>.partial` file first, which is then
/// renamed over `<filename>`. The partial file never outlives `deliver`.
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn partial_path(&self, filename: &str) -> PathBuf {
        self.dir.join(format!(".{}.partial", filename))
    }

    async fn write_partial(&self, path: &Path, bytes: &[u8]) -> Result<(), DeliveryError> {
        let write_failed = |source| DeliveryError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).await.map_err(write_failed)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes).await.map_err(write_failed)?;
        writer.flush().await.map_err(write_failed)?;
        writer.get_ref().sync_all().await.map_err(write_failed)?;
        Ok(())
    }

    async fn save(
        &self,
        partial: &Path,
        destination: &Path,
        bytes: &[u8],
    ) -> Result<(), DeliveryError> {
        self.write_partial(partial, bytes).await?;
        fs::rename(partial, destination)
            .await
            .map_err(|error| DeliveryError::MoveFailed {
                source: partial.to_path_buf(),
                destination: destination.to_path_buf(),
                error,
            })
    }
}

#[async_trait]
impl OutputDelivery for DirectoryDelivery {
    fn name(&self) -> &str {
        "directory"
    }

    async fn deliver(
        &self,
        result: &ConversionResult,
        filename: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        if !is_valid_filename(filename) {
            return Err(DeliveryError::InvalidFilename {
                filename: filename.to_string(),
            });
        }

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DeliveryError::DirectoryCreationFailed {
                path: self.dir.clone(),
                source,
            })?;

        let partial = self.partial_path(filename);
        let destination = self.dir.join(filename);
        debug!(partial = %partial.display(), "Writing transient output");

        if let Err(e) = self.save(&partial, &destination, result.bytes()).await {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %partial.display(), error = %cleanup, "Failed to remove transient output");
                }
            }
            DELIVERIES_TOTAL.with_label_values(&["failed"]).inc();
            return Err(e);
        }

        DELIVERIES_TOTAL.with_label_values(&["success"]).inc();
        info!(
            request_id = %result.request_id(),
            destination = %destination.display(),
            size_bytes = result.size_bytes(),
            "Delivered extracted audio"
        );

        Ok(DeliveryReceipt {
            request_id: result.request_id(),
            filename: filename.to_string(),
            mime_type: result.mime_type().to_string(),
            size_bytes: result.size_bytes(),
            destination: Some(destination),
            delivered_at: Utc::now(),
        })
    }
}
