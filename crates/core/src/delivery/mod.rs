//! Delivery module: hands extracted audio to the user.
//!
//! [`OutputDelivery`] is the save action. [`DirectoryDelivery`] saves into a
//! local directory through a transient partial file; the HTTP server delivers
//! by streaming an attachment and may also save a copy.

mod config;
mod directory;
mod error;
mod traits;
mod types;

pub use config::DeliveryConfig;
pub use directory::DirectoryDelivery;
pub use error::DeliveryError;
pub use traits::OutputDelivery;
pub use types::{is_valid_filename, DeliveryReceipt};
