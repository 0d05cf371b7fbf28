//! Session module: owns the single engine instance and its bootstrap.
//!
//! A [`TranscoderSession`] fetches the three engine assets, stages them and
//! loads the engine exactly once. Engine log messages are forwarded to a
//! [`StatusReporter`](crate::status::StatusReporter) from the moment loading
//! starts.
//!
//! # Example
//!
//! ```ignore
//! use audex_core::session::TranscoderSession;
//!
//! let session = TranscoderSession::new(engine, fetcher, stager, reporter);
//! session.initialize(&config.engine.assets).await?;
//! assert!(session.is_ready().await);
//! ```

mod error;
#[allow(clippy::module_inception)]
mod session;

pub use error::SessionError;
pub use session::{SessionState, SessionStateCallback, TranscoderSession};
