//! Status reporting: surfaces engine log and progress text to the user.

mod reporter;

pub use reporter::{FanoutReporter, LatestStatus, StatusReporter, StatusUpdate, TracingReporter};
