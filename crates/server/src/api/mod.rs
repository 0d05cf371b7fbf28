pub mod engine;
pub mod error;
pub mod extract;
pub mod files;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod ws;

pub use error::ErrorResponse;
pub use routes::create_router;
pub use ws::{WsBroadcaster, WsMessage};
