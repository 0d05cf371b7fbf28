//! HTTP surface for audex: upload an MP4, load the engine, download the MP3.

pub mod api;
pub mod metrics;
pub mod state;
