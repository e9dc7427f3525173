//! Common types and utilities for the mydbs sample client.
//!
//! The shared dependency stack is re-exported here so that the other
//! member crates only need a dependency on `mydbs_common`.

pub mod config;
pub mod error;
pub mod resource;

pub use anyhow;
pub use clap;
pub use serde;
pub use serde_json;
pub use time;
pub use tokio;
pub use tracing;
pub use tracing_subscriber;
