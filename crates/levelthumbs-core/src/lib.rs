//! Service plumbing shared by Level Thumbnails services.

pub mod config;
pub mod middleware;
pub mod serde;
pub mod tracing;
