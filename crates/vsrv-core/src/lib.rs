//! Request-path services for the video server.
//!
//! This crate provides:
//! - Upload rate limiting and rate-limited uploads
//! - Cache-aside watch counts with per-viewer dedupe
//! - Video listings with tag joins
//! - Clip cutting (extract, upload, clean up)
//! - Configuration, tracing setup and operation logging

pub mod catalog;
pub mod clip;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod services;
pub mod upload;
pub mod watch_count;

#[cfg(test)]
mod test_support;

pub use catalog::VideoCatalog;
pub use clip::ClipService;
pub use config::{CacheFailurePolicy, CoreConfig};
pub use error::{ServiceError, ServiceResult};
pub use logging::{init_tracing, OperationLogger};
pub use rate_limit::RateLimiter;
pub use services::CoreServices;
pub use upload::UploadService;
pub use watch_count::WatchCountCache;
