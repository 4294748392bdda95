//! The two long-running services: the pipeline owner and the store sync worker.

pub mod pipeline_service;
pub mod store_sync;

pub use pipeline_service::*;
pub use store_sync::*;
