//! System orchestration, startup, shutdown and logging setup.

pub mod pipeline_system;
pub mod telemetry;

pub use pipeline_system::*;
pub use telemetry::*;
