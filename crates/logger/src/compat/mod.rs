//! Compatibility bridges for other logging crates

#[cfg(feature = "log-compat")]
pub mod log_bridge;

#[cfg(feature = "tracing-compat")]
pub mod tracing_bridge;

#[cfg(feature = "log-compat")]
pub use log_bridge::{LogBridge, install_log_bridge};

#[cfg(feature = "tracing-compat")]
pub use tracing_bridge::{TracingBridge, install_tracing_bridge};
