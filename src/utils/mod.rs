//! # Utility Modules
//!
//! Supporting pieces around the protocol core.
//!
//! ## Components
//! - **Loader**: reads texts and keys from files, validating the alphabet
//! - **Keygen**: uniform random keys over the alphabet
//! - **Logging**: structured logging configuration
//! - **Metrics**: listener-side counters

pub mod keygen;
pub mod loader;
pub mod logging;
pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};
