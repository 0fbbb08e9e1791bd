//! # Cipher Services
//!
//! The TCP server and client for both cipher families.
//!
//! ## Components
//! - **Server**: accept loop with one isolated worker per connection
//! - **Client**: one linear, fail-fast exchange per run

pub mod client;
pub mod server;

pub use client::{run_client, ConnectionClient};
pub use server::{start_server, ConnectionServer, ConnectionState, WorkerOutcome};
