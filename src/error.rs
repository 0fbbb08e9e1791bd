//! # Error Types
//!
//! Error handling for the cipher protocol.
//!
//! Every failure is local to one connection (server worker) or one process
//! invocation (client, tools). Nothing here is retried.
//!
//! ## Error Categories
//! - **Input validation**: non-alphabet symbols, short keys, unreadable files
//! - **Handshake**: role tag mismatch, peer closed while exchanging tags
//! - **Transport**: I/O failures, malformed length prefixes, early EOF
//! - **Resource**: messages whose announced length exceeds the ceiling
//! - **Configuration**: invalid or unparsable settings
//!
//! ## Example Usage
//! ```rust
//! use otp_protocol::error::{ProtocolError, Result};
//! use otp_protocol::core::alphabet;
//!
//! fn first_value(text: &[u8]) -> Result<u8> {
//!     let first = text.first().ok_or(ProtocolError::ConnectionClosed)?;
//!     alphabet::value_of(*first)
//! }
//!
//! assert_eq!(first_value(b"B").unwrap(), 1);
//! assert!(first_value(b"b").is_err());
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Handshake errors
    pub const ERR_ROLE_MISMATCH: &str = "Peer declared a foreign role tag";

    /// Loader errors
    pub const ERR_FILE_OPEN: &str = "Unable to open file";

    /// Server lifecycle errors
    pub const ERR_BIND: &str = "Unable to bind listening socket";
    pub const ERR_NO_ADDRESS: &str = "Host did not resolve to any address";

    /// Key generation
    pub const ERR_KEY_LENGTH: &str = "Key length must be a positive integer";
}

// ProtocolError is the primary error type for all protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Invalid length prefix: {0}")]
    InvalidLength(i32),

    #[error("Message too large: {0} bytes")]
    OversizedMessage(usize),

    #[error("Handshake failed: {0}")]
    HandshakeError(String),

    #[error("Invalid symbol byte 0x{byte:02x} at position {position}")]
    InvalidSymbol { byte: u8, position: usize },

    #[error("Symbol value out of range: {0}")]
    InvalidSymbolValue(u8),

    #[error("Key shorter than text: key has {key_len} symbols, text has {text_len}")]
    KeyTooShort { text_len: usize, key_len: usize },

    #[error("Text and key lengths differ: text has {text_len} symbols, key has {key_len}")]
    LengthMismatch { text_len: usize, key_len: usize },

    #[error("{path}: {reason}")]
    Loader { path: PathBuf, reason: String },

    #[error("Worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// Process exit status for a fatal error.
    ///
    /// Handshake rejections exit with `2` so scripts can tell "wrong server"
    /// apart from every other failure, which exits with `1`.
    pub fn exit_code(&self) -> u8 {
        match self {
            ProtocolError::HandshakeError(_) => 2,
            _ => 1,
        }
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
