//! # Protocol Layer
//!
//! Connection-level protocol steps that sit above the wire codec.
//!
//! ## Components
//! - **Handshake**: fixed 3-byte role tag exchange
//! - **Family**: binds a role tag to a cipher direction
//!
//! ## Exchange Order
//! ```text
//! client -> server : tag(3)          server -> client : tag(3)
//! client -> server : [len][text]
//! client -> server : [len][key]
//! server -> client : [len][result]   (then close)
//! ```

pub mod family;
pub mod handshake;

#[cfg(test)]
mod tests;
