//! # Core Cipher Components
//!
//! The alphabet, the modular cipher, and the wire codec.
//!
//! ## Components
//! - **Alphabet**: symbol <-> value mapping for `A`..=`Z` and space
//! - **Message**: validated symbol strings
//! - **Cipher**: mod-27 add/subtract transform and key/text pairing
//! - **Codec**: Tokio codec for length-prefixed framing over byte streams
//!
//! ## Wire Format
//! ```text
//! [Length(4, i32 big-endian)] [Payload(N)]
//! ```
//!
//! ## Security
//! - Maximum message size: 16MB by default (prevents memory exhaustion)
//! - Length validation before allocation

pub mod alphabet;
pub mod cipher;
pub mod codec;
pub mod message;
