//! # OTP Protocol
//!
//! A one-time-pad style stream cipher over the 27-symbol alphabet
//! (`A`..=`Z` and space), served over TCP in two mirrored families:
//! encryption and decryption.
//!
//! ## Layers
//! - [`core`]: alphabet, validated messages, mod-27 cipher, length-prefix codec
//! - [`protocol`]: 3-byte role handshake and the family bindings
//! - [`transport`]: framed message send/receive over any async stream
//! - [`service`]: the accept-loop server and the one-shot client
//! - [`utils`]: file loader, key generator, logging, metrics
//!
//! ## Example
//! ```rust
//! use otp_protocol::core::cipher::{transform, Direction};
//! use otp_protocol::core::message::Message;
//!
//! let text: Message = "HELLO".parse().unwrap();
//! let key: Message = "XMCKL".parse().unwrap();
//! let sealed = transform(&text, &key, Direction::Encrypt).unwrap();
//! assert_eq!(sealed.as_str(), "DQNVZ");
//! assert_eq!(transform(&sealed, &key, Direction::Decrypt).unwrap(), text);
//! ```
//!
//! The cipher is only as strong as the key handling around it: keys must be
//! random, at least as long as the text, and never reused. The transport is
//! not encrypted and the role tag is not authentication.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use crate::core::cipher::{CipherPair, Direction};
pub use crate::core::message::Message;
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::family::CipherFamily;
pub use crate::protocol::handshake::RoleTag;
