//! Validated symbol strings.
//!
//! A [`Message`] only ever holds bytes from the cipher alphabet, so anything
//! that reaches the cipher or the wire through this type is already checked.

use bytes::Bytes;
use std::fmt;
use std::str::FromStr;

use crate::core::alphabet;
use crate::error::{ProtocolError, Result};

/// An ordered sequence of alphabet symbols.
///
/// Backed by [`Bytes`] so taking a prefix or handing the payload to the codec
/// never copies.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Message(Bytes);

impl Message {
    /// Build a message, rejecting any byte outside the alphabet.
    pub fn new(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        alphabet::validate(&data)?;
        Ok(Self(data))
    }

    /// Wrap bytes the caller has produced from alphabet symbols only.
    pub(crate) fn from_symbols(data: Vec<u8>) -> Self {
        debug_assert!(data.iter().all(|&b| alphabet::is_symbol(b)));
        Self(Bytes::from(data))
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the symbols as text. Alphabet symbols are ASCII, so this is lossless.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// The first `len` symbols, or `None` when the message is shorter.
    pub fn prefix(&self, len: usize) -> Option<Message> {
        (len <= self.0.len()).then(|| Message(self.0.slice(..len)))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Message").field(&self.as_str()).finish()
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Message::new(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl TryFrom<&str> for Message {
    type Error = ProtocolError;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl TryFrom<Vec<u8>> for Message {
    type Error = ProtocolError;

    fn try_from(data: Vec<u8>) -> Result<Self> {
        Message::new(data)
    }
}

impl TryFrom<Bytes> for Message {
    type Error = ProtocolError;

    fn try_from(data: Bytes) -> Result<Self> {
        Message::new(data)
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
