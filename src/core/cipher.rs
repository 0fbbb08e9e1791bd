//! Modular one-time-pad arithmetic over the 27-symbol alphabet.
//!
//! Encryption adds the key value to the text value modulo 27, decryption
//! subtracts it. The two directions are exact inverses for a fixed key.

use crate::core::alphabet::{self, ALPHABET_SIZE};
use crate::core::message::Message;
use crate::error::{ProtocolError, Result};

/// Which way the cipher runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    #[inline]
    fn apply(self, text: u8, key: u8) -> u8 {
        match self {
            Direction::Encrypt => (text + key) % ALPHABET_SIZE,
            Direction::Decrypt => (text + ALPHABET_SIZE - key) % ALPHABET_SIZE,
        }
    }
}

/// Apply the cipher symbol by symbol.
///
/// `text` and `key` must have the same length; callers holding a longer key
/// go through [`CipherPair`], which truncates it first.
///
/// # Errors
/// `ProtocolError::LengthMismatch` when the lengths differ.
pub fn transform(text: &Message, key: &Message, direction: Direction) -> Result<Message> {
    if text.len() != key.len() {
        return Err(ProtocolError::LengthMismatch {
            text_len: text.len(),
            key_len: key.len(),
        });
    }

    let output = text
        .as_bytes()
        .iter()
        .zip(key.as_bytes())
        .map(|(&t, &k)| {
            let value = direction.apply(alphabet::value_of(t)?, alphabet::value_of(k)?);
            alphabet::symbol_of(value)
        })
        .collect::<Result<Vec<u8>>>()?;

    Ok(Message::from_symbols(output))
}

/// A text together with a key at least as long as it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherPair {
    text: Message,
    key: Message,
}

impl CipherPair {
    /// Pair a text with its key.
    ///
    /// # Errors
    /// `ProtocolError::KeyTooShort` if the key has fewer symbols than the text.
    pub fn new(text: Message, key: Message) -> Result<Self> {
        if key.len() < text.len() {
            return Err(ProtocolError::KeyTooShort {
                text_len: text.len(),
                key_len: key.len(),
            });
        }
        Ok(Self { text, key })
    }

    pub fn text(&self) -> &Message {
        &self.text
    }

    pub fn key(&self) -> &Message {
        &self.key
    }

    /// Run the cipher with the key truncated to the text length.
    pub fn apply(&self, direction: Direction) -> Result<Message> {
        let key = self
            .key
            .prefix(self.text.len())
            .ok_or(ProtocolError::KeyTooShort {
                text_len: self.text.len(),
                key_len: self.key.len(),
            })?;
        transform(&self.text, &key, direction)
    }
}
