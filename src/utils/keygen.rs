//! Random key generation.
//!
//! Every symbol is drawn independently and uniformly from the 27-symbol
//! alphabet. Key quality is bounded by the RNG handed in; the default uses
//! the thread-local generator seeded from the OS.

use rand::Rng;

use crate::core::alphabet::{self, ALPHABET_SIZE};
use crate::core::message::Message;
use crate::error::Result;

/// Generate a key of `len` symbols with the thread-local RNG.
pub fn generate_key(len: usize) -> Result<Message> {
    generate_key_with(&mut rand::rng(), len)
}

/// Generate a key of `len` symbols with the given RNG.
pub fn generate_key_with<R: Rng>(rng: &mut R, len: usize) -> Result<Message> {
    let symbols = (0..len)
        .map(|_| alphabet::symbol_of(rng.random_range(0..ALPHABET_SIZE)))
        .collect::<Result<Vec<u8>>>()?;
    Ok(Message::from_symbols(symbols))
}
