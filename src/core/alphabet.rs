//! The 27-symbol cipher alphabet: `A`..=`Z` followed by space.
//!
//! Symbols map to values in `0..27` in alphabet order, so `'A' -> 0`,
//! `'Z' -> 25` and `' ' -> 26`. The mapping is a bijection.

use crate::error::{ProtocolError, Result};

/// Number of symbols in the alphabet (and the cipher modulus)
pub const ALPHABET_SIZE: u8 = 27;

/// Value assigned to the space symbol
pub const SPACE_VALUE: u8 = 26;

/// Whether `symbol` belongs to the alphabet.
#[inline]
pub fn is_symbol(symbol: u8) -> bool {
    symbol.is_ascii_uppercase() || symbol == b' '
}

/// Map a symbol to its value in `0..27`.
#[inline]
pub fn value_of(symbol: u8) -> Result<u8> {
    match symbol {
        b'A'..=b'Z' => Ok(symbol - b'A'),
        b' ' => Ok(SPACE_VALUE),
        other => Err(ProtocolError::InvalidSymbol {
            byte: other,
            position: 0,
        }),
    }
}

/// Map a value in `0..27` back to its symbol.
#[inline]
pub fn symbol_of(value: u8) -> Result<u8> {
    match value {
        SPACE_VALUE => Ok(b' '),
        v if v < SPACE_VALUE => Ok(b'A' + v),
        other => Err(ProtocolError::InvalidSymbolValue(other)),
    }
}

/// Check that every byte of `data` is an alphabet symbol.
///
/// # Errors
/// `ProtocolError::InvalidSymbol` naming the first offending byte and its index.
pub fn validate(data: &[u8]) -> Result<()> {
    match data.iter().position(|&b| !is_symbol(b)) {
        Some(position) => Err(ProtocolError::InvalidSymbol {
            byte: data[position],
            position,
        }),
        None => Ok(()),
    }
}

/// Iterator over every symbol, in value order.
pub fn symbols() -> impl Iterator<Item = u8> {
    (b'A'..=b'Z').chain(std::iter::once(b' '))
}
