//! The two protocol families and what each one binds together.

use std::fmt;

use crate::core::cipher::Direction;
use crate::protocol::handshake::RoleTag;

/// Encryption or decryption service.
///
/// Client and server of one family present the same tag; the server runs
/// the cipher in the family's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherFamily {
    Encryption,
    Decryption,
}

impl CipherFamily {
    pub fn tag(self) -> RoleTag {
        match self {
            CipherFamily::Encryption => RoleTag::ENC,
            CipherFamily::Decryption => RoleTag::DEC,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            CipherFamily::Encryption => Direction::Encrypt,
            CipherFamily::Decryption => Direction::Decrypt,
        }
    }
}

impl fmt::Display for CipherFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherFamily::Encryption => f.write_str("encryption"),
            CipherFamily::Decryption => f.write_str("decryption"),
        }
    }
}
