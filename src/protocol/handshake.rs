//! Role handshake run once at the start of every connection.
//!
//! Each side writes its own 3-byte [`RoleTag`] (no length prefix) and reads
//! exactly three bytes back. The connection proceeds only when the received
//! tag is the one expected; otherwise it is shut down before any message is
//! exchanged. Server and client run the same exchange.

use std::fmt;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument, warn};

use crate::error::{constants, ProtocolError, Result};

/// Length of a role tag on the wire
pub const ROLE_TAG_LEN: usize = 3;

/// Fixed 3-byte role identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleTag([u8; ROLE_TAG_LEN]);

impl RoleTag {
    /// Tag presented by both ends of the encryption service
    pub const ENC: RoleTag = RoleTag(*b"enc");

    /// Tag presented by both ends of the decryption service
    pub const DEC: RoleTag = RoleTag(*b"dec");

    pub const fn new(bytes: [u8; ROLE_TAG_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ROLE_TAG_LEN] {
        &self.0
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.escape_ascii())
    }
}

impl fmt::Debug for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoleTag({self})")
    }
}

/// Exchange role tags over `stream` and verify the peer's.
///
/// Partial reads are retried until three bytes arrive. A peer that closes
/// before that yields `ProtocolError::ConnectionClosed`.
///
/// # Errors
/// `ProtocolError::HandshakeError` when the peer's tag differs from
/// `expected`; the stream has been shut down by then.
#[instrument(skip_all, fields(own = %own, expected = %expected))]
pub async fn perform_as<S>(stream: &mut S, own: RoleTag, expected: RoleTag) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(own.as_bytes()).await?;
    stream.flush().await?;

    let mut received = [0u8; ROLE_TAG_LEN];
    stream
        .read_exact(&mut received)
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => ProtocolError::ConnectionClosed,
            _ => ProtocolError::Io(e),
        })?;

    let peer = RoleTag(received);
    if peer != expected {
        warn!(peer = %peer, "Rejecting peer with foreign role tag");
        // best effort; the rejection is what gets reported
        let _ = stream.shutdown().await;
        return Err(ProtocolError::HandshakeError(format!(
            "{}: expected '{expected}', got '{peer}'",
            constants::ERR_ROLE_MISMATCH
        )));
    }

    debug!("Role handshake complete");
    Ok(())
}
