//! Length-prefixed framing as a tokio codec.
//!
//! ## Wire Format
//! ```text
//! [Length(4, i32 big-endian)] [Payload(Length)]
//! ```
//!
//! The prefix counts payload bytes; there is no terminator. Both ends use
//! network byte order. A zero prefix is an empty payload, a negative one is
//! rejected, and anything above the configured ceiling is rejected before
//! buffer space is reserved for it.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::config::MAX_MESSAGE_SIZE;
use crate::error::{ProtocolError, Result};

/// Size of the length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Codec for length-prefixed messages
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    max_message_size: usize,
}

impl MessageCodec {
    pub fn new(max_message_size: usize) -> Self {
        Self { max_message_size }
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(MAX_MESSAGE_SIZE)
    }
}

impl Decoder for MessageCodec {
    type Item = Bytes;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if src.len() < LENGTH_PREFIX_SIZE {
            return Ok(None);
        }

        let raw = i32::from_be_bytes([src[0], src[1], src[2], src[3]]);
        let len = usize::try_from(raw).map_err(|_| ProtocolError::InvalidLength(raw))?;
        if len > self.max_message_size {
            return Err(ProtocolError::OversizedMessage(len));
        }

        let frame_len = LENGTH_PREFIX_SIZE + len;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX_SIZE);
        trace!(len, "Decoded message frame");
        Ok(Some(src.split_to(len).freeze()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            // leftover bytes mean the peer hung up mid-frame
            None if !src.is_empty() => Err(ProtocolError::ConnectionClosed),
            None => Ok(None),
        }
    }
}

impl Encoder<Bytes> for MessageCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_message_size {
            return Err(ProtocolError::OversizedMessage(item.len()));
        }
        let len = i32::try_from(item.len())
            .map_err(|_| ProtocolError::OversizedMessage(item.len()))?;

        dst.reserve(LENGTH_PREFIX_SIZE + item.len());
        dst.put_i32(len);
        dst.extend_from_slice(&item);
        Ok(())
    }
}
