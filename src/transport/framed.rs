//! # Framed Transport
//!
//! Sends and receives single length-prefixed messages over an established
//! stream.
//!
//! The role handshake runs on the raw stream first; [`FramedTransport`]
//! takes the stream over afterwards, so no handshake bytes ever sit in the
//! framing buffer.
//!
//! ## Responsibilities
//! - Write the 4-byte prefix then the payload, flushing per message
//! - Reassemble a message from however many partial reads it takes
//! - Surface a peer that hangs up early as `ConnectionClosed`

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::trace;

use crate::core::codec::MessageCodec;
use crate::core::message::Message;
use crate::error::{ProtocolError, Result};

/// A stream carrying length-prefixed messages
pub struct FramedTransport<S> {
    framed: Framed<S, MessageCodec>,
}

impl<S> FramedTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap `stream` with a codec that rejects messages above `max_message_size`.
    pub fn new(stream: S, max_message_size: usize) -> Self {
        Self {
            framed: Framed::new(stream, MessageCodec::new(max_message_size)),
        }
    }

    /// Send one raw payload.
    pub async fn send(&mut self, payload: Bytes) -> Result<()> {
        trace!(len = payload.len(), "Sending message");
        self.framed.send(payload).await
    }

    /// Receive one raw payload.
    ///
    /// # Errors
    /// `ProtocolError::ConnectionClosed` if the stream ends before a full
    /// message arrives; codec errors for malformed or oversized prefixes.
    pub async fn receive(&mut self) -> Result<Bytes> {
        match self.framed.next().await {
            Some(frame) => {
                let frame = frame?;
                trace!(len = frame.len(), "Received message");
                Ok(frame)
            }
            None => Err(ProtocolError::ConnectionClosed),
        }
    }

    /// Send a validated message.
    pub async fn send_message(&mut self, message: &Message) -> Result<()> {
        self.send(message.clone().into_bytes()).await
    }

    /// Receive a message and check it against the alphabet.
    pub async fn receive_message(&mut self) -> Result<Message> {
        Message::try_from(self.receive().await?)
    }

    /// Flush and shut down the write half.
    pub async fn close(&mut self) -> Result<()> {
        SinkExt::<Bytes>::close(&mut self.framed).await
    }

    pub fn get_ref(&self) -> &S {
        self.framed.get_ref()
    }

    pub fn into_inner(self) -> S {
        self.framed.into_inner()
    }
}
