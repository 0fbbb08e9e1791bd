//! # Connection Client
//!
//! Drives a single exchange against a cipher server: resolve, connect,
//! handshake, send text then key, read the one reply, close. Every step is
//! fatal on failure and nothing is retried.

use std::io;
use std::net::SocketAddr;
use std::path::Path;

use tokio::net::{lookup_host, TcpStream};
use tracing::{debug, info, instrument};

use crate::config::{ClientConfig, NetworkConfig};
use crate::core::cipher::CipherPair;
use crate::core::message::Message;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::family::CipherFamily;
use crate::protocol::handshake;
use crate::transport::FramedTransport;
use crate::utils::loader::load_message;

/// Client for one cipher family
#[derive(Debug, Clone)]
pub struct ConnectionClient {
    config: ClientConfig,
    family: CipherFamily,
    max_message_size: usize,
}

impl ConnectionClient {
    pub fn new(config: &NetworkConfig, family: CipherFamily) -> Self {
        Self {
            config: config.client.clone(),
            family,
            max_message_size: config.transport.max_message_size,
        }
    }

    /// Send `pair` to the server and return its reply.
    ///
    /// The whole key goes on the wire; the server truncates it to the text.
    #[instrument(skip(self, pair), fields(family = %self.family, host = %self.config.host, port = self.config.port))]
    pub async fn exchange(&self, pair: &CipherPair) -> Result<Message> {
        // size limit is enforced before any connection attempt
        for message in [pair.text(), pair.key()] {
            if message.len() > self.max_message_size {
                return Err(ProtocolError::OversizedMessage(message.len()));
            }
        }

        let addr = self.resolve().await?;
        let mut stream = TcpStream::connect(addr).await?;
        debug!(server = %addr, "Connected");

        let tag = self.family.tag();
        handshake::perform_as(&mut stream, tag, tag).await?;

        let mut transport = FramedTransport::new(stream, self.max_message_size);
        transport.send_message(pair.text()).await?;
        transport.send_message(pair.key()).await?;
        let reply = transport.receive_message().await?;

        if let Err(e) = transport.close().await {
            debug!(error = %e, "Error closing connection");
        }

        info!(len = reply.len(), "Received reply");
        Ok(reply)
    }

    /// Resolve the configured host, preferring IPv4 like the server's default bind.
    async fn resolve(&self) -> Result<SocketAddr> {
        let addrs: Vec<SocketAddr> = lookup_host((self.config.host.as_str(), self.config.port))
            .await?
            .collect();

        addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| {
                ProtocolError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{}: {}", constants::ERR_NO_ADDRESS, self.config.host),
                ))
            })
    }
}

/// Load text and key from files, check them, then run one exchange.
///
/// Both files are validated and the key length and message sizes are
/// checked before any connection is attempted.
pub async fn run_client(
    config: &NetworkConfig,
    family: CipherFamily,
    text_path: &Path,
    key_path: &Path,
) -> Result<Message> {
    config.validate_strict()?;
    let text = load_message(text_path).await?;
    let key = load_message(key_path).await?;
    let pair = CipherPair::new(text, key)?;

    ConnectionClient::new(config, family).exchange(&pair).await
}
