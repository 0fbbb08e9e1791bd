//! # Connection Server
//!
//! Accepts connections and hands each one to an isolated worker.
//!
//! The listener is a single accept loop. Every accepted stream moves into a
//! freshly spawned task that owns it for its whole life: role handshake,
//! text and key receive, cipher, reply, close. Workers share nothing with the
//! listener or with each other; the listener learns how a worker ended only
//! from the [`WorkerOutcome`] it returns, and a panicking worker is reported
//! through its `JoinError` without disturbing anything else.
//!
//! ## Lifecycle
//! ```text
//! ACCEPTED -> HANDSHAKING -> EXCHANGING -> DONE
//!                  |              |
//!                  +--> FAILED <--+
//! ```
//!
//! ## Shutdown
//! The shutdown channel is checked before every accept. Once it fires the
//! listening socket is closed and the server waits for all in-flight workers
//! to finish on their own. No worker is aborted and no I/O has a timeout, so
//! a stalled peer keeps its worker (and the shutdown) waiting.

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use futures::StreamExt;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_stream::wrappers::TcpListenerStream;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

use crate::config::NetworkConfig;
use crate::core::cipher::CipherPair;
use crate::core::message::Message;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::family::CipherFamily;
use crate::protocol::handshake;
use crate::transport::FramedTransport;
use crate::utils::metrics::{Metrics, MetricsSnapshot, Timer};

/// Per-connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Accepted,
    Handshaking,
    Exchanging,
    Done,
    Failed,
}

/// How a worker's connection ended
#[derive(Debug)]
pub struct WorkerOutcome {
    pub peer: Option<SocketAddr>,
    /// `Done` or `Failed`
    pub state: ConnectionState,
    /// The state the connection was in when it failed
    pub failed_during: Option<ConnectionState>,
    pub error: Option<ProtocolError>,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// A bound listener for one cipher family
pub struct ConnectionServer {
    listener: TcpListener,
    family: CipherFamily,
    max_message_size: usize,
    metrics: Metrics,
}

impl ConnectionServer {
    /// Bind and listen on `config.server.address` with the configured backlog.
    ///
    /// Address reuse is enabled so a restarted server can rebind immediately.
    #[instrument(skip(config), fields(address = %config.server.address))]
    pub async fn bind(config: &NetworkConfig, family: CipherFamily) -> Result<Self> {
        config.validate_strict()?;
        let addr = config.server.socket_addr()?;

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr).map_err(|e| {
            ProtocolError::Io(io::Error::new(
                e.kind(),
                format!("{} {addr}: {e}", constants::ERR_BIND),
            ))
        })?;
        let listener = socket.listen(config.server.backlog)?;

        info!(
            address = %listener.local_addr()?,
            family = %family,
            backlog = config.server.backlog,
            "Listening"
        );

        Ok(Self {
            listener,
            family,
            max_message_size: config.transport.max_message_size,
            metrics: Metrics::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn family(&self) -> CipherFamily {
        self.family
    }

    /// Run the accept loop until `shutdown_rx` yields (or its sender is dropped).
    ///
    /// Returns the final metrics once every worker has finished.
    #[instrument(skip_all, fields(family = %self.family))]
    pub async fn serve(self, mut shutdown_rx: mpsc::Receiver<()>) -> Result<MetricsSnapshot> {
        let ConnectionServer {
            listener,
            family,
            max_message_size,
            metrics,
        } = self;

        let mut incoming = TcpListenerStream::new(listener);
        let mut workers: JoinSet<WorkerOutcome> = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested, no longer accepting connections");
                    break;
                }

                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    record_outcome(&metrics, joined);
                }

                accepted = incoming.next() => {
                    match accepted {
                        Some(Ok(stream)) => {
                            metrics.connection_accepted();
                            let peer = stream.peer_addr().ok();
                            debug!(peer = ?peer, "Connection accepted");

                            let span = info_span!("worker", peer = ?peer);
                            let worker = Worker::new(peer, family);
                            workers.spawn(worker.run(stream, max_message_size).instrument(span));
                        }
                        Some(Err(e)) => {
                            metrics.accept_error();
                            error!(error = %e, "Error accepting connection");
                        }
                        None => break,
                    }
                }
            }
        }

        // closes the listening socket
        drop(incoming);

        if !workers.is_empty() {
            info!(in_flight = workers.len(), "Waiting for in-flight connections to finish");
        }
        while let Some(joined) = workers.join_next().await {
            record_outcome(&metrics, joined);
        }

        info!("All connections closed, server stopped");
        metrics.log_metrics();
        Ok(metrics.snapshot())
    }
}

/// Bind, then serve until Ctrl-C.
pub async fn start_server(config: &NetworkConfig, family: CipherFamily) -> Result<MetricsSnapshot> {
    let server = ConnectionServer::bind(config, family).await?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(forward_shutdown(tokio::signal::ctrl_c(), shutdown_tx));

    server.serve(shutdown_rx).await
}

/// Send on `shutdown_tx` once `signal` fires.
///
/// If the signal cannot be listened for, the sender is held forever so the
/// server keeps running until killed.
async fn forward_shutdown<F>(signal: F, shutdown_tx: mpsc::Sender<()>)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Received CTRL+C signal, shutting down");
            let _ = shutdown_tx.send(()).await;
        }
        Err(e) => {
            warn!(error = %e, "Unable to listen for CTRL+C");
            // dropping the sender would stop the server
            let _keep = shutdown_tx;
            std::future::pending::<()>().await;
        }
    }
}

fn record_outcome(metrics: &Metrics, joined: std::result::Result<WorkerOutcome, JoinError>) {
    metrics.worker_finished();
    match joined {
        Ok(outcome) => match (outcome.state, outcome.failed_during) {
            (ConnectionState::Done, _) => {
                metrics.exchange_completed(outcome.bytes_received, outcome.bytes_sent)
            }
            (_, Some(ConnectionState::Handshaking)) => metrics.handshake_failed(),
            _ => metrics.exchange_failed(),
        },
        Err(e) if e.is_panic() => {
            metrics.worker_panicked();
            error!(error = %ProtocolError::WorkerPanicked(e.to_string()), "Worker crashed");
        }
        Err(e) => {
            metrics.exchange_failed();
            warn!(error = %e, "Worker cancelled");
        }
    }
}

/// Owns one accepted connection end to end
struct Worker {
    peer: Option<SocketAddr>,
    family: CipherFamily,
    state: ConnectionState,
    bytes_received: u64,
    bytes_sent: u64,
}

impl Worker {
    fn new(peer: Option<SocketAddr>, family: CipherFamily) -> Self {
        Self {
            peer,
            family,
            state: ConnectionState::Accepted,
            bytes_received: 0,
            bytes_sent: 0,
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        debug!(from = ?self.state, to = ?next, "Connection state change");
        self.state = next;
    }

    async fn run(mut self, stream: TcpStream, max_message_size: usize) -> WorkerOutcome {
        let _timer = Timer::start("connection");

        let (failed_during, error) = match self.drive(stream, max_message_size).await {
            Ok(()) => {
                self.transition(ConnectionState::Done);
                (None, None)
            }
            Err(e) => {
                let during = self.state;
                self.transition(ConnectionState::Failed);
                error!(state = ?during, error = %e, "Connection failed");
                (Some(during), Some(e))
            }
        };

        WorkerOutcome {
            peer: self.peer,
            state: self.state,
            failed_during,
            error,
            bytes_received: self.bytes_received,
            bytes_sent: self.bytes_sent,
        }
    }

    /// The stream is dropped, and so closed, on every path out of here.
    async fn drive(&mut self, mut stream: TcpStream, max_message_size: usize) -> Result<()> {
        self.transition(ConnectionState::Handshaking);
        let tag = self.family.tag();
        handshake::perform_as(&mut stream, tag, tag).await?;

        self.transition(ConnectionState::Exchanging);
        let mut transport = FramedTransport::new(stream, max_message_size);
        let result = self.exchange(&mut transport).await;

        if let Err(e) = transport.close().await {
            debug!(error = %e, "Error closing connection");
        }
        result
    }

    async fn exchange(&mut self, transport: &mut FramedTransport<TcpStream>) -> Result<()> {
        let text = transport.receive().await?;
        self.bytes_received += text.len() as u64;
        let key = transport.receive().await?;
        self.bytes_received += key.len() as u64;

        let pair = CipherPair::new(Message::try_from(text)?, Message::try_from(key)?)?;
        let result = pair.apply(self.family.direction())?;

        transport.send_message(&result).await?;
        self.bytes_sent += result.len() as u64;
        debug!(len = result.len(), "Reply sent");
        Ok(())
    }
}
