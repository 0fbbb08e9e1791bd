//! Shared helpers for integration tests that need a live server.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::time::Duration;

use otp_protocol::config::NetworkConfig;
use otp_protocol::error::Result;
use otp_protocol::protocol::handshake::{self, RoleTag};
use otp_protocol::service::{ConnectionClient, ConnectionServer};
use otp_protocol::transport::FramedTransport;
use otp_protocol::utils::MetricsSnapshot;
use otp_protocol::CipherFamily;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Upper bound for anything a test waits on
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn loopback_config() -> NetworkConfig {
    NetworkConfig::default_with_overrides(|c| {
        c.server.address = "127.0.0.1:0".to_string();
        c.client.host = "127.0.0.1".to_string();
    })
}

pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: mpsc::Sender<()>,
    pub handle: JoinHandle<Result<MetricsSnapshot>>,
}

impl RunningServer {
    /// Signal shutdown and wait for the final metrics.
    pub async fn stop(self) -> MetricsSnapshot {
        self.shutdown.send(()).await.expect("server already gone");
        tokio::time::timeout(TEST_TIMEOUT, self.handle)
            .await
            .expect("server did not stop in time")
            .expect("server task panicked")
            .expect("server returned an error")
    }
}

pub async fn spawn_server_with(config: &NetworkConfig, family: CipherFamily) -> RunningServer {
    let server = ConnectionServer::bind(config, family)
        .await
        .expect("bind test server");
    let addr = server.local_addr().unwrap();
    let (shutdown, rx) = mpsc::channel(1);
    let handle = tokio::spawn(server.serve(rx));
    RunningServer {
        addr,
        shutdown,
        handle,
    }
}

pub async fn spawn_server(family: CipherFamily) -> RunningServer {
    spawn_server_with(&loopback_config(), family).await
}

pub fn client_for(family: CipherFamily, addr: SocketAddr) -> ConnectionClient {
    let mut config = loopback_config();
    config.client.port = addr.port();
    ConnectionClient::new(&config, family)
}

/// Connect and complete the role handshake by hand, for tests that need to
/// misbehave on the wire afterwards.
pub async fn raw_session(addr: SocketAddr, tag: RoleTag) -> FramedTransport<TcpStream> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    handshake::perform_as(&mut stream, tag, tag).await.unwrap();
    FramedTransport::new(stream, otp_protocol::config::MAX_MESSAGE_SIZE)
}
