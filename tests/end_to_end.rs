//! End-to-end tests against a live server on loopback.
//!
//! Each test binds a server on an OS-chosen port, drives it with the real
//! client (or a hand-rolled peer), then shuts it down and checks the
//! listener's final counters.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::io::Write;

use bytes::Bytes;
use common::*;
use otp_protocol::core::cipher::{transform, Direction};
use otp_protocol::error::ProtocolError;
use otp_protocol::protocol::handshake::RoleTag;
use otp_protocol::service::run_client;
use otp_protocol::utils::keygen::generate_key;
use otp_protocol::{CipherFamily, CipherPair, Message};
use tempfile::NamedTempFile;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration};

fn msg(s: &str) -> Message {
    s.parse().unwrap()
}

fn file_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{contents}").unwrap();
    file
}

#[tokio::test]
async fn test_encrypts_hello_example() {
    let server = spawn_server(CipherFamily::Encryption).await;
    let client = client_for(CipherFamily::Encryption, server.addr);

    let pair = CipherPair::new(msg("HELLO"), msg("XMCKL")).unwrap();
    let reply = timeout(TEST_TIMEOUT, client.exchange(&pair))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply.as_str(), "DQNVZ");

    let metrics = server.stop().await;
    assert_eq!(metrics.connections_accepted, 1);
    assert_eq!(metrics.exchanges_completed, 1);
    assert_eq!(metrics.bytes_received, 10);
    assert_eq!(metrics.bytes_sent, 5);
    assert_eq!(metrics.workers_active, 0);
}

#[tokio::test]
async fn test_decrypts_hello_example() {
    let server = spawn_server(CipherFamily::Decryption).await;
    let client = client_for(CipherFamily::Decryption, server.addr);

    let pair = CipherPair::new(msg("DQNVZ"), msg("XMCKL")).unwrap();
    let reply = client.exchange(&pair).await.unwrap();
    assert_eq!(reply.as_str(), "HELLO");

    server.stop().await;
}

#[tokio::test]
async fn test_round_trip_through_both_servers_with_long_key() {
    let enc = spawn_server(CipherFamily::Encryption).await;
    let dec = spawn_server(CipherFamily::Decryption).await;

    let text = msg("THE RED GOOSE FLIES AT MIDNIGHT STOP");
    let key = generate_key(text.len() + 50).unwrap();

    let sealed = client_for(CipherFamily::Encryption, enc.addr)
        .exchange(&CipherPair::new(text.clone(), key.clone()).unwrap())
        .await
        .unwrap();
    assert_eq!(sealed.len(), text.len());
    assert_eq!(
        sealed,
        transform(&text, &key.prefix(text.len()).unwrap(), Direction::Encrypt).unwrap()
    );

    let opened = client_for(CipherFamily::Decryption, dec.addr)
        .exchange(&CipherPair::new(sealed, key).unwrap())
        .await
        .unwrap();
    assert_eq!(opened, text);

    enc.stop().await;
    dec.stop().await;
}

#[tokio::test]
async fn test_large_message_survives_framing() {
    let server = spawn_server(CipherFamily::Encryption).await;
    let text = generate_key(200_000).unwrap();
    let key = generate_key(200_000).unwrap();

    let reply = client_for(CipherFamily::Encryption, server.addr)
        .exchange(&CipherPair::new(text.clone(), key.clone()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        reply,
        transform(&text, &key, Direction::Encrypt).unwrap()
    );

    server.stop().await;
}

#[tokio::test]
async fn test_foreign_family_is_rejected() {
    let server = spawn_server(CipherFamily::Decryption).await;
    let client = client_for(CipherFamily::Encryption, server.addr);

    let pair = CipherPair::new(msg("HELLO"), msg("XMCKL")).unwrap();
    let err = client.exchange(&pair).await.unwrap_err();
    assert!(matches!(err, ProtocolError::HandshakeError(_)), "{err:?}");
    assert_eq!(err.exit_code(), 2);

    let metrics = server.stop().await;
    assert_eq!(metrics.handshakes_failed, 1);
    assert_eq!(metrics.exchanges_completed, 0);
}

#[tokio::test]
async fn test_short_key_rejected_before_connecting() {
    let server = spawn_server(CipherFamily::Encryption).await;
    let text = file_with("HELLO WORLD");
    let key = file_with("SHORT");

    let mut config = loopback_config();
    config.client.port = server.addr.port();
    let err = run_client(
        &config,
        CipherFamily::Encryption,
        text.path(),
        key.path(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::KeyTooShort {
            text_len: 11,
            key_len: 5
        }
    ));

    let metrics = server.stop().await;
    assert_eq!(metrics.connections_accepted, 0);
}

#[tokio::test]
async fn test_invalid_file_rejected_before_connecting() {
    let server = spawn_server(CipherFamily::Encryption).await;
    let text = file_with("hello");
    let key = file_with("XMCKL");

    let mut config = loopback_config();
    config.client.port = server.addr.port();
    let err = run_client(&config, CipherFamily::Encryption, text.path(), key.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::Loader { .. }));

    let metrics = server.stop().await;
    assert_eq!(metrics.connections_accepted, 0);
}

#[tokio::test]
async fn test_run_client_from_files() {
    let server = spawn_server(CipherFamily::Encryption).await;
    let text = file_with("HELLO");
    let key = file_with("XMCKLABC");

    let mut config = loopback_config();
    config.client.port = server.addr.port();
    let reply = run_client(&config, CipherFamily::Encryption, text.path(), key.path())
        .await
        .unwrap();
    assert_eq!(reply.as_str(), "DQNVZ");

    server.stop().await;
}

#[tokio::test]
async fn test_worker_closes_without_reply_on_short_key() {
    let server = spawn_server(CipherFamily::Encryption).await;

    let mut session = raw_session(server.addr, RoleTag::ENC).await;
    session.send(Bytes::from_static(b"HELLO")).await.unwrap();
    session.send(Bytes::from_static(b"AB")).await.unwrap();

    let err = timeout(TEST_TIMEOUT, session.receive())
        .await
        .unwrap()
        .unwrap_err();
    assert!(
        matches!(err, ProtocolError::ConnectionClosed | ProtocolError::Io(_)),
        "{err:?}"
    );

    let metrics = server.stop().await;
    assert_eq!(metrics.exchanges_failed, 1);
    assert_eq!(metrics.exchanges_completed, 0);
}

#[tokio::test]
async fn test_shutdown_lets_in_flight_worker_finish() {
    let server = spawn_server(CipherFamily::Encryption).await;

    // park a worker between the text and the key
    let mut session = raw_session(server.addr, RoleTag::ENC).await;
    session.send(Bytes::from_static(b"HELLO")).await.unwrap();
    sleep(Duration::from_millis(50)).await;

    server.shutdown.send(()).await.unwrap();

    // the listener stops accepting once the signal is seen
    timeout(TEST_TIMEOUT, async {
        while TcpStream::connect(server.addr).await.is_ok() {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("listener kept accepting after shutdown");
    assert!(!server.handle.is_finished());

    session.send(Bytes::from_static(b"XMCKL")).await.unwrap();
    let reply = session.receive_message().await.unwrap();
    assert_eq!(reply.as_str(), "DQNVZ");

    let metrics = timeout(TEST_TIMEOUT, server.handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(metrics.exchanges_completed, 1);
    assert_eq!(metrics.workers_active, 0);
}

#[tokio::test]
async fn test_oversized_pair_rejected_before_connecting() {
    let server = spawn_server(CipherFamily::Encryption).await;

    let mut config = loopback_config();
    config.client.port = server.addr.port();
    config.transport.max_message_size = 8;

    let text = file_with("HELLO WORLD");
    let key = file_with("XMCKLXMCKLX");
    let err = run_client(&config, CipherFamily::Encryption, text.path(), key.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::OversizedMessage(11)), "{err:?}");

    // a text within the limit does not let an oversized key through
    let client = otp_protocol::service::ConnectionClient::new(&config, CipherFamily::Encryption);
    let pair = CipherPair::new(msg("HELLO"), msg("XMCKLXMCKL")).unwrap();
    let err = client.exchange(&pair).await.unwrap_err();
    assert!(matches!(err, ProtocolError::OversizedMessage(10)), "{err:?}");

    let metrics = server.stop().await;
    assert_eq!(metrics.connections_accepted, 0);
    assert_eq!(metrics.exchanges_failed, 0);
}
