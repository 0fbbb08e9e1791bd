// test-only module included via protocol/mod.rs
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::error::ProtocolError;
use crate::protocol::family::CipherFamily;
use crate::protocol::handshake::*;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn test_matching_tags_succeed_on_both_sides() {
    for tag in [RoleTag::ENC, RoleTag::DEC] {
        let (mut server, mut client) = duplex(64);

        let (server_res, client_res) = tokio::join!(
            perform_as(&mut server, tag, tag),
            perform_as(&mut client, tag, tag)
        );

        server_res.expect("server side should accept");
        client_res.expect("client side should accept");
    }
}

#[tokio::test]
async fn test_foreign_tag_rejected_by_both_sides() {
    let (mut server, mut client) = duplex(64);

    let (server_res, client_res) = tokio::join!(
        perform_as(&mut server, RoleTag::ENC, RoleTag::ENC),
        perform_as(&mut client, RoleTag::DEC, RoleTag::DEC)
    );

    assert!(matches!(server_res, Err(ProtocolError::HandshakeError(_))));
    assert!(matches!(client_res, Err(ProtocolError::HandshakeError(_))));
}

#[tokio::test]
async fn test_rejected_connection_is_shut_down() {
    let (mut server, mut peer) = duplex(64);

    let server_task = tokio::spawn(async move {
        let res = perform_as(&mut server, RoleTag::ENC, RoleTag::ENC).await;
        (res, server)
    });

    peer.write_all(b"dec").await.unwrap();
    let mut tag = [0u8; 3];
    peer.read_exact(&mut tag).await.unwrap();
    assert_eq!(&tag, b"enc");

    // nothing but EOF follows a rejection
    let mut rest = Vec::new();
    let n = peer.read_to_end(&mut rest).await.unwrap();
    assert_eq!(n, 0);

    let (res, _server) = server_task.await.unwrap();
    let err = res.unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_tag_split_across_writes() {
    let (mut server, mut peer) = duplex(64);

    let server_task =
        tokio::spawn(async move { perform_as(&mut server, RoleTag::DEC, RoleTag::DEC).await });

    peer.write_all(b"d").await.unwrap();
    tokio::task::yield_now().await;
    peer.write_all(b"ec").await.unwrap();

    let mut tag = [0u8; 3];
    peer.read_exact(&mut tag).await.unwrap();
    assert_eq!(&tag, b"dec");
    server_task.await.unwrap().expect("split tag should be reassembled");
}

#[tokio::test]
async fn test_peer_closing_mid_handshake() {
    let (mut server, mut peer) = duplex(64);

    let server_task =
        tokio::spawn(async move { perform_as(&mut server, RoleTag::ENC, RoleTag::ENC).await });

    peer.write_all(b"en").await.unwrap();
    let mut tag = [0u8; 3];
    peer.read_exact(&mut tag).await.unwrap();
    drop(peer);

    let res = server_task.await.unwrap();
    assert!(matches!(res, Err(ProtocolError::ConnectionClosed)));
}

#[test]
fn test_families_bind_tag_and_direction() {
    use crate::core::cipher::Direction;

    assert_eq!(CipherFamily::Encryption.tag(), RoleTag::ENC);
    assert_eq!(CipherFamily::Decryption.tag(), RoleTag::DEC);
    assert_eq!(CipherFamily::Encryption.direction(), Direction::Encrypt);
    assert_eq!(CipherFamily::Decryption.direction(), Direction::Decrypt);
    assert_eq!(RoleTag::ENC.to_string(), "enc");
}
