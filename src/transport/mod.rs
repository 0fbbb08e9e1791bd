//! # Transport Layer
//!
//! Message framing over connected byte streams. Generic over
//! `AsyncRead + AsyncWrite`, so the same code runs over `TcpStream` in the
//! services and over in-memory pipes in tests.

pub mod framed;

pub use framed::FramedTransport;
