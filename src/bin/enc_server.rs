//! Encryption server: `enc_server <port>`

use std::process::ExitCode;

use otp_protocol::cli;
use otp_protocol::CipherFamily;

#[tokio::main]
async fn main() -> ExitCode {
    cli::server_main("enc_server", CipherFamily::Encryption).await
}
