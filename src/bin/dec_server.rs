//! Decryption server: `dec_server <port>`

use std::process::ExitCode;

use otp_protocol::cli;
use otp_protocol::CipherFamily;

#[tokio::main]
async fn main() -> ExitCode {
    cli::server_main("dec_server", CipherFamily::Decryption).await
}
