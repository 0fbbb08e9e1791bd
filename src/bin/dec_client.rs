//! Decryption client: `dec_client <text-file> <key-file> <port>`

use std::process::ExitCode;

use otp_protocol::cli;
use otp_protocol::CipherFamily;

#[tokio::main]
async fn main() -> ExitCode {
    cli::client_main("dec_client", CipherFamily::Decryption).await
}
