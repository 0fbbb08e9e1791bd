//! Key generator: `keygen <keylength>`

use std::process::ExitCode;

use otp_protocol::cli;

fn main() -> ExitCode {
    cli::keygen_main("keygen")
}
