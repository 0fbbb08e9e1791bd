//! Command-line front ends shared by the binaries.
//!
//! The four service binaries differ only in their cipher family, so each
//! `main` just names its family and hands over to [`server_main`] or
//! [`client_main`]. Fatal errors are printed to stderr and mapped to the
//! process exit status via [`ProtocolError::exit_code`].

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, CommandFactory, FromArgMatches, Parser};

use crate::config::NetworkConfig;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::family::CipherFamily;
use crate::service::{run_client, start_server};
use crate::utils::{keygen, logging};

/// Options common to every service binary
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// TOML configuration file (defaults plus OTP_* environment otherwise)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Cipher server
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct ServerArgs {
    /// Port to listen on
    pub port: u16,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Cipher client
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct ClientArgs {
    /// File holding the text to transform
    pub text: PathBuf,

    /// File holding the key (at least as long as the text)
    pub key: PathBuf,

    /// Server port on the configured host
    pub port: u16,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Key generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct KeygenArgs {
    /// Number of key symbols to generate
    pub keylength: usize,
}

/// Parse arguments for `P`, naming the command after the running binary.
fn parse_as<P: CommandFactory + FromArgMatches>(bin: &'static str) -> P {
    let matches = P::command().name(bin).get_matches();
    P::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn report(bin: &str, err: &ProtocolError) -> ExitCode {
    eprintln!("{bin}: {err}");
    ExitCode::from(err.exit_code())
}

fn load_config(common: &CommonArgs) -> Result<NetworkConfig> {
    let config = NetworkConfig::load(common.config.as_deref())?;
    logging::init(&config.logging)?;
    Ok(config)
}

/// Entry point for `enc_server` and `dec_server`.
pub async fn server_main(bin: &'static str, family: CipherFamily) -> ExitCode {
    let args: ServerArgs = parse_as(bin);

    let result = async {
        let mut config = load_config(&args.common)?;
        config.server = config.server.with_port(args.port)?;
        start_server(&config, family).await
    }
    .await;

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => report(bin, &e),
    }
}

/// Entry point for `enc_client` and `dec_client`. Prints the reply on stdout.
pub async fn client_main(bin: &'static str, family: CipherFamily) -> ExitCode {
    let args: ClientArgs = parse_as(bin);

    let result = async {
        let mut config = load_config(&args.common)?;
        config.client = config.client.with_port(args.port);
        run_client(&config, family, &args.text, &args.key).await
    }
    .await;

    match result {
        Ok(reply) => {
            println!("{reply}");
            ExitCode::SUCCESS
        }
        Err(e) => report(bin, &e),
    }
}

/// Entry point for `keygen`. Prints the key and a newline on stdout.
pub fn keygen_main(bin: &'static str) -> ExitCode {
    let args: KeygenArgs = parse_as(bin);

    let result = if args.keylength == 0 {
        Err(ProtocolError::ConfigError(constants::ERR_KEY_LENGTH.into()))
    } else {
        keygen::generate_key(args.keylength)
    };

    match result {
        Ok(key) => {
            let mut stdout = std::io::stdout().lock();
            match writeln!(stdout, "{key}") {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => report(bin, &ProtocolError::Io(e)),
            }
        }
        Err(e) => report(bin, &e),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn cli_definitions_are_consistent() {
        ServerArgs::command().debug_assert();
        ClientArgs::command().debug_assert();
        KeygenArgs::command().debug_assert();
    }

    #[test]
    fn client_args_take_text_key_port() {
        let args =
            ClientArgs::try_parse_from(["enc_client", "plain.txt", "key.txt", "57171"]).unwrap();
        assert_eq!(args.text, PathBuf::from("plain.txt"));
        assert_eq!(args.key, PathBuf::from("key.txt"));
        assert_eq!(args.port, 57171);
        assert!(args.common.config.is_none());
    }

    #[test]
    fn server_rejects_non_numeric_port() {
        assert!(ServerArgs::try_parse_from(["enc_server", "http"]).is_err());
        let args = ServerArgs::try_parse_from(["enc_server", "9000", "-c", "otp.toml"]).unwrap();
        assert_eq!(args.port, 9000);
        assert_eq!(args.common.config, Some(PathBuf::from("otp.toml")));
    }
}
