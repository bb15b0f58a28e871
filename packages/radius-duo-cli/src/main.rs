//! radius-duo-auth - FreeRADIUS exec module for Duo push authentication
//!
//! FreeRADIUS runs this binary once per authentication attempt and reads its
//! exit code:
//! - `0` authentication allowed
//! - `1` authentication rejected
//! - `2` module failure (bad arguments, bad config, transport or service error)
//!
//! One status line is written to stdout. Stderr only carries configuration
//! and initialization failures, plus logs when `--verbose` or `RUST_LOG` is set.

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use radius_duo_core::{AuthRequest, DuoClient, ExitStatus, HttpsTimeout, Verdict, auth, config};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "radius-duo-auth")]
#[command(version)]
#[command(about = "Authenticate a user via Duo")]
#[command(long_about = "
Authenticate a user via Duo push, for use as a FreeRADIUS exec module.

A preauth check runs first. Users that Duo allows outright are accepted
without a push; users that need a second factor get a push to their
default device and the result is reported through the exit code.

Exit codes: 0 = accept, 1 = reject, 2 = module failure.
")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "CFG_FILE")]
    pub config: PathBuf,

    /// Duo username to authenticate
    #[arg(short, long, value_name = "USER")]
    pub user: String,

    /// Message to be displayed in Duo push notification
    #[arg(short, long, value_name = "MESSAGE")]
    pub message: Option<String>,

    /// HTTPS timeout in milliseconds (100-30000)
    #[arg(short, long, value_name = "MS", default_value = "3000")]
    #[arg(value_parser = HttpsTimeout::parse)]
    pub timeout: HttpsTimeout,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return report_usage_error(e),
    };

    init_logging(cli.verbose);

    // Arguments are fully validated before the config is touched
    let request = match AuthRequest::new(&cli.user, cli.message.as_deref(), cli.timeout) {
        Ok(request) => request,
        Err(e) => {
            println!("{}", e);
            return ExitStatus::Fail.into();
        }
    };

    match run(&cli.config, &request).await {
        Ok(verdict) => {
            if let Some(line) = &verdict.message {
                println!("{}", line);
            }
            tracing::debug!("Exiting with {:?}", verdict.status);
            verdict.status.into()
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitStatus::Fail.into()
        }
    }
}

/// Load the config, build the Duo client and run the flow. The client is
/// dropped before returning on every path.
async fn run(config_path: &Path, request: &AuthRequest) -> Result<Verdict> {
    let creds = config::load_credentials(config_path)?;

    let client = DuoClient::new(&creds, request.timeout())
        .context("Failed to initialize Duo auth library")?;

    tracing::info!(
        "Authenticating {} against {}",
        request.username(),
        client.api_host()
    );

    Ok(auth::authenticate(&client, request).await)
}

/// Help and version go out normally; anything else is a module failure.
fn report_usage_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        _ => {
            println!("{}", usage_error_line(&err));
            ExitStatus::Fail.into()
        }
    }
}

/// Collapse clap's rendered error into one status line, without the usage
/// and help hints.
fn usage_error_line(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    rendered
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take_while(|line| {
            !line.starts_with("Usage:") && !line.starts_with("For more information")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "radius_duo_auth=debug,radius_duo_core=debug"
    } else {
        "off"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["radius-duo-auth", "-c", "/etc/duo.json", "-u", "alice"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/duo.json"));
        assert_eq!(cli.user, "alice");
        assert_eq!(cli.message, None);
        assert_eq!(cli.timeout, HttpsTimeout::default());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_long_flags() {
        let cli = Cli::try_parse_from([
            "radius-duo-auth",
            "--config",
            "duo.json",
            "--user",
            "bob",
            "--message",
            "VPN login",
            "--timeout",
            "30000",
        ])
        .unwrap();
        assert_eq!(cli.message.as_deref(), Some("VPN login"));
        assert_eq!(cli.timeout.as_millis(), 30_000);
    }

    #[test]
    fn test_timeout_out_of_range_is_usage_error() {
        for value in ["99", "30001", "50", "abc"] {
            let err = Cli::try_parse_from([
                "radius-duo-auth",
                "-c",
                "duo.json",
                "-u",
                "alice",
                "-t",
                value,
            ])
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "value {}", value);
        }
    }

    #[test]
    fn test_required_flags() {
        let err = Cli::try_parse_from(["radius-duo-auth", "-u", "alice"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = Cli::try_parse_from(["radius-duo-auth", "-c", "duo.json"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_usage_error_is_one_line() {
        let err = Cli::try_parse_from(["radius-duo-auth"]).unwrap_err();
        let line = usage_error_line(&err);
        assert!(!line.contains('\n'));
        assert!(line.starts_with("error:"), "line: {}", line);
        assert!(line.contains("--config"), "line: {}", line);
        assert!(line.contains("--user"), "line: {}", line);
        assert!(!line.contains("Usage:"), "line: {}", line);

        let err = Cli::try_parse_from(["radius-duo-auth", "-c", "d.json", "-u", "a", "-t", "50"])
            .unwrap_err();
        let line = usage_error_line(&err);
        assert!(!line.contains('\n'));
        assert!(line.contains("Timeout must be between 100 and 30000"), "line: {}", line);
    }
}
