//! # Sharing Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the `sharing` CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on `--debug` and verbosity flags
//! - Running the share and reporting any startup error
//!
//! ## Examples
//!
//! ```bash
//! # Share the current directory
//! sharing .
//!
//! # Same, with request logs on stderr
//! sharing -v .
//!
//! # Everything, including interface and port negotiation, on stdout
//! sharing --debug .
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, EnvFilter};

mod commands; // The share command
mod common; // Clipboard, filesystem, network and console helpers
mod core; // Errors and the settings file

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "sharing",
    about = "Share files, directories and the clipboard with your phone over the local network",
    long_about = "Serves a file, a directory or the clipboard over HTTP(S) and prints a QR code\n\
                  for the share URL. With --receive the phone can upload files instead.",
    version
)]
struct Cli {
    #[command(flatten)]
    share: commands::share::ShareArgs,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Sets up the global subscriber. `--debug` sends debug output to stdout next
/// to the share report; otherwise logs go to stderr at the `-v` level.
fn init_logging(debug: bool, verbose: u8) {
    let log_level = match (debug, verbose) {
        (true, 0..=2) => "debug",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let writer = if debug {
        BoxMakeWriter::new(std::io::stdout)
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.share.debug, cli.verbose);

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = commands::share::handle_share(cli.share).await {
        tracing::error!("Sharing failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use clap::CommandFactory;
    use predicates::prelude::*;

    fn sharing_cmd() -> Command {
        Command::cargo_bin("sharing").expect("Failed to find sharing binary for testing")
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from([
            "sharing", "-p", "9000", "-r", "-U", "alice", "-P", "secret", "-w", "-vv", "docs",
        ])
        .unwrap();

        assert_eq!(cli.share.port, Some(9000));
        assert!(cli.share.receive);
        assert_eq!(cli.share.username.as_deref(), Some("alice"));
        assert_eq!(cli.share.password.as_deref(), Some("secret"));
        assert!(cli.share.on_windows_native_terminal);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.share.path, Some("docs".into()));
    }

    #[test]
    fn test_main_help_flag() {
        sharing_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--receive"));
    }

    #[test]
    fn test_main_version_flag() {
        sharing_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
