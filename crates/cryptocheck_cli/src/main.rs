//! cryptocheck CLI
//!
//! Verifies signature corpora produced by independent implementations.
//!
//! # Commands
//!
//! - `check` - Verify every record (default)
//! - `inspect` - Show the corpus header and leading records
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Signature corpus verifier.
#[derive(Parser)]
#[command(name = "cryptocheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the corpus file
    #[arg(global = true, short, long)]
    filename: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    tuning: commands::check::Tuning,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify every record in the corpus
    Check,

    /// Show the corpus header and leading records without verifying
    Inspect {
        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        None | Some(Commands::Check) => {
            let path = cli.filename.ok_or("corpus path required for check")?;
            commands::check::run(&path, cli.tuning.into_config()).await?;
        }
        Some(Commands::Inspect { limit, format }) => {
            let path = cli.filename.ok_or("corpus path required for inspect")?;
            commands::inspect::run(&path, limit, &format)?;
        }
        Some(Commands::Version) => {
            println!("cryptocheck v{}", env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use cryptocheck_codec::GlobalSeed;
    use cryptocheck_testkit::CorpusBuilder;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_filename_defaults_to_check() {
        let cli = Cli::try_parse_from(["cryptocheck", "-f", "corpus.bin"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.filename, Some(PathBuf::from("corpus.bin")));
    }

    #[test]
    fn global_filename_after_subcommand() {
        let cli =
            Cli::try_parse_from(["cryptocheck", "inspect", "--filename", "c.bin", "-l", "3"])
                .unwrap();
        assert_eq!(cli.filename, Some(PathBuf::from("c.bin")));
        match cli.command {
            Some(Commands::Inspect { limit, .. }) => assert_eq!(limit, 3),
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn check_accepts_tuning_flags() {
        let cli = Cli::try_parse_from([
            "cryptocheck",
            "check",
            "-f",
            "c.bin",
            "--workers",
            "2",
            "--queue-depth",
            "5",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Check)));
        let config = cli.tuning.into_config();
        assert_eq!(config.workers, 2);
        assert_eq!(config.queue_depth, 5);
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[tokio::test]
    async fn check_without_filename_is_an_error() {
        let err = dispatch(parse(&["cryptocheck", "check"])).await.unwrap_err();
        assert!(err.to_string().contains("corpus path required"));
    }

    #[tokio::test]
    async fn dispatch_succeeds_on_verified_corpus() {
        let corpus = CorpusBuilder::new(GlobalSeed::new(0))
            .signed_range(10)
            .write_temp();
        let path = corpus.path().to_str().unwrap();
        dispatch(parse(&["cryptocheck", "-f", path, "--workers", "2"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dispatch_fails_on_tampered_corpus() {
        let corpus = CorpusBuilder::new(GlobalSeed::new(0))
            .signed_range(3)
            .tampered(3, 40, 9)
            .write_temp();
        let path = corpus.path().to_str().unwrap();
        let err = dispatch(parse(&["cryptocheck", "check", "-f", path, "--workers", "2"]))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("CHECK FAILED: "));
    }
}
