// catalink - link Immuta data sources to their catalog assets

mod exit_codes;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use catalink_client::ClientError;
use catalink_config::ConfigError;
use catalink_linker::LinkerError;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use exit_codes::{
    client_exit_code, config_exit_code, linker_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE,
};

#[derive(Parser)]
#[command(name = "catalink")]
#[command(about = "Link governance-registry data sources to external catalog assets")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Config file (.yaml, .yml or .toml)
    #[arg(long, short = 'c', global = true, env = "CATALINK_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging (overrides RUST_LOG)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only (overrides RUST_LOG)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Search the catalog for every unlinked data source and link unique matches
    #[command(after_help = "\
Examples:
  catalink run --config config.yaml
  catalink run --dry-run --json > plan.json
  catalink run --results-dir /var/lib/catalink/review -q
  RUST_LOG=catalink_client=debug catalink run

Exit codes:
  0   run completed (ambiguities deferred to the review artifact)
  10  config error
  20  authentication rejected
  21  upstream error (network, unexpected status, malformed response)
  30  review artifact could not be written (JSON emitted on stdout)")]
    Run {
        /// Directory for manual-review artifacts
        #[arg(long, value_name = "DIR", default_value = "results")]
        results_dir: PathBuf,

        /// Authenticate and search, but write no links
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Load and validate the config without touching the network
    #[command(after_help = "\
Examples:
  catalink validate
  catalink validate --config /etc/catalink/config.toml")]
    Validate,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_tracing(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run {
            results_dir,
            dry_run,
            json,
        } => run::cmd_run(cli.config, results_dir, dry_run, json),
        Commands::Validate => run::cmd_validate(cli.config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::NotFound { .. } => {
                Some("pass --config or set CATALINK_CONFIG".to_string())
            }
            ConfigError::Missing { field: "apiKey", .. } => {
                Some("set registryA.apiKey or the IMMUTA_API_KEY environment variable".to_string())
            }
            ConfigError::Missing { field: "password", .. } => {
                Some("set provider.password or the COLLIBRA_PASSWORD environment variable".to_string())
            }
            ConfigError::UnknownProvider(_) => Some("supported providers: collibra".to_string()),
            _ => None,
        };
        Self { code: config_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn client(err: ClientError) -> Self {
        let hint = match &err {
            ClientError::Auth { service: "Immuta", .. } => {
                Some("check registryA.apiKey".to_string())
            }
            ClientError::Auth { .. } => {
                Some("check provider.username and provider.password".to_string())
            }
            ClientError::Network { .. } => Some("check the url and that the host is reachable".to_string()),
            ClientError::Tls { .. } => Some("check tlsCaPath".to_string()),
            _ => None,
        };
        match err {
            ClientError::Config(e) => Self::config(e),
            other => Self { code: client_exit_code(&other), message: other.to_string(), hint },
        }
    }

    pub fn linker(err: LinkerError) -> Self {
        match err {
            LinkerError::Client(e) => Self::client(e),
            persist @ LinkerError::Persistence { .. } => Self {
                code: linker_exit_code(&persist),
                message: persist.to_string(),
                hint: Some("the review document was written to stdout instead".to_string()),
            },
            other => Self { code: linker_exit_code(&other), message: other.to_string(), hint: None },
        }
    }
}
