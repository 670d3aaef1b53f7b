use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::args::Cli;
use cli::commands::{dispatch, exit_codes};

/// Logs go to stderr so they never interleave with exported data on stdout.
fn init_logging() {
    let level = std::env::var("PAIRWISE_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            if let Some(cfg_err) = pairwise_core::errors::as_config_error(&e) {
                eprintln!("{}", cfg_err);
                exit_codes::CONFIG_ERROR
            } else {
                eprintln!("fatal: {e:#}");
                exit_codes::FAILED
            }
        }
    };
    std::process::exit(code);
}
