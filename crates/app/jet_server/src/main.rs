//! Jet server binary.
//!
//! Loads configuration, installs logging, connects PostgreSQL, migrates,
//! seeds and serves until Ctrl-C or SIGTERM.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

/// CLI arguments for the server.
#[derive(Parser, Debug)]
#[command(name = "jet_server", version, about = "Jet users and login server")]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, env = "JET_CONFIG", default_value = "config/config.yaml")]
    config: PathBuf,

    /// Ignore any config file and start from defaults plus environment.
    #[arg(long, default_value_t = false)]
    no_config_file: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let path = (!args.no_config_file).then_some(args.config.as_path());
    match jet_api::bootstrap::run(path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // The subscriber may not be installed yet.
            error!(error = %e, "startup failed");
            eprintln!("jet_server: {e}");
            ExitCode::FAILURE
        }
    }
}
