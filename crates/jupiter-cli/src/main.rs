//! Jupiter CLI - pick and inspect the server the desktop app opens on.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use jupiter_shell::{ConfigStore, DesktopEnv};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Jupiter - choose the server behind the desktop app
#[derive(Parser, Debug)]
#[command(name = "jupiter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory holding thrive.config (default: per-user data directory)
    #[arg(long, env = "JUPITER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Settings file layered under the environment
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a server and make it the one the app opens
    Pick {
        /// Server address, e.g. my-instance.io or https://host:8443
        server: String,
    },

    /// Check a server's handshake and version without saving it
    Probe {
        /// Server address
        server: String,
    },

    /// Print the URL the app opens on
    WebUiUrl,

    /// Print the hosted default URL
    HostedUrl,

    /// Show the config file location and contents
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("jupiter={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> commands::Result<()> {
    let env = match &cli.settings {
        Some(path) => DesktopEnv::load_with_file(path)?,
        None => DesktopEnv::load()?,
    };
    let store = match cli.data_dir {
        Some(dir) => ConfigStore::in_dir(dir),
        None => ConfigStore::user_default()?,
    };

    match cli.command {
        Commands::Pick { server } => commands::pick(env, store, &server).await,
        Commands::Probe { server } => commands::probe(&env, &server).await.map(|_| ()),
        Commands::WebUiUrl => commands::web_ui_url(env, store).await,
        Commands::HostedUrl => commands::hosted_url(env, store).await,
        Commands::Config => {
            commands::config_show(&env, &store);
            Ok(())
        }
    }
}
