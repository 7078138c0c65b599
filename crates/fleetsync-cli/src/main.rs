use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fleetsync")]
#[command(about = "Sync vehicle status between Divera 24/7 and stein.app", long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG still wins when set)
    #[arg(long, short = 'd', global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass
    Sync {
        /// Layered config paths in merge order (base -> site overrides)
        #[arg(long = "config", short = 'c', required = true)]
        config_paths: Vec<String>,

        /// Override sync.direction: both | stein (overwrite stein) | divera (overwrite divera)
        #[arg(long)]
        direction: Option<String>,

        /// Log the writes a pass would make without sending them
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Validate config: typed settings and unused keys
    CheckConfig {
        /// Layered config paths in merge order
        #[arg(long = "config", short = 'c', required = true)]
        config_paths: Vec<String>,

        /// Fail on unused keys instead of listing them
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent when missing.
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.cmd {
        Commands::Sync {
            config_paths,
            direction,
            dry_run,
        } => {
            let report =
                commands::sync::run_sync(&config_paths, direction.as_deref(), dry_run).await?;
            commands::print_report(&report);
        }

        Commands::ConfigHash { paths } => {
            let loaded = commands::load_config(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::CheckConfig {
            config_paths,
            strict,
        } => {
            commands::check::run_check(&config_paths, strict)?;
        }
    }

    Ok(())
}
