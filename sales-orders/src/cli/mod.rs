//! Command-line surface: argument parsing and dispatch

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use crate::config::Config;
use crate::records::{FieldNormalizer, ReferencePolicy};
use crate::store::Store;

use commands::orders::OrdersCommands;
use commands::sales::SalesCommands;

#[derive(Parser, Debug)]
#[command(
    name = "sales-orders",
    version,
    about = "Track sales representatives and their repeat customer orders"
)]
pub struct Cli {
    /// SQLite database file (overrides config and SALES_ORDERS_DB)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Config file (default: <config dir>/sales-orders/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// What to do with orders referencing an unknown sales representative
    #[arg(long, global = true, value_name = "accept|warn|reject")]
    pub reference_policy: Option<ReferencePolicy>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database tables if they do not exist
    Init,
    /// Sales representatives
    Sales {
        #[command(subcommand)]
        command: SalesCommands,
    },
    /// Repeat customer orders
    Orders {
        #[command(subcommand)]
        command: OrdersCommands,
    },
}

/// Everything a command handler needs, owned for the life of the process
pub struct AppContext {
    pub config: Config,
    pub store: Store,
    pub normalizer: FieldNormalizer,
}

/// Run a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?
        .with_overrides(cli.db.clone(), cli.reference_policy);

    init_logging(cli.verbose, config.log_level.as_deref());
    log::debug!("Using configuration: {:?}", config);

    let store = Store::open(&config.database_path)
        .await
        .with_context(|| format!("Cannot open {}", config.database_path.display()))?;
    store.ensure_schema().await?;

    let ctx = AppContext {
        config,
        store,
        normalizer: FieldNormalizer::for_today(),
    };

    let result = match cli.command {
        Commands::Init => commands::handle_init(&ctx).await,
        Commands::Sales { command } => commands::sales::handle_sales_command(&ctx, command).await,
        Commands::Orders { command } => {
            commands::orders::handle_orders_command(&ctx, command).await
        }
    };

    ctx.store.close().await;
    result
}

/// Initialize env_logger; RUST_LOG wins, then -v, then the configured level
fn init_logging(verbose: u8, configured: Option<&str>) {
    let level = match verbose {
        0 => configured.unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sales-orders",
            "orders",
            "list",
            "--db",
            "/tmp/x.db",
            "--reference-policy",
            "reject",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(cli.reference_policy, Some(ReferencePolicy::Reject));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::Orders {
                command: OrdersCommands::List { .. }
            }
        ));
    }

    #[test]
    fn test_bad_reference_policy_rejected() {
        let err = Cli::try_parse_from(["sales-orders", "--reference-policy", "maybe", "init"]);
        assert!(err.is_err());
    }
}
