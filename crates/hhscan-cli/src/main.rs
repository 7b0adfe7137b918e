mod runs;
mod search;
mod store;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::runs::RunsCommands;
use crate::search::SearchCommands;

#[derive(Debug, Parser)]
#[command(name = "hhscan")]
#[command(about = "Adaptive grid search for venues advertising happy hours")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search a region and persist admitted places
    Search {
        #[command(subcommand)]
        command: SearchCommands,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Inspect recorded search runs
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = hhscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Search { command } => search::run_search(&config, command).await,
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    hhscan_db::ping(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = hhscan_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
            Ok(())
        }
        Commands::Runs { command } => {
            let pool = connect(&config).await?;
            match command {
                RunsCommands::List { limit } => runs::run_runs_list(&pool, limit).await,
            }
        }
    }
}

pub(crate) async fn connect(config: &hhscan_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = hhscan_db::PoolConfig::from_app_config(config);
    let pool = hhscan_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
