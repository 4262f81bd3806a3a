//! Tracker Service - Maintenance commands for the task tracker store.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tracker_service_lib::MigrateAction;

#[derive(Parser)]
#[command(name = "tracker-service")]
#[command(about = "Task tracking backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Check database connectivity
    Ping,
    /// Remind assignees of tasks that are due soon
    Remind {
        /// Look-ahead window in hours
        #[arg(long, default_value = "24")]
        hours: i64,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            tracker_service_lib::run_migrations(migrate_action).await?;
        }
        Commands::Ping => {
            tracker_service_lib::ping().await?;
        }
        Commands::Remind { hours } => {
            let sent = tracker_service_lib::send_due_reminders(hours).await?;
            println!("{} reminder(s) sent", sent);
        }
    }

    Ok(())
}
