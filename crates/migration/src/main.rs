use clap::{Parser, Subcommand};
use sea_orm::Database;
use sea_orm_migration::prelude::*;

/// Apply or inspect the split ledger schema.
#[derive(Parser, Debug)]
#[command(name = "migration")]
struct Cli {
    /// Database connection string.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitledger.db?mode=rwc"
    )]
    database_url: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Apply every pending migration (default).
    Up,
    /// Roll back the last applied migration.
    Down,
    /// Drop every table and reapply all migrations.
    Fresh,
    /// Print which migrations are applied.
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let db = Database::connect(&cli.database_url).await?;

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => migration::Migrator::up(&db, None).await?,
        Command::Down => migration::Migrator::down(&db, Some(1)).await?,
        Command::Fresh => migration::Migrator::fresh(&db).await?,
        Command::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
