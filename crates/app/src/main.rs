use std::sync::Arc;

use engine::Notifier;
use mailer::{Mailer, Transport, WebhookClient};
use migration::{Migrator, MigratorTrait};
use settings::{Database, Settings, TransportKind};

mod scheduler;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "splitledger={level},server={level},engine={level},mailer={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server.as_ref() else {
        tracing::warn!("no server settings found, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database).await?;
    let notifier = notifier(&settings)?;
    let engine = engine::Engine::builder()
        .database(db)
        .notifier(notifier)
        .limits(settings.limits.split_limits()?)
        .build()
        .await?;

    let bind = server.bind.clone().unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let server_engine = engine.clone();
    tasks.spawn(async move {
        server::run(server_engine, &addr).await;
    });

    if settings.weekly.enabled {
        let schedule = scheduler::Schedule {
            timezone: settings.weekly.timezone()?,
            weekday: settings.weekly.weekday()?,
            hour: settings.weekly.hour()?,
        };
        tasks.spawn(scheduler::run(engine, schedule));
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

fn notifier(
    settings: &Settings,
) -> Result<Arc<dyn Notifier>, Box<dyn std::error::Error + Send + Sync>> {
    let transport = match (settings.notifier.transport, &settings.notifier.url) {
        (TransportKind::Webhook, Some(url)) => {
            let client = reqwest::Client::builder().build()?;
            Transport::Webhook(WebhookClient::new(client, url))
        }
        _ => Transport::Log,
    };

    // The worker runs detached for as long as a notifier handle is alive.
    let (notifier, _worker) = Mailer::builder()
        .transport(transport)
        .from(&settings.notifier.from)
        .currency_symbol(&settings.notifier.currency_symbol)
        .spawn_notifier();
    Ok(notifier)
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
