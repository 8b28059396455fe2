use std::time::Duration;

use ledger::{Period, RecurringWorker, RefreshScheduler, SnapshotHandle, Store};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "cofre={level},ledger={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    let store = Store::builder().database(db).build().await?;
    let user_id = store.ensure_user(&settings.app.user).await?;

    let mut worker = RecurringWorker::new(store.clone(), &user_id);
    if let Some(recurring) = &settings.recurring {
        worker = worker.with_interval(Duration::from_secs(recurring.interval_hours * 60 * 60));
    }
    let worker = worker.spawn();

    let mut scheduler = RefreshScheduler::new(store, &user_id);
    if let Some(refresh) = &settings.refresh {
        scheduler = scheduler.with_interval(Duration::from_secs(refresh.interval_secs));
    }
    let handle = scheduler.spawn();

    tracing::info!("cofre running for {user_id}; press Ctrl-C to stop");

    let mut seen_version = 0;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_secs(5)) => {}
        }
        let version = handle.version().await;
        if version != seen_version {
            seen_version = version;
            log_summary(&handle).await;
        }
    }

    tracing::info!("shutting down...");
    handle.shutdown().await;
    worker.shutdown().await;

    Ok(())
}

async fn log_summary(handle: &SnapshotHandle) {
    let period = Period::from_date(chrono::Local::now().date_naive());
    let snapshot = handle.current().await;
    tracing::info!(
        "{period}: income {income}, expenses {expenses}, balance {balance}, net worth {net_worth}",
        income = snapshot.monthly_income(period),
        expenses = snapshot.monthly_expenses(period),
        balance = snapshot.monthly_balance(period),
        net_worth = snapshot.net_worth(),
    );
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
