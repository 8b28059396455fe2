use std::time::Duration;

use chrono::NaiveDate;
use sea_orm::Database;

use ledger::{
    MoneyCents, NewTransaction, RefreshScheduler, SnapshotHandle, Store, TransactionKind,
};
use migration::MigratorTrait;

async fn store_with_db() -> Store {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let store = Store::builder().database(db).build().await.unwrap();
    store.ensure_user("alice").await.unwrap();
    store
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn new_expense(description: &str, cents: i64, on: NaiveDate) -> NewTransaction {
    NewTransaction {
        kind: TransactionKind::Expense,
        description: description.to_string(),
        amount: MoneyCents::new(cents),
        date: on,
        competence: None,
        category_id: None,
        is_paid: true,
        due_date: None,
        is_recurring: false,
        recurring_day: None,
    }
}

// Long enough that only the immediate first tick fires during a test.
const PARKED: Duration = Duration::from_secs(3600);

async fn wait_for_version(handle: &SnapshotHandle, at_least: u64) {
    for _ in 0..500 {
        if handle.version().await >= at_least {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("cache never reached version {at_least}");
}

#[tokio::test]
async fn first_fetch_populates_the_cache() {
    let store = store_with_db().await;
    store
        .create_transaction("alice", new_expense("Groceries", 120_00, date(2026, 3, 15)))
        .await
        .unwrap();

    let handle = RefreshScheduler::new(store, "alice")
        .with_interval(PARKED)
        .spawn();
    wait_for_version(&handle, 1).await;

    let snapshot = handle.current().await;
    assert_eq!(snapshot.transactions.len(), 1);
    assert_eq!(snapshot.transactions[0].description, "Groceries");

    handle.shutdown().await;
}

#[tokio::test]
async fn mutations_are_visible_as_soon_as_they_return() {
    let store = store_with_db().await;
    let handle = RefreshScheduler::new(store, "alice")
        .with_interval(PARKED)
        .spawn();
    wait_for_version(&handle, 1).await;

    let tx = handle
        .create_transaction(new_expense("Internet", 99_90, date(2026, 3, 10)))
        .await
        .unwrap();

    let snapshot = handle.current().await;
    assert!(snapshot.transactions.iter().any(|t| t.id == tx.id));

    handle.delete_transaction(tx.id).await.unwrap();
    let snapshot = handle.current().await;
    assert!(snapshot.transactions.is_empty());

    handle.shutdown().await;
}

#[tokio::test]
async fn wake_picks_up_out_of_band_writes() {
    let store = store_with_db().await;
    let handle = RefreshScheduler::new(store.clone(), "alice")
        .with_interval(PARKED)
        .spawn();
    wait_for_version(&handle, 1).await;
    let seen = handle.version().await;

    // Written behind the handle's back, like another process would.
    store
        .create_transaction("alice", new_expense("Groceries", 120_00, date(2026, 3, 15)))
        .await
        .unwrap();
    assert!(handle.current().await.transactions.is_empty());

    handle.wake();
    wait_for_version(&handle, seen + 1).await;
    assert_eq!(handle.current().await.transactions.len(), 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn account_balance_mutation_round_trips() {
    let store = store_with_db().await;
    let handle = RefreshScheduler::new(store, "alice")
        .with_interval(PARKED)
        .spawn();
    wait_for_version(&handle, 1).await;

    let stored = handle
        .adjust_account_balance(MoneyCents::new(1_000_00))
        .await
        .unwrap();
    assert_eq!(stored, MoneyCents::new(1_000_00));
    assert_eq!(
        handle.current().await.account_balance,
        MoneyCents::new(1_000_00)
    );

    handle.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_the_loop() {
    let store = store_with_db().await;
    let handle = RefreshScheduler::new(store, "alice")
        .with_interval(Duration::from_millis(10))
        .spawn();
    wait_for_version(&handle, 1).await;
    handle.shutdown().await;
}
