use chrono::NaiveDate;
use sea_orm::Database;

use ledger::{
    MaterializeOutcome, MoneyCents, NewTransaction, Period, Store, TransactionKind,
    TransactionUpdate,
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

fn rent_template(day: u32) -> NewTransaction {
    NewTransaction {
        kind: TransactionKind::Expense,
        description: "Rent".to_string(),
        amount: MoneyCents::new(1_200_00),
        date: date(2026, 1, day.min(28)),
        competence: Some(Period::new(2026, 1).unwrap()),
        category_id: None,
        is_paid: true,
        due_date: Some(date(2026, 1, day.min(28))),
        is_recurring: true,
        recurring_day: Some(day),
    }
}

#[tokio::test]
async fn materializes_once_per_month() {
    let store = store_with_db().await;
    let template = store
        .create_transaction("alice", rent_template(10))
        .await
        .unwrap();

    let outcome = store
        .materialize_due("alice", date(2026, 2, 10))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        MaterializeOutcome {
            created: 1,
            skipped: 0
        }
    );

    // Same day again: the month already has its instance.
    let outcome = store
        .materialize_due("alice", date(2026, 2, 10))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        MaterializeOutcome {
            created: 0,
            skipped: 1
        }
    );

    let all = store.list_transactions("alice").await.unwrap();
    assert_eq!(all.len(), 2);
    let instance = all
        .iter()
        .find(|tx| tx.template_id == Some(template.id))
        .unwrap();
    assert_eq!(instance.competence, Period::new(2026, 2).unwrap());
    assert_eq!(instance.date, date(2026, 2, 10));
    assert_eq!(instance.due_date, Some(date(2026, 2, 10)));
    assert_eq!(instance.amount, template.amount);
    assert!(!instance.is_paid);
}

#[tokio::test]
async fn skips_templates_whose_day_does_not_match() {
    let store = store_with_db().await;
    store
        .create_transaction("alice", rent_template(10))
        .await
        .unwrap();

    let outcome = store
        .materialize_due("alice", date(2026, 2, 9))
        .await
        .unwrap();
    assert_eq!(outcome, MaterializeOutcome::default());
    assert_eq!(store.list_transactions("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn template_month_is_not_duplicated() {
    let store = store_with_db().await;
    store
        .create_transaction("alice", rent_template(10))
        .await
        .unwrap();

    // The template row itself covers January.
    let outcome = store
        .materialize_due("alice", date(2026, 1, 10))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        MaterializeOutcome {
            created: 0,
            skipped: 1
        }
    );
    assert_eq!(store.list_transactions("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn day_31_only_fires_in_months_that_have_it() {
    let store = store_with_db().await;
    store
        .create_transaction("alice", rent_template(31))
        .await
        .unwrap();

    // April ends on the 30th, so the day never matches.
    let outcome = store
        .materialize_due("alice", date(2026, 4, 30))
        .await
        .unwrap();
    assert_eq!(outcome, MaterializeOutcome::default());

    let outcome = store
        .materialize_due("alice", date(2026, 3, 31))
        .await
        .unwrap();
    assert_eq!(outcome.created, 1);
}

#[tokio::test]
async fn deleted_instance_comes_back_on_the_next_run() {
    let store = store_with_db().await;
    let template = store
        .create_transaction("alice", rent_template(10))
        .await
        .unwrap();

    store
        .materialize_due("alice", date(2026, 2, 10))
        .await
        .unwrap();
    let instance_id = store
        .list_transactions("alice")
        .await
        .unwrap()
        .into_iter()
        .find(|tx| tx.template_id == Some(template.id))
        .unwrap()
        .id;
    store.delete_transaction("alice", instance_id).await.unwrap();

    let outcome = store
        .materialize_due("alice", date(2026, 2, 10))
        .await
        .unwrap();
    assert_eq!(outcome.created, 1);
}

#[tokio::test]
async fn edited_instance_still_blocks_its_month() {
    let store = store_with_db().await;
    let template = store
        .create_transaction("alice", rent_template(10))
        .await
        .unwrap();

    store
        .materialize_due("alice", date(2026, 2, 10))
        .await
        .unwrap();
    let instance_id = store
        .list_transactions("alice")
        .await
        .unwrap()
        .into_iter()
        .find(|tx| tx.template_id == Some(template.id))
        .unwrap()
        .id;
    store
        .update_transaction(
            "alice",
            instance_id,
            TransactionUpdate {
                description: Some("Rent (negotiated)".to_string()),
                amount: Some(MoneyCents::new(1_100_00)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let outcome = store
        .materialize_due("alice", date(2026, 2, 10))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        MaterializeOutcome {
            created: 0,
            skipped: 1
        }
    );
}

#[tokio::test]
async fn income_templates_materialize_unpaid() {
    let store = store_with_db().await;
    let template = store
        .create_transaction(
            "alice",
            NewTransaction {
                kind: TransactionKind::Income,
                description: "Salary".to_string(),
                amount: MoneyCents::new(5_000_00),
                date: date(2026, 1, 5),
                competence: None,
                category_id: None,
                is_paid: true,
                due_date: None,
                is_recurring: true,
                recurring_day: Some(5),
            },
        )
        .await
        .unwrap();

    let outcome = store
        .materialize_due("alice", date(2026, 2, 5))
        .await
        .unwrap();
    assert_eq!(outcome.created, 1);

    let instance = store
        .list_transactions("alice")
        .await
        .unwrap()
        .into_iter()
        .find(|tx| tx.template_id == Some(template.id))
        .unwrap();
    assert_eq!(instance.kind, TransactionKind::Income);
    assert!(!instance.is_paid);
    // No due date on the template, none derived for the instance.
    assert_eq!(instance.due_date, None);
}

#[tokio::test]
async fn materialization_is_scoped_by_user() {
    let store = store_with_db().await;
    store.ensure_user("bob").await.unwrap();
    store
        .create_transaction("alice", rent_template(10))
        .await
        .unwrap();

    let outcome = store
        .materialize_due("bob", date(2026, 2, 10))
        .await
        .unwrap();
    assert_eq!(outcome, MaterializeOutcome::default());
    assert!(store.list_transactions("bob").await.unwrap().is_empty());
}
