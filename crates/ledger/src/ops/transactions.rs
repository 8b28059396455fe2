//! Transaction operations.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    LedgerError, MoneyCents, NewTransaction, Period, ResultLedger, Transaction, transactions,
};

use super::{Store, with_tx};

/// Partial update for a transaction. `None` fields keep their stored value;
/// the doubled options clear a nullable field with `Some(None)`.
///
/// The kind of a transaction is fixed at creation.
#[derive(Clone, Debug, Default)]
pub struct TransactionUpdate {
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub date: Option<NaiveDate>,
    pub competence: Option<Period>,
    pub category_id: Option<Option<Uuid>>,
    pub is_paid: Option<bool>,
    pub due_date: Option<Option<NaiveDate>>,
    pub is_recurring: Option<bool>,
    pub recurring_day: Option<Option<u32>>,
}

impl TransactionUpdate {
    fn apply(self, mut tx: Transaction) -> ResultLedger<Transaction> {
        if let Some(description) = self.description {
            tx.description = description;
        }
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
        if let Some(date) = self.date {
            tx.date = date;
        }
        if let Some(competence) = self.competence {
            tx.competence = competence;
        }
        if let Some(category_id) = self.category_id {
            tx.category_id = category_id;
        }
        if let Some(is_paid) = self.is_paid {
            tx.is_paid = is_paid;
        }
        if let Some(due_date) = self.due_date {
            tx.due_date = due_date;
        }
        if let Some(is_recurring) = self.is_recurring {
            tx.is_recurring = is_recurring;
        }
        if let Some(recurring_day) = self.recurring_day {
            tx.recurring_day = recurring_day;
        }
        tx.normalized()
    }
}

pub(super) async fn require_transaction(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    id: Uuid,
) -> ResultLedger<transactions::Model> {
    transactions::Entity::find_by_id(id)
        .filter(transactions::Column::UserId.eq(user_id))
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::KeyNotFound("transaction not exists".to_string()))
}

impl Store {
    /// Create a transaction. An income drops any supplied category and the
    /// competence defaults to the month of `date`.
    pub async fn create_transaction(
        &self,
        user_id: &str,
        new: NewTransaction,
    ) -> ResultLedger<Transaction> {
        let tx = Transaction::new(user_id, new)?;
        with_tx!(self, |db_tx| {
            let row: transactions::ActiveModel = (&tx).into();
            transactions::Entity::insert(row).exec(&db_tx).await?;
            Ok(tx)
        })
    }

    /// Apply a partial update and re-run the field validations on the result.
    pub async fn update_transaction(
        &self,
        user_id: &str,
        id: Uuid,
        update: TransactionUpdate,
    ) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, user_id, id).await?;
            let updated = update.apply(Transaction::try_from(model)?)?;
            let row: transactions::ActiveModel = (&updated).into();
            match row.update(&db_tx).await {
                Ok(_) => Ok(updated),
                // Moving a materialized instance onto a month that already
                // has one for the same template trips the unique index.
                Err(err)
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                {
                    Err(LedgerError::ExistingKey(
                        "recurring instance for that month".to_string(),
                    ))
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    /// Flip only the paid flag of a transaction.
    pub async fn set_transaction_paid(
        &self,
        user_id: &str,
        id: Uuid,
        is_paid: bool,
    ) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, user_id, id).await?;
            let mut tx = Transaction::try_from(model)?;
            tx.is_paid = is_paid;
            let row = transactions::ActiveModel {
                id: ActiveValue::Set(tx.id),
                is_paid: ActiveValue::Set(is_paid),
                ..Default::default()
            };
            row.update(&db_tx).await?;
            Ok(tx)
        })
    }

    /// Delete a transaction. Deleting a template does not touch its
    /// materialized instances.
    pub async fn delete_transaction(&self, user_id: &str, id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, user_id, id).await?;
            transactions::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// All of a user's transactions, most recent date first.
    pub async fn list_transactions(&self, user_id: &str) -> ResultLedger<Vec<Transaction>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }
}
