//! Materialization of recurring transactions.

use chrono::{Datelike, NaiveDate};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, SqlErr};

use crate::{Period, ResultLedger, Transaction, transactions};

use super::Store;

/// Counts reported by one materialization run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaterializeOutcome {
    /// Instances inserted by this run.
    pub created: usize,
    /// Due templates that produced nothing: the month's instance already
    /// exists, the template is still in its own first month, or the template
    /// failed on its own.
    pub skipped: usize,
}

impl Store {
    /// Materialize every recurring template of `user_id` whose day matches
    /// `today`, at most one instance per template per month.
    ///
    /// A failing template is logged and skipped so the rest of the run still
    /// happens. Concurrent runs are safe: the unique index on
    /// (user, template, competence) turns duplicate inserts into skips.
    pub async fn materialize_due(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> ResultLedger<MaterializeOutcome> {
        let current = Period::from_date(today);
        let mut outcome = MaterializeOutcome::default();

        let templates = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::IsRecurring.eq(true))
            .filter(transactions::Column::TemplateId.is_null())
            .all(&self.database)
            .await?;

        for model in templates {
            let template = match Transaction::try_from(model) {
                Ok(template) => template,
                Err(err) => {
                    tracing::warn!("skipping malformed recurring template: {err}");
                    outcome.skipped += 1;
                    continue;
                }
            };
            if template.recurring_day != Some(today.day()) {
                continue;
            }
            // The template row itself already stands for its first month.
            if template.competence == current {
                outcome.skipped += 1;
                continue;
            }

            let instance = match template.materialize(today) {
                Ok(instance) => instance,
                Err(err) => {
                    tracing::warn!(template = %template.id, "cannot materialize: {err}");
                    outcome.skipped += 1;
                    continue;
                }
            };
            let row: transactions::ActiveModel = (&instance).into();
            match transactions::Entity::insert(row).exec(&self.database).await {
                Ok(_) => outcome.created += 1,
                Err(err)
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                {
                    outcome.skipped += 1;
                }
                Err(err) => {
                    tracing::warn!(template = %template.id, "recurring insert failed: {err}");
                    outcome.skipped += 1;
                }
            }
        }

        Ok(outcome)
    }
}
