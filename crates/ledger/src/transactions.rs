//! Transaction records.
//!
//! A `Transaction` is a single income or expense row. Recurring *templates*
//! (`is_recurring` with no `template_id`) and the instances they produce
//! share this table; an instance points back at its template through
//! `template_id`, and that link is what makes materialization idempotent.

use chrono::{Datelike, NaiveDate};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, MoneyCents, Period, ResultLedger, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::InvalidKind(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Input for creating a transaction.
///
/// `competence` defaults to the month of `date` when left out.
#[derive(Clone, Debug)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub description: String,
    pub amount: MoneyCents,
    pub date: NaiveDate,
    pub competence: Option<Period>,
    pub category_id: Option<Uuid>,
    pub is_paid: bool,
    pub due_date: Option<NaiveDate>,
    pub is_recurring: bool,
    pub recurring_day: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: MoneyCents,
    /// Day the movement happened or is planned.
    pub date: NaiveDate,
    /// Accounting month the amount belongs to.
    pub competence: Period,
    /// Expenses only; incomes always carry `None`.
    pub category_id: Option<Uuid>,
    pub is_paid: bool,
    pub due_date: Option<NaiveDate>,
    pub is_recurring: bool,
    pub recurring_day: Option<u32>,
    /// Set on materialized instances; points at the producing template.
    pub template_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

impl Transaction {
    pub fn new(user_id: &str, new: NewTransaction) -> ResultLedger<Self> {
        let competence = new
            .competence
            .unwrap_or_else(|| Period::from_date(new.date));
        let tx = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            kind: new.kind,
            description: new.description,
            amount: new.amount,
            date: new.date,
            competence,
            category_id: new.category_id,
            is_paid: new.is_paid,
            due_date: new.due_date,
            is_recurring: new.is_recurring,
            recurring_day: new.recurring_day,
            template_id: None,
            created_at: chrono::Utc::now(),
        };
        tx.normalized()
    }

    /// Re-check the row invariants after field changes. Strips the category
    /// from incomes and the recurring day from non-recurring rows.
    pub(crate) fn normalized(mut self) -> ResultLedger<Self> {
        self.description = util::normalize_required_text(&self.description, "description")?;
        if !self.amount.is_positive() {
            return Err(LedgerError::InvalidAmount("amount must be > 0".to_string()));
        }
        util::validate_recurring_day(self.recurring_day)?;
        if self.kind == TransactionKind::Income {
            self.category_id = None;
        }
        if !self.is_recurring {
            self.recurring_day = None;
        }
        Ok(self)
    }

    /// Whether this row is a recurring template (as opposed to an ordinary
    /// transaction or a materialized instance).
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.is_recurring && self.template_id.is_none()
    }

    /// Build the instance this template produces for the month of `today`.
    ///
    /// The instance starts unpaid, dated `today`, with the competence of
    /// `today`'s month and `template_id` pointing back here. A due date is
    /// derived on the recurring day only when the template itself has one
    /// and that day exists in the month.
    pub fn materialize(&self, today: NaiveDate) -> ResultLedger<Self> {
        if !self.is_template() {
            return Err(LedgerError::InvalidKind(
                "transaction is not a recurring template".to_string(),
            ));
        }
        let Some(day) = self.recurring_day else {
            return Err(LedgerError::InvalidDate(
                "recurring template has no recurring day".to_string(),
            ));
        };

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: self.user_id.clone(),
            kind: self.kind,
            description: self.description.clone(),
            amount: self.amount,
            date: today,
            competence: Period::from_date(today),
            category_id: self.category_id,
            is_paid: false,
            due_date: self
                .due_date
                .and_then(|_| NaiveDate::from_ymd_opt(today.year(), today.month(), day)),
            is_recurring: true,
            recurring_day: Some(day),
            template_id: Some(self.id),
            created_at: chrono::Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub kind: String,
    pub description: String,
    pub amount_minor: i64,
    pub date: Date,
    pub competence_month: i32,
    pub competence_year: i32,
    pub category_id: Option<Uuid>,
    pub is_paid: bool,
    pub due_date: Option<Date>,
    pub is_recurring: bool,
    pub recurring_day: Option<i32>,
    pub created_at: DateTimeUtc,
    pub template_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            date: ActiveValue::Set(tx.date),
            competence_month: ActiveValue::Set(tx.competence.month as i32),
            competence_year: ActiveValue::Set(tx.competence.year),
            category_id: ActiveValue::Set(tx.category_id),
            is_paid: ActiveValue::Set(tx.is_paid),
            due_date: ActiveValue::Set(tx.due_date),
            is_recurring: ActiveValue::Set(tx.is_recurring),
            recurring_day: ActiveValue::Set(tx.recurring_day.map(|day| day as i32)),
            created_at: ActiveValue::Set(tx.created_at),
            template_id: ActiveValue::Set(tx.template_id),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let month = u32::try_from(model.competence_month).map_err(|_| {
            LedgerError::InvalidDate(format!(
                "invalid competence month: {}",
                model.competence_month
            ))
        })?;
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            description: model.description,
            amount: MoneyCents::new(model.amount_minor),
            date: model.date,
            competence: Period::new(model.competence_year, month)?,
            category_id: model.category_id,
            is_paid: model.is_paid,
            due_date: model.due_date,
            is_recurring: model.is_recurring,
            recurring_day: model.recurring_day.and_then(|day| u32::try_from(day).ok()),
            created_at: model.created_at,
            template_id: model.template_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(due_date: Option<NaiveDate>) -> Transaction {
        Transaction::new(
            "alice",
            NewTransaction {
                kind: TransactionKind::Expense,
                description: "Rent".to_string(),
                amount: MoneyCents::new(120_000),
                date: NaiveDate::from_ymd_opt(2026, 5, 10).unwrap(),
                competence: None,
                category_id: Some(Uuid::new_v4()),
                is_paid: true,
                due_date,
                is_recurring: true,
                recurring_day: Some(10),
            },
        )
        .unwrap()
    }

    #[test]
    fn new_defaults_competence_from_date() {
        let tx = template(None);
        assert_eq!(tx.competence, Period::new(2026, 5).unwrap());
        assert!(tx.is_template());
    }

    #[test]
    fn new_rejects_nonpositive_amounts() {
        let mut new = NewTransaction {
            kind: TransactionKind::Expense,
            description: "Coffee".to_string(),
            amount: MoneyCents::ZERO,
            date: NaiveDate::from_ymd_opt(2026, 5, 10).unwrap(),
            competence: None,
            category_id: None,
            is_paid: true,
            due_date: None,
            is_recurring: false,
            recurring_day: None,
        };
        assert!(Transaction::new("alice", new.clone()).is_err());
        new.amount = MoneyCents::new(-100);
        assert!(Transaction::new("alice", new).is_err());
    }

    #[test]
    fn new_rejects_blank_description_and_bad_recurring_day() {
        let base = NewTransaction {
            kind: TransactionKind::Expense,
            description: "  ".to_string(),
            amount: MoneyCents::new(100),
            date: NaiveDate::from_ymd_opt(2026, 5, 10).unwrap(),
            competence: None,
            category_id: None,
            is_paid: true,
            due_date: None,
            is_recurring: false,
            recurring_day: None,
        };
        assert!(Transaction::new("alice", base.clone()).is_err());

        let bad_day = NewTransaction {
            description: "Gym".to_string(),
            is_recurring: true,
            recurring_day: Some(32),
            ..base
        };
        assert!(Transaction::new("alice", bad_day).is_err());
    }

    #[test]
    fn incomes_drop_their_category() {
        let tx = Transaction::new(
            "alice",
            NewTransaction {
                kind: TransactionKind::Income,
                description: "Salary".to_string(),
                amount: MoneyCents::new(500_000),
                date: NaiveDate::from_ymd_opt(2026, 5, 5).unwrap(),
                competence: None,
                category_id: Some(Uuid::new_v4()),
                is_paid: true,
                due_date: None,
                is_recurring: false,
                recurring_day: None,
            },
        )
        .unwrap();
        assert_eq!(tx.category_id, None);
    }

    #[test]
    fn materialize_builds_an_unpaid_instance_for_todays_month() {
        let source = template(NaiveDate::from_ymd_opt(2026, 5, 10));
        let today = NaiveDate::from_ymd_opt(2026, 6, 10).unwrap();

        let instance = source.materialize(today).unwrap();
        assert_eq!(instance.template_id, Some(source.id));
        assert_eq!(instance.competence, Period::new(2026, 6).unwrap());
        assert_eq!(instance.date, today);
        assert!(!instance.is_paid);
        assert_eq!(instance.amount, source.amount);
        assert_eq!(instance.description, source.description);
        assert_eq!(instance.category_id, source.category_id);
        assert_eq!(instance.due_date, NaiveDate::from_ymd_opt(2026, 6, 10));
        assert!(!instance.is_template());
    }

    #[test]
    fn materialize_keeps_due_date_empty_when_template_has_none() {
        let source = template(None);
        let today = NaiveDate::from_ymd_opt(2026, 6, 10).unwrap();
        let instance = source.materialize(today).unwrap();
        assert_eq!(instance.due_date, None);
    }

    #[test]
    fn materialize_rejects_non_templates() {
        let source = template(None);
        let today = NaiveDate::from_ymd_opt(2026, 6, 10).unwrap();
        let instance = source.materialize(today).unwrap();
        assert_eq!(
            instance.materialize(today),
            Err(LedgerError::InvalidKind(
                "transaction is not a recurring template".to_string()
            ))
        );
    }
}
