//! Savings goals.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, MoneyCents, ResultLedger, util};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl GoalPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl TryFrom<&str> for GoalPriority {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(LedgerError::InvalidKind(format!(
                "invalid goal priority: {other}"
            ))),
        }
    }
}

/// Input for creating a goal.
#[derive(Clone, Debug)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: MoneyCents,
    pub current_amount: MoneyCents,
    pub deadline: Option<NaiveDate>,
    pub priority: GoalPriority,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub target_amount: MoneyCents,
    pub current_amount: MoneyCents,
    pub deadline: Option<NaiveDate>,
    pub priority: GoalPriority,
    pub created_at: DateTimeUtc,
}

impl Goal {
    pub fn new(user_id: &str, new: NewGoal) -> ResultLedger<Self> {
        let goal = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: new.name,
            target_amount: new.target_amount,
            current_amount: new.current_amount,
            deadline: new.deadline,
            priority: new.priority,
            created_at: chrono::Utc::now(),
        };
        goal.normalized()
    }

    pub(crate) fn normalized(mut self) -> ResultLedger<Self> {
        self.name = util::normalize_required_text(&self.name, "goal name")?;
        if self.target_amount.is_negative() {
            return Err(LedgerError::InvalidAmount(
                "goal target must be >= 0".to_string(),
            ));
        }
        if self.current_amount.is_negative() {
            return Err(LedgerError::InvalidAmount(
                "goal amount must be >= 0".to_string(),
            ));
        }
        Ok(self)
    }

    /// How far along the goal is, as a percentage clamped to `[0, 100]`.
    ///
    /// A goal with no meaningful target (zero) reports `0.0` instead of
    /// dividing by zero.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount.cents() <= 0 {
            return 0.0;
        }
        let percent =
            self.current_amount.cents() as f64 * 100.0 / self.target_amount.cents() as f64;
        percent.clamp(0.0, 100.0)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub target_minor: i64,
    pub current_minor: i64,
    pub deadline: Option<Date>,
    pub priority: String,
    pub created_at: DateTimeUtc,
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

impl From<&Goal> for ActiveModel {
    fn from(goal: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id),
            user_id: ActiveValue::Set(goal.user_id.clone()),
            name: ActiveValue::Set(goal.name.clone()),
            target_minor: ActiveValue::Set(goal.target_amount.cents()),
            current_minor: ActiveValue::Set(goal.current_amount.cents()),
            deadline: ActiveValue::Set(goal.deadline),
            priority: ActiveValue::Set(goal.priority.as_str().to_string()),
            created_at: ActiveValue::Set(goal.created_at),
        }
    }
}

impl TryFrom<Model> for Goal {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            target_amount: MoneyCents::new(model.target_minor),
            current_amount: MoneyCents::new(model.current_minor),
            deadline: model.deadline,
            priority: GoalPriority::try_from(model.priority.as_str())?,
            created_at: model.created_at,
        })
    }
}
