//! Savings goal operations.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use crate::{Goal, GoalPriority, LedgerError, MoneyCents, NewGoal, ResultLedger, goals};

use super::{Store, with_tx};

/// Partial update for a goal. `None` fields keep their stored value.
#[derive(Clone, Debug, Default)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub target_amount: Option<MoneyCents>,
    pub current_amount: Option<MoneyCents>,
    pub deadline: Option<Option<NaiveDate>>,
    pub priority: Option<GoalPriority>,
}

impl GoalUpdate {
    fn apply(self, mut goal: Goal) -> ResultLedger<Goal> {
        if let Some(name) = self.name {
            goal.name = name;
        }
        if let Some(target_amount) = self.target_amount {
            goal.target_amount = target_amount;
        }
        if let Some(current_amount) = self.current_amount {
            goal.current_amount = current_amount;
        }
        if let Some(deadline) = self.deadline {
            goal.deadline = deadline;
        }
        if let Some(priority) = self.priority {
            goal.priority = priority;
        }
        goal.normalized()
    }
}

async fn require_goal(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    id: Uuid,
) -> ResultLedger<goals::Model> {
    goals::Entity::find_by_id(id)
        .filter(goals::Column::UserId.eq(user_id))
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::KeyNotFound("goal not exists".to_string()))
}

impl Store {
    pub async fn create_goal(&self, user_id: &str, new: NewGoal) -> ResultLedger<Goal> {
        let goal = Goal::new(user_id, new)?;
        with_tx!(self, |db_tx| {
            let row: goals::ActiveModel = (&goal).into();
            goals::Entity::insert(row).exec(&db_tx).await?;
            Ok(goal)
        })
    }

    pub async fn update_goal(
        &self,
        user_id: &str,
        id: Uuid,
        update: GoalUpdate,
    ) -> ResultLedger<Goal> {
        with_tx!(self, |db_tx| {
            let model = require_goal(&db_tx, user_id, id).await?;
            let updated = update.apply(Goal::try_from(model)?)?;
            let row: goals::ActiveModel = (&updated).into();
            row.update(&db_tx).await?;
            Ok(updated)
        })
    }

    /// Add a strictly positive amount to a goal's saved total.
    pub async fn add_money_to_goal(
        &self,
        user_id: &str,
        id: Uuid,
        amount: MoneyCents,
    ) -> ResultLedger<Goal> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount("amount must be > 0".to_string()));
        }
        with_tx!(self, |db_tx| {
            let model = require_goal(&db_tx, user_id, id).await?;
            let mut goal = Goal::try_from(model)?;
            goal.current_amount = goal
                .current_amount
                .checked_add(amount)
                .ok_or_else(|| LedgerError::InvalidAmount("goal total too large".to_string()))?;
            let row = goals::ActiveModel {
                id: ActiveValue::Set(goal.id),
                current_minor: ActiveValue::Set(goal.current_amount.cents()),
                ..Default::default()
            };
            row.update(&db_tx).await?;
            Ok(goal)
        })
    }

    pub async fn delete_goal(&self, user_id: &str, id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = require_goal(&db_tx, user_id, id).await?;
            goals::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// All of a user's goals, oldest first.
    pub async fn list_goals(&self, user_id: &str) -> ResultLedger<Vec<Goal>> {
        let rows = goals::Entity::find()
            .filter(goals::Column::UserId.eq(user_id))
            .order_by_asc(goals::Column::CreatedAt)
            .all(&self.database)
            .await?;
        rows.into_iter().map(Goal::try_from).collect()
    }
}
