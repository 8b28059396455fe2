//! Expense categories.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ResultLedger, util};

/// Color assigned to a category created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#8B5CF6";

/// A user-defined expense category.
///
/// Categories are matched to transactions by id only; deleting a category
/// leaves its transactions with a dangling `category_id`, which the
/// aggregation layer buckets under a fallback slice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTimeUtc,
}

impl Category {
    /// Build a validated category. An empty color falls back to
    /// [`DEFAULT_CATEGORY_COLOR`].
    pub fn new(user_id: &str, name: &str, color: &str) -> ResultLedger<Self> {
        let name = util::normalize_required_text(name, "category name")?;
        let color = color.trim();
        let color = if color.is_empty() {
            DEFAULT_CATEGORY_COLOR.to_string()
        } else {
            color.to_string()
        };
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name,
            color,
            created_at: chrono::Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub name_norm: String,
    pub color: String,
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

impl From<Model> for Category {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            name: model.name,
            color: model.color,
            created_at: model.created_at,
        }
    }
}
