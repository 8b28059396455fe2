//! Category operations.

use sea_orm::{
    ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{Category, LedgerError, ResultLedger, categories, util};

use super::{Store, with_tx};

impl Store {
    /// Create a category. Names that collide with an existing one after
    /// normalization (case and accents ignored) are rejected.
    pub async fn create_category(
        &self,
        user_id: &str,
        name: &str,
        color: &str,
    ) -> ResultLedger<Category> {
        let category = Category::new(user_id, name, color)?;
        let Some(name_norm) = util::normalize_name_key(&category.name) else {
            return Err(LedgerError::InvalidName(
                "category name needs at least one letter or digit".to_string(),
            ));
        };

        with_tx!(self, |db_tx| {
            let row = categories::ActiveModel {
                id: ActiveValue::Set(category.id),
                user_id: ActiveValue::Set(category.user_id.clone()),
                name: ActiveValue::Set(category.name.clone()),
                name_norm: ActiveValue::Set(name_norm),
                color: ActiveValue::Set(category.color.clone()),
                created_at: ActiveValue::Set(category.created_at),
            };
            match categories::Entity::insert(row).exec(&db_tx).await {
                Ok(_) => Ok(category),
                Err(err)
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                {
                    Err(LedgerError::ExistingKey(category.name.clone()))
                }
                Err(err) => Err(err.into()),
            }
        })
    }

    /// Delete a category. Transactions keep their dangling reference and the
    /// aggregations report them as uncategorized.
    pub async fn delete_category(&self, user_id: &str, id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let Some(row) = categories::Entity::find_by_id(id)
                .filter(categories::Column::UserId.eq(user_id))
                .one(&db_tx)
                .await?
            else {
                return Err(LedgerError::KeyNotFound("category not exists".to_string()));
            };
            categories::Entity::delete_by_id(row.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// All of a user's categories, sorted by name.
    pub async fn list_categories(&self, user_id: &str) -> ResultLedger<Vec<Category>> {
        let rows = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}
