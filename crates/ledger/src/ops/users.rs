//! User bookkeeping.

use sea_orm::{ActiveValue, EntityTrait, SqlErr};

use crate::{ResultLedger, users, util};

use super::Store;

impl Store {
    /// Create the user row if it does not exist yet and return the trimmed
    /// username. Safe to call on every startup.
    pub async fn ensure_user(&self, username: &str) -> ResultLedger<String> {
        let username = util::normalize_required_text(username, "username")?;

        let existing = users::Entity::find_by_id(username.clone())
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Ok(username);
        }

        let user = users::ActiveModel {
            username: ActiveValue::Set(username.clone()),
            created_at: ActiveValue::Set(chrono::Utc::now()),
        };
        match users::Entity::insert(user).exec(&self.database).await {
            Ok(_) => Ok(username),
            // Lost a race against another writer; the row exists either way.
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(username)
            }
            Err(err) => Err(err.into()),
        }
    }
}
