//! Manually maintained account balance.

use sea_orm::{ActiveModelTrait, ActiveValue, EntityTrait, TransactionTrait};

use crate::{MoneyCents, ResultLedger, account_profiles};

use super::{Store, with_tx};

impl Store {
    /// The stored account balance, zero when it was never set.
    pub async fn account_balance(&self, user_id: &str) -> ResultLedger<MoneyCents> {
        let profile = account_profiles::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?;
        Ok(profile.map_or(MoneyCents::ZERO, |profile| {
            MoneyCents::new(profile.balance_minor)
        }))
    }

    /// Overwrite the account balance. Any sign is accepted; an overdrawn
    /// account is a fact, not an input error.
    pub async fn adjust_account_balance(
        &self,
        user_id: &str,
        balance: MoneyCents,
    ) -> ResultLedger<MoneyCents> {
        with_tx!(self, |db_tx| {
            let existing = account_profiles::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?;
            match existing {
                Some(profile) => {
                    let row = account_profiles::ActiveModel {
                        user_id: ActiveValue::Set(profile.user_id),
                        balance_minor: ActiveValue::Set(balance.cents()),
                        updated_at: ActiveValue::Set(chrono::Utc::now()),
                    };
                    row.update(&db_tx).await?;
                }
                None => {
                    let row = account_profiles::ActiveModel {
                        user_id: ActiveValue::Set(user_id.to_string()),
                        balance_minor: ActiveValue::Set(balance.cents()),
                        updated_at: ActiveValue::Set(chrono::Utc::now()),
                    };
                    account_profiles::Entity::insert(row).exec(&db_tx).await?;
                }
            }
            Ok(balance)
        })
    }
}
