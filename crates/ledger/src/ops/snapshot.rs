//! Snapshot assembly.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};

use crate::{
    AssetType, Category, Goal, Investment, MoneyCents, ResultLedger, Snapshot, Transaction,
    account_profiles, asset_types, categories, goals, investments, transactions,
};

use super::{Store, with_tx};

impl Store {
    /// Read everything the aggregations need in one database transaction, so
    /// the snapshot is internally consistent.
    pub async fn fetch_snapshot(&self, user_id: &str) -> ResultLedger<Snapshot> {
        with_tx!(self, |db_tx| {
            let transactions = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultLedger<Vec<_>>>()?;

            let categories = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id))
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Category::from)
                .collect();

            let goals = goals::Entity::find()
                .filter(goals::Column::UserId.eq(user_id))
                .order_by_asc(goals::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Goal::try_from)
                .collect::<ResultLedger<Vec<_>>>()?;

            let investments = investments::Entity::find()
                .filter(investments::Column::UserId.eq(user_id))
                .order_by_asc(investments::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Investment::try_from)
                .collect::<ResultLedger<Vec<_>>>()?;

            let asset_types = asset_types::Entity::find()
                .order_by_asc(asset_types::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(AssetType::from)
                .collect();

            let account_balance = account_profiles::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .map_or(MoneyCents::ZERO, |profile| {
                    MoneyCents::new(profile.balance_minor)
                });

            Ok(Snapshot {
                transactions,
                categories,
                goals,
                investments,
                asset_types,
                account_balance,
            })
        })
    }
}
