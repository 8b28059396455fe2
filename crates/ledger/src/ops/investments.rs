//! Investment operations.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    AssetType, Investment, LedgerError, MoneyCents, NewInvestment, ResultLedger, asset_types,
    investments,
};

use super::{Store, with_tx};

/// Partial update for an investment. `None` fields keep their stored value.
/// The invested total is always recomputed from quantity and average price.
#[derive(Clone, Debug, Default)]
pub struct InvestmentUpdate {
    pub asset_name: Option<String>,
    pub asset_type_id: Option<Option<Uuid>>,
    pub quantity: Option<Decimal>,
    pub average_price: Option<MoneyCents>,
}

impl InvestmentUpdate {
    fn apply(self, mut investment: Investment) -> ResultLedger<Investment> {
        if let Some(asset_name) = self.asset_name {
            investment.asset_name = asset_name;
        }
        if let Some(asset_type_id) = self.asset_type_id {
            investment.asset_type_id = asset_type_id;
        }
        if let Some(quantity) = self.quantity {
            investment.quantity = quantity;
        }
        if let Some(average_price) = self.average_price {
            investment.average_price = average_price;
        }
        investment.normalized()
    }
}

async fn require_investment(
    db_tx: &DatabaseTransaction,
    user_id: &str,
    id: Uuid,
) -> ResultLedger<investments::Model> {
    investments::Entity::find_by_id(id)
        .filter(investments::Column::UserId.eq(user_id))
        .one(db_tx)
        .await?
        .ok_or_else(|| LedgerError::KeyNotFound("investment not exists".to_string()))
}

impl Store {
    pub async fn create_investment(
        &self,
        user_id: &str,
        new: NewInvestment,
    ) -> ResultLedger<Investment> {
        let investment = Investment::new(user_id, new)?;
        with_tx!(self, |db_tx| {
            let row: investments::ActiveModel = (&investment).into();
            investments::Entity::insert(row).exec(&db_tx).await?;
            Ok(investment)
        })
    }

    pub async fn update_investment(
        &self,
        user_id: &str,
        id: Uuid,
        update: InvestmentUpdate,
    ) -> ResultLedger<Investment> {
        with_tx!(self, |db_tx| {
            let model = require_investment(&db_tx, user_id, id).await?;
            let updated = update.apply(Investment::try_from(model)?)?;
            let row: investments::ActiveModel = (&updated).into();
            row.update(&db_tx).await?;
            Ok(updated)
        })
    }

    pub async fn delete_investment(&self, user_id: &str, id: Uuid) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let model = require_investment(&db_tx, user_id, id).await?;
            investments::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// All of a user's investments, oldest first.
    pub async fn list_investments(&self, user_id: &str) -> ResultLedger<Vec<Investment>> {
        let rows = investments::Entity::find()
            .filter(investments::Column::UserId.eq(user_id))
            .order_by_asc(investments::Column::CreatedAt)
            .all(&self.database)
            .await?;
        rows.into_iter().map(Investment::try_from).collect()
    }

    /// The fixed asset type catalog, sorted by name.
    pub async fn list_asset_types(&self) -> ResultLedger<Vec<AssetType>> {
        let rows = asset_types::Entity::find()
            .order_by_asc(asset_types::Column::Name)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(AssetType::from).collect())
    }
}
