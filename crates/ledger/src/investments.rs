//! Investment positions.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, MoneyCents, ResultLedger, util};

/// Input for creating an investment position.
#[derive(Clone, Debug)]
pub struct NewInvestment {
    pub asset_name: String,
    pub asset_type_id: Option<Uuid>,
    pub quantity: Decimal,
    pub average_price: MoneyCents,
}

/// A held asset position.
///
/// `total_invested` is derived state: the store recomputes it from quantity
/// and average price on every write, so the stored figure can never drift
/// from its inputs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investment {
    pub id: Uuid,
    pub user_id: String,
    pub asset_name: String,
    pub asset_type_id: Option<Uuid>,
    pub quantity: Decimal,
    pub average_price: MoneyCents,
    pub total_invested: MoneyCents,
    pub created_at: DateTimeUtc,
}

impl Investment {
    pub fn new(user_id: &str, new: NewInvestment) -> ResultLedger<Self> {
        let investment = Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            asset_name: new.asset_name,
            asset_type_id: new.asset_type_id,
            quantity: new.quantity,
            average_price: new.average_price,
            total_invested: MoneyCents::ZERO,
            created_at: chrono::Utc::now(),
        };
        investment.normalized()
    }

    /// Validate the position and refresh `total_invested` from its inputs.
    pub(crate) fn normalized(mut self) -> ResultLedger<Self> {
        self.asset_name = util::normalize_required_text(&self.asset_name, "asset name")?;
        if self.quantity <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(
                "quantity must be > 0".to_string(),
            ));
        }
        if self.average_price.is_negative() {
            return Err(LedgerError::InvalidAmount(
                "average price must be >= 0".to_string(),
            ));
        }
        self.total_invested = total_for(self.quantity, self.average_price)?;
        Ok(self)
    }
}

/// `quantity × average price` rounded to whole cents, midpoint away from
/// zero.
fn total_for(quantity: Decimal, average_price: MoneyCents) -> ResultLedger<MoneyCents> {
    let total = quantity
        .checked_mul(Decimal::from(average_price.cents()))
        .ok_or_else(|| LedgerError::InvalidAmount("investment total too large".to_string()))?;
    let minor = total
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| LedgerError::InvalidAmount("investment total too large".to_string()))?;
    Ok(MoneyCents::new(minor))
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "investments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub asset_name: String,
    pub asset_type_id: Option<Uuid>,
    /// Decimal stored as TEXT; the sqlite driver has no decimal codec.
    pub quantity: String,
    pub average_price_minor: i64,
    pub total_invested_minor: i64,
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
    #[sea_orm(
        belongs_to = "super::asset_types::Entity",
        from = "Column::AssetTypeId",
        to = "super::asset_types::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    AssetType,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::asset_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssetType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Investment> for ActiveModel {
    fn from(investment: &Investment) -> Self {
        Self {
            id: ActiveValue::Set(investment.id),
            user_id: ActiveValue::Set(investment.user_id.clone()),
            asset_name: ActiveValue::Set(investment.asset_name.clone()),
            asset_type_id: ActiveValue::Set(investment.asset_type_id),
            quantity: ActiveValue::Set(investment.quantity.to_string()),
            average_price_minor: ActiveValue::Set(investment.average_price.cents()),
            total_invested_minor: ActiveValue::Set(investment.total_invested.cents()),
            created_at: ActiveValue::Set(investment.created_at),
        }
    }
}

impl TryFrom<Model> for Investment {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let quantity = Decimal::from_str(&model.quantity).map_err(|_| {
            LedgerError::InvalidAmount(format!("invalid stored quantity: {}", model.quantity))
        })?;
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            asset_name: model.asset_name,
            asset_type_id: model.asset_type_id,
            quantity,
            average_price: MoneyCents::new(model.average_price_minor),
            total_invested: MoneyCents::new(model.total_invested_minor),
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(quantity: Decimal, price: i64) -> Investment {
        Investment::new(
            "alice",
            NewInvestment {
                asset_name: "PETR4".to_string(),
                asset_type_id: None,
                quantity,
                average_price: MoneyCents::new(price),
            },
        )
        .unwrap()
    }

    #[test]
    fn total_is_quantity_times_price() {
        assert_eq!(
            position(Decimal::from(10), 25_00).total_invested,
            MoneyCents::new(250_00)
        );
    }

    #[test]
    fn fractional_quantities_round_to_whole_cents() {
        assert_eq!(
            position(Decimal::new(25, 1), 10_00).total_invested,
            MoneyCents::new(25_00)
        );
        // 0.333 × 10.00 = 3.33 rounded
        assert_eq!(
            position(Decimal::new(333, 3), 10_00).total_invested,
            MoneyCents::new(3_33)
        );
    }

    #[test]
    fn nonpositive_quantity_is_rejected() {
        assert!(
            Investment::new(
                "alice",
                NewInvestment {
                    asset_name: "PETR4".to_string(),
                    asset_type_id: None,
                    quantity: Decimal::ZERO,
                    average_price: MoneyCents::new(10_00),
                },
            )
            .is_err()
        );
    }
}
