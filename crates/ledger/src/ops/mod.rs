use sea_orm::DatabaseConnection;

use crate::ResultLedger;

mod account;
mod categories;
mod goals;
mod investments;
mod recurring;
mod snapshot;
mod transactions;
mod users;

pub use goals::GoalUpdate;
pub use investments::InvestmentUpdate;
pub use recurring::MaterializeOutcome;
pub use transactions::TransactionUpdate;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Persistent record store.
///
/// Every operation is scoped by a user id, runs inside a database
/// transaction and fails with a typed [`LedgerError`].
///
/// [`LedgerError`]: crate::LedgerError
#[derive(Clone, Debug)]
pub struct Store {
    database: DatabaseConnection,
}

impl Store {
    /// Return a builder for `Store`. Help to build the struct.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }
}

/// The builder for `Store`
#[derive(Default)]
pub struct StoreBuilder {
    database: DatabaseConnection,
}

impl StoreBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> StoreBuilder {
        self.database = db;
        self
    }

    /// Construct `Store`
    pub async fn build(self) -> ResultLedger<Store> {
        Ok(Store {
            database: self.database,
        })
    }
}
