pub use asset_types::AssetType;
pub use cache::{RefreshToken, SnapshotCache, StagedChange};
pub use categories::{Category, DEFAULT_CATEGORY_COLOR};
pub use error::LedgerError;
pub use goals::{Goal, GoalPriority, NewGoal};
pub use investments::{Investment, NewInvestment};
pub use materializer::{DEFAULT_MATERIALIZE_INTERVAL, RecurringWorker, RecurringWorkerHandle};
pub use money::MoneyCents;
pub use ops::{
    GoalUpdate, InvestmentUpdate, MaterializeOutcome, Store, StoreBuilder, TransactionUpdate,
};
pub use period::Period;
pub use refresh::{DEFAULT_REFRESH_INTERVAL, RefreshScheduler, SnapshotHandle};
pub use snapshot::{
    CategorySlice, MonthPoint, OTHER_ASSET_TYPE_LABEL, Snapshot, TypeSlice, UNCATEGORIZED_COLOR,
    UNCATEGORIZED_LABEL,
};
pub use transactions::{NewTransaction, Transaction, TransactionKind};

mod account_profiles;
mod asset_types;
mod cache;
mod categories;
mod error;
mod goals;
mod investments;
mod materializer;
mod money;
mod ops;
mod period;
mod refresh;
mod snapshot;
mod transactions;
mod users;
mod util;

/// Alias for `Result<T, LedgerError>`
pub type ResultLedger<T> = Result<T, LedgerError>;
