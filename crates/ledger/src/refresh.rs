//! Periodic snapshot refresh.
//!
//! A spawned loop refetches the snapshot on a fixed interval and on demand
//! through [`SnapshotHandle::wake`]. Mutations go through the handle: they
//! write to the store, stage an optimistic overlay so reads reflect the
//! change at once, then refetch to confirm it. The [`SnapshotCache`]
//! protocol keeps late fetch results from undoing either.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Notify, RwLock},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use uuid::Uuid;

use crate::{
    Category, Goal, GoalUpdate, Investment, InvestmentUpdate, MoneyCents, NewGoal, NewInvestment,
    NewTransaction, ResultLedger, Snapshot, SnapshotCache, StagedChange, Store, Transaction,
    TransactionUpdate,
};

/// How often the cached snapshot is refetched.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct SharedState {
    store: Store,
    user_id: String,
    cache: RwLock<SnapshotCache>,
    wake: Notify,
}

/// Builder for the refresh loop of one user.
#[derive(Debug)]
pub struct RefreshScheduler {
    store: Store,
    user_id: String,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(store: Store, user_id: impl Into<String>) -> RefreshScheduler {
        RefreshScheduler {
            store,
            user_id: user_id.into(),
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    /// Override the refetch interval, mostly useful in tests.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> RefreshScheduler {
        self.interval = interval;
        self
    }

    /// Spawn the refresh loop. The first fetch happens immediately; until it
    /// lands, reads see an empty snapshot.
    pub fn spawn(self) -> SnapshotHandle {
        let shared = Arc::new(SharedState {
            store: self.store,
            user_id: self.user_id,
            cache: RwLock::new(SnapshotCache::new()),
            wake: Notify::new(),
        });
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(run_loop(
            Arc::clone(&shared),
            self.interval,
            Arc::clone(&shutdown),
        ));
        SnapshotHandle {
            shared,
            shutdown,
            task,
        }
    }
}

/// Owner handle for a spawned refresh loop. Reads come from the cache and
/// never touch the database.
#[derive(Debug)]
pub struct SnapshotHandle {
    shared: Arc<SharedState>,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SnapshotHandle {
    /// The current snapshot: the last confirmed fetch plus staged changes.
    pub async fn current(&self) -> Snapshot {
        self.shared.cache.read().await.current()
    }

    /// Bumps every time a fetch replaces the cached snapshot.
    pub async fn version(&self) -> u64 {
        self.shared.cache.read().await.version()
    }

    /// Nudge the loop into an immediate refetch, like a dashboard coming
    /// back into view. Does not wait for the result.
    pub fn wake(&self) {
        self.shared.wake.notify_one();
    }

    /// Fetch now, bypassing the interval, and wait for the cache to settle.
    pub async fn refetch(&self) -> ResultLedger<()> {
        refresh_once(&self.shared).await
    }

    /// Stop the loop and wait for the task to finish.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(err) = self.task.await {
            tracing::warn!("refresh loop ended badly: {err}");
        }
    }

    async fn commit<T>(&self, value: T, change: StagedChange) -> ResultLedger<T> {
        self.shared.cache.write().await.stage(change);
        self.refetch().await?;
        Ok(value)
    }

    pub async fn create_transaction(&self, new: NewTransaction) -> ResultLedger<Transaction> {
        let tx = self
            .shared
            .store
            .create_transaction(&self.shared.user_id, new)
            .await?;
        self.commit(tx.clone(), StagedChange::UpsertTransaction(tx))
            .await
    }

    pub async fn update_transaction(
        &self,
        id: Uuid,
        update: TransactionUpdate,
    ) -> ResultLedger<Transaction> {
        let tx = self
            .shared
            .store
            .update_transaction(&self.shared.user_id, id, update)
            .await?;
        self.commit(tx.clone(), StagedChange::UpsertTransaction(tx))
            .await
    }

    pub async fn set_transaction_paid(
        &self,
        id: Uuid,
        is_paid: bool,
    ) -> ResultLedger<Transaction> {
        let tx = self
            .shared
            .store
            .set_transaction_paid(&self.shared.user_id, id, is_paid)
            .await?;
        self.commit(tx.clone(), StagedChange::UpsertTransaction(tx))
            .await
    }

    pub async fn delete_transaction(&self, id: Uuid) -> ResultLedger<()> {
        self.shared
            .store
            .delete_transaction(&self.shared.user_id, id)
            .await?;
        self.commit((), StagedChange::RemoveTransaction(id)).await
    }

    pub async fn create_category(&self, name: &str, color: &str) -> ResultLedger<Category> {
        let category = self
            .shared
            .store
            .create_category(&self.shared.user_id, name, color)
            .await?;
        self.commit(category.clone(), StagedChange::UpsertCategory(category))
            .await
    }

    pub async fn delete_category(&self, id: Uuid) -> ResultLedger<()> {
        self.shared
            .store
            .delete_category(&self.shared.user_id, id)
            .await?;
        self.commit((), StagedChange::RemoveCategory(id)).await
    }

    pub async fn create_goal(&self, new: NewGoal) -> ResultLedger<Goal> {
        let goal = self
            .shared
            .store
            .create_goal(&self.shared.user_id, new)
            .await?;
        self.commit(goal.clone(), StagedChange::UpsertGoal(goal))
            .await
    }

    pub async fn update_goal(&self, id: Uuid, update: GoalUpdate) -> ResultLedger<Goal> {
        let goal = self
            .shared
            .store
            .update_goal(&self.shared.user_id, id, update)
            .await?;
        self.commit(goal.clone(), StagedChange::UpsertGoal(goal))
            .await
    }

    pub async fn add_money_to_goal(&self, id: Uuid, amount: MoneyCents) -> ResultLedger<Goal> {
        let goal = self
            .shared
            .store
            .add_money_to_goal(&self.shared.user_id, id, amount)
            .await?;
        self.commit(goal.clone(), StagedChange::UpsertGoal(goal))
            .await
    }

    pub async fn delete_goal(&self, id: Uuid) -> ResultLedger<()> {
        self.shared
            .store
            .delete_goal(&self.shared.user_id, id)
            .await?;
        self.commit((), StagedChange::RemoveGoal(id)).await
    }

    pub async fn create_investment(&self, new: NewInvestment) -> ResultLedger<Investment> {
        let investment = self
            .shared
            .store
            .create_investment(&self.shared.user_id, new)
            .await?;
        self.commit(
            investment.clone(),
            StagedChange::UpsertInvestment(investment),
        )
        .await
    }

    pub async fn update_investment(
        &self,
        id: Uuid,
        update: InvestmentUpdate,
    ) -> ResultLedger<Investment> {
        let investment = self
            .shared
            .store
            .update_investment(&self.shared.user_id, id, update)
            .await?;
        self.commit(
            investment.clone(),
            StagedChange::UpsertInvestment(investment),
        )
        .await
    }

    pub async fn delete_investment(&self, id: Uuid) -> ResultLedger<()> {
        self.shared
            .store
            .delete_investment(&self.shared.user_id, id)
            .await?;
        self.commit((), StagedChange::RemoveInvestment(id)).await
    }

    pub async fn adjust_account_balance(&self, balance: MoneyCents) -> ResultLedger<MoneyCents> {
        let stored = self
            .shared
            .store
            .adjust_account_balance(&self.shared.user_id, balance)
            .await?;
        self.commit(stored, StagedChange::SetAccountBalance(stored))
            .await
    }
}

async fn run_loop(shared: Arc<SharedState>, interval: Duration, shutdown: Arc<Notify>) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shared.wake.notified() => {}
            _ = shutdown.notified() => break,
        }

        if let Err(err) = refresh_once(&shared).await {
            // Keep serving the previous snapshot; the next tick retries.
            tracing::warn!("snapshot refresh failed: {err}");
        }
    }
}

async fn refresh_once(shared: &SharedState) -> ResultLedger<()> {
    let token = shared.cache.write().await.start_refresh();
    let snapshot = shared.store.fetch_snapshot(&shared.user_id).await?;

    let mut cache = shared.cache.write().await;
    if cache.complete_refresh(token, snapshot) {
        tracing::debug!(version = cache.version(), "snapshot refreshed");
    } else {
        tracing::debug!("discarded stale snapshot fetch");
    }
    Ok(())
}
