//! Background worker that materializes due recurring transactions.

use std::{sync::Arc, time::Duration};

use chrono::Local;
use tokio::{
    sync::Notify,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::Store;

/// Recurring templates are checked once a day by default.
pub const DEFAULT_MATERIALIZE_INTERVAL: Duration = Duration::from_secs(60 * 60 * 24);

/// Periodically runs [`Store::materialize_due`] for one user. The wall-clock
/// date is read at each run, so a worker kept alive across midnight picks up
/// the new day on its own.
#[derive(Debug)]
pub struct RecurringWorker {
    store: Store,
    user_id: String,
    interval: Duration,
}

impl RecurringWorker {
    pub fn new(store: Store, user_id: impl Into<String>) -> RecurringWorker {
        RecurringWorker {
            store,
            user_id: user_id.into(),
            interval: DEFAULT_MATERIALIZE_INTERVAL,
        }
    }

    /// Override the run interval, mostly useful in tests.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> RecurringWorker {
        self.interval = interval;
        self
    }

    /// Spawn the worker loop. The first run happens immediately.
    pub fn spawn(self) -> RecurringWorkerHandle {
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(run_loop(
            self.store,
            self.user_id,
            self.interval,
            Arc::clone(&shutdown),
        ));
        RecurringWorkerHandle { shutdown, task }
    }
}

/// Owner handle for a spawned [`RecurringWorker`].
#[derive(Debug)]
pub struct RecurringWorkerHandle {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl RecurringWorkerHandle {
    /// Stop the loop and wait for the task to finish.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(err) = self.task.await {
            tracing::warn!("recurring worker ended badly: {err}");
        }
    }
}

async fn run_loop(store: Store, user_id: String, interval: Duration, shutdown: Arc<Notify>) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.notified() => break,
        }

        let today = Local::now().date_naive();
        match store.materialize_due(&user_id, today).await {
            Ok(outcome) if outcome.created > 0 => {
                tracing::info!(
                    created = outcome.created,
                    skipped = outcome.skipped,
                    "materialized recurring transactions"
                );
            }
            Ok(_) => {}
            Err(err) => tracing::warn!("recurring materialization failed: {err}"),
        }
    }
}
