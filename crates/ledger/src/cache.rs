//! Versioned snapshot cache with optimistic overlays.
//!
//! Refreshes of the snapshot can overlap, and nothing guarantees they
//! complete in the order they started. Every refresh therefore carries an
//! epoch token: only completions newer than the last applied one replace
//! the base snapshot, and a late result from an older fetch is dropped
//! instead of clobbering fresher data. In-flight fetches are never
//! cancelled; discarding their result is the whole protocol.
//!
//! Mutations stage their expected effect immediately (keyed by record id)
//! so reads reflect them before the authoritative refetch lands. A staged
//! change is retired once a refresh that started at or after the staging
//! point is applied.

use uuid::Uuid;

use crate::{Category, Goal, Investment, MoneyCents, Snapshot, Transaction};

/// Epoch ticket returned by [`SnapshotCache::start_refresh`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshToken {
    epoch: u64,
}

/// The optimistic effect of one store mutation.
#[derive(Clone, Debug)]
pub enum StagedChange {
    UpsertTransaction(Transaction),
    RemoveTransaction(Uuid),
    UpsertCategory(Category),
    RemoveCategory(Uuid),
    UpsertGoal(Goal),
    RemoveGoal(Uuid),
    UpsertInvestment(Investment),
    RemoveInvestment(Uuid),
    SetAccountBalance(MoneyCents),
}

#[derive(Debug, Default)]
pub struct SnapshotCache {
    base: Snapshot,
    /// Bumps once per applied refresh.
    version: u64,
    /// Source for refresh epochs; the newest issued token.
    next_epoch: u64,
    /// Epoch of the newest applied refresh.
    applied_epoch: u64,
    staged: Vec<(u64, StagedChange)>,
}

impl SnapshotCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many refreshes have been applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Register a refresh that is about to start.
    pub fn start_refresh(&mut self) -> RefreshToken {
        self.next_epoch += 1;
        RefreshToken {
            epoch: self.next_epoch,
        }
    }

    /// Apply a finished refresh. Returns `false` when the result is stale
    /// (a newer refresh was already applied) and was discarded.
    pub fn complete_refresh(&mut self, token: RefreshToken, snapshot: Snapshot) -> bool {
        if token.epoch <= self.applied_epoch {
            return false;
        }
        self.applied_epoch = token.epoch;
        self.version += 1;
        self.base = snapshot;
        self.staged.retain(|(epoch, _)| *epoch > token.epoch);
        true
    }

    /// Stage the optimistic effect of a mutation that just succeeded.
    ///
    /// The entry outlives every refresh already in flight: only a refresh
    /// started after this call can retire it, because only those fetches
    /// can observe the mutation.
    pub fn stage(&mut self, change: StagedChange) {
        self.staged.push((self.next_epoch + 1, change));
    }

    /// The merged view: base snapshot with staged changes overlaid.
    #[must_use]
    pub fn current(&self) -> Snapshot {
        let mut snapshot = self.base.clone();
        for (_, change) in &self.staged {
            apply_change(&mut snapshot, change);
        }
        if !self.staged.is_empty() {
            snapshot.sort_transactions();
        }
        snapshot
    }
}

fn apply_change(snapshot: &mut Snapshot, change: &StagedChange) {
    match change {
        StagedChange::UpsertTransaction(tx) => {
            upsert(&mut snapshot.transactions, tx, |existing| existing.id == tx.id);
        }
        StagedChange::RemoveTransaction(id) => {
            snapshot.transactions.retain(|existing| existing.id != *id);
        }
        StagedChange::UpsertCategory(category) => {
            upsert(&mut snapshot.categories, category, |existing| {
                existing.id == category.id
            });
        }
        StagedChange::RemoveCategory(id) => {
            snapshot.categories.retain(|existing| existing.id != *id);
        }
        StagedChange::UpsertGoal(goal) => {
            upsert(&mut snapshot.goals, goal, |existing| existing.id == goal.id);
        }
        StagedChange::RemoveGoal(id) => {
            snapshot.goals.retain(|existing| existing.id != *id);
        }
        StagedChange::UpsertInvestment(investment) => {
            upsert(&mut snapshot.investments, investment, |existing| {
                existing.id == investment.id
            });
        }
        StagedChange::RemoveInvestment(id) => {
            snapshot.investments.retain(|existing| existing.id != *id);
        }
        StagedChange::SetAccountBalance(balance) => {
            snapshot.account_balance = *balance;
        }
    }
}

fn upsert<T: Clone>(items: &mut Vec<T>, item: &T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|existing| same(existing)) {
        Some(slot) => *slot = item.clone(),
        None => items.push(item.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_balance(cents: i64) -> Snapshot {
        Snapshot {
            account_balance: MoneyCents::new(cents),
            ..Snapshot::default()
        }
    }

    #[test]
    fn refreshes_apply_in_epoch_order() {
        let mut cache = SnapshotCache::new();
        let first = cache.start_refresh();
        let second = cache.start_refresh();

        assert!(cache.complete_refresh(first, snapshot_with_balance(10)));
        assert_eq!(cache.version(), 1);
        assert!(cache.complete_refresh(second, snapshot_with_balance(20)));
        assert_eq!(cache.version(), 2);
        assert_eq!(cache.current().account_balance, MoneyCents::new(20));
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut cache = SnapshotCache::new();
        let older = cache.start_refresh();
        let newer = cache.start_refresh();

        assert!(cache.complete_refresh(newer, snapshot_with_balance(20)));
        // The older fetch resolves afterwards with pre-mutation data.
        assert!(!cache.complete_refresh(older, snapshot_with_balance(10)));

        assert_eq!(cache.version(), 1);
        assert_eq!(cache.current().account_balance, MoneyCents::new(20));
    }

    #[test]
    fn staged_change_overlays_until_a_newer_refresh_lands() {
        let mut cache = SnapshotCache::new();
        let initial = cache.start_refresh();
        assert!(cache.complete_refresh(initial, snapshot_with_balance(10)));

        cache.stage(StagedChange::SetAccountBalance(MoneyCents::new(99)));
        assert_eq!(cache.current().account_balance, MoneyCents::new(99));

        // A refresh started after staging retires the overlay and carries
        // the authoritative value itself.
        let confirming = cache.start_refresh();
        assert!(cache.complete_refresh(confirming, snapshot_with_balance(99)));
        assert_eq!(cache.current().account_balance, MoneyCents::new(99));

        let follow_up = cache.start_refresh();
        assert!(cache.complete_refresh(follow_up, snapshot_with_balance(42)));
        assert_eq!(cache.current().account_balance, MoneyCents::new(42));
    }

    #[test]
    fn staged_change_survives_refreshes_started_before_it() {
        let mut cache = SnapshotCache::new();
        let initial = cache.start_refresh();
        assert!(cache.complete_refresh(initial, snapshot_with_balance(10)));

        // A background fetch starts, then a mutation lands.
        let in_flight = cache.start_refresh();
        cache.stage(StagedChange::SetAccountBalance(MoneyCents::new(99)));

        // The pre-mutation fetch resolves: base updates but the overlay
        // must keep patching it.
        assert!(cache.complete_refresh(in_flight, snapshot_with_balance(10)));
        assert_eq!(cache.current().account_balance, MoneyCents::new(99));
    }

    #[test]
    fn upserts_replace_by_id_and_removes_filter() {
        use crate::{Category, MoneyCents};

        let mut cache = SnapshotCache::new();
        let category = Category::new("alice", "Food", "#EF4444").unwrap();
        cache.stage(StagedChange::UpsertCategory(category.clone()));
        assert_eq!(cache.current().categories.len(), 1);

        let mut renamed = category.clone();
        renamed.name = "Groceries".to_string();
        cache.stage(StagedChange::UpsertCategory(renamed));
        let current = cache.current();
        assert_eq!(current.categories.len(), 1);
        assert_eq!(current.categories[0].name, "Groceries");

        cache.stage(StagedChange::RemoveCategory(category.id));
        assert!(cache.current().categories.is_empty());

        cache.stage(StagedChange::SetAccountBalance(MoneyCents::new(5)));
        assert_eq!(cache.current().account_balance, MoneyCents::new(5));
    }
}
