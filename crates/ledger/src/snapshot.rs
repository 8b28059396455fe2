//! In-memory snapshot of a user's records and the aggregations over it.
//!
//! Every function here is pure: the caller supplies the period that counts
//! as "now" and the snapshot never touches the database or the clock, which
//! keeps the dashboard math trivially testable. Sums are over `MoneyCents`;
//! anomalous inputs (dangling category ids, zero targets) contribute nothing
//! instead of erroring.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AssetType, Category, Goal, Investment, MoneyCents, Period, Transaction, TransactionKind,
};

/// Slice label for expenses whose category is missing or was deleted.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
/// Neutral gray used for the fallback slice.
pub const UNCATEGORIZED_COLOR: &str = "#9CA3AF";
/// Bucket for investments without a resolvable asset type.
pub const OTHER_ASSET_TYPE_LABEL: &str = "Other";

/// One consistent read of everything the aggregations need.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub goals: Vec<Goal>,
    pub investments: Vec<Investment>,
    pub asset_types: Vec<AssetType>,
    pub account_balance: MoneyCents,
}

/// Per-category expense total for one period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    /// `None` marks the fallback slice.
    pub category_id: Option<Uuid>,
    pub name: String,
    pub color: String,
    pub total: MoneyCents,
}

/// One month of the income/expense series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthPoint {
    pub period: Period,
    pub label: String,
    pub income: MoneyCents,
    pub expenses: MoneyCents,
}

/// Invested total per asset type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeSlice {
    pub name: String,
    pub total: MoneyCents,
}

impl Snapshot {
    fn sum_transactions(&self, mut keep: impl FnMut(&Transaction) -> bool) -> MoneyCents {
        self.transactions
            .iter()
            .filter(|tx| keep(tx))
            .fold(MoneyCents::ZERO, |acc, tx| acc + tx.amount)
    }

    /// Received income booked to `period`. Unpaid incomes do not count.
    #[must_use]
    pub fn monthly_income(&self, period: Period) -> MoneyCents {
        self.sum_transactions(|tx| {
            tx.kind == TransactionKind::Income && tx.is_paid && tx.competence == period
        })
    }

    /// Settled expenses booked to `period`.
    #[must_use]
    pub fn monthly_expenses(&self, period: Period) -> MoneyCents {
        self.sum_transactions(|tx| {
            tx.kind == TransactionKind::Expense && tx.is_paid && tx.competence == period
        })
    }

    /// Expenses booked to `period` that are still open.
    #[must_use]
    pub fn unpaid_expenses(&self, period: Period) -> MoneyCents {
        self.sum_transactions(|tx| {
            tx.kind == TransactionKind::Expense && !tx.is_paid && tx.competence == period
        })
    }

    /// Income minus settled expenses for `period`.
    #[must_use]
    pub fn monthly_balance(&self, period: Period) -> MoneyCents {
        self.monthly_income(period) - self.monthly_expenses(period)
    }

    /// Cash position now: the account balance minus what was already paid
    /// out this month.
    #[must_use]
    pub fn current_balance(&self, today: Period) -> MoneyCents {
        self.account_balance - self.monthly_expenses(today)
    }

    /// Where the cash position lands once the month's open expenses settle.
    #[must_use]
    pub fn projected_balance(&self, today: Period) -> MoneyCents {
        self.current_balance(today) - self.unpaid_expenses(today)
    }

    #[must_use]
    pub fn total_investments(&self) -> MoneyCents {
        self.investments
            .iter()
            .fold(MoneyCents::ZERO, |acc, investment| {
                acc + investment.total_invested
            })
    }

    #[must_use]
    pub fn total_goals(&self) -> MoneyCents {
        self.goals
            .iter()
            .fold(MoneyCents::ZERO, |acc, goal| acc + goal.current_amount)
    }

    /// Account balance plus everything parked in goals and investments.
    #[must_use]
    pub fn net_worth(&self) -> MoneyCents {
        self.account_balance + self.total_goals() + self.total_investments()
    }

    /// Paid expense totals of `period` grouped by category.
    ///
    /// Slices follow the snapshot's category order; expenses without a
    /// resolvable category come last under [`UNCATEGORIZED_LABEL`]. Zero
    /// slices are omitted, and the slice totals sum to
    /// [`monthly_expenses`](Self::monthly_expenses) of the same period.
    #[must_use]
    pub fn expenses_by_category(&self, period: Period) -> Vec<CategorySlice> {
        let in_period = |tx: &Transaction| {
            tx.kind == TransactionKind::Expense && tx.is_paid && tx.competence == period
        };

        let mut slices = Vec::new();
        for category in &self.categories {
            let total =
                self.sum_transactions(|tx| in_period(tx) && tx.category_id == Some(category.id));
            if !total.is_zero() {
                slices.push(CategorySlice {
                    category_id: Some(category.id),
                    name: category.name.clone(),
                    color: category.color.clone(),
                    total,
                });
            }
        }

        let known: HashSet<Uuid> = self.categories.iter().map(|category| category.id).collect();
        let unassigned = self.sum_transactions(|tx| {
            in_period(tx) && !tx.category_id.is_some_and(|id| known.contains(&id))
        });
        if !unassigned.is_zero() {
            slices.push(CategorySlice {
                category_id: None,
                name: UNCATEGORIZED_LABEL.to_string(),
                color: UNCATEGORIZED_COLOR.to_string(),
                total: unassigned,
            });
        }

        slices
    }

    /// The last `months` periods ending at `today`, oldest first.
    #[must_use]
    pub fn monthly_series(&self, months: usize, today: Period) -> Vec<MonthPoint> {
        today
            .trailing(months)
            .into_iter()
            .map(|period| MonthPoint {
                period,
                label: period.label(),
                income: self.monthly_income(period),
                expenses: self.monthly_expenses(period),
            })
            .collect()
    }

    /// Open expenses ordered by urgency: due-dated ones first (earliest
    /// due date leading), undated ones after, truncated to `limit`.
    #[must_use]
    pub fn upcoming_expenses(&self, limit: usize) -> Vec<Transaction> {
        let mut bills: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.kind == TransactionKind::Expense && !tx.is_paid)
            .cloned()
            .collect();
        bills.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        bills.truncate(limit);
        bills
    }

    /// Invested totals grouped by asset-type name; positions without a
    /// resolvable type land under [`OTHER_ASSET_TYPE_LABEL`].
    #[must_use]
    pub fn investments_by_type(&self) -> Vec<TypeSlice> {
        let mut slices = Vec::new();
        for asset_type in &self.asset_types {
            let total = self
                .investments
                .iter()
                .filter(|investment| investment.asset_type_id == Some(asset_type.id))
                .fold(MoneyCents::ZERO, |acc, investment| {
                    acc + investment.total_invested
                });
            if !total.is_zero() {
                slices.push(TypeSlice {
                    name: asset_type.name.clone(),
                    total,
                });
            }
        }

        let known: HashSet<Uuid> = self.asset_types.iter().map(|at| at.id).collect();
        let untyped = self
            .investments
            .iter()
            .filter(|investment| {
                !investment
                    .asset_type_id
                    .is_some_and(|id| known.contains(&id))
            })
            .fold(MoneyCents::ZERO, |acc, investment| {
                acc + investment.total_invested
            });
        if !untyped.is_zero() {
            match slices
                .iter_mut()
                .find(|slice| slice.name == OTHER_ASSET_TYPE_LABEL)
            {
                Some(other) => other.total += untyped,
                None => slices.push(TypeSlice {
                    name: OTHER_ASSET_TYPE_LABEL.to_string(),
                    total: untyped,
                }),
            }
        }

        slices
    }

    /// Restore the canonical transaction ordering after merges.
    pub(crate) fn sort_transactions(&mut self) {
        self.transactions
            .sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
    }
}
