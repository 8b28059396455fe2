//! Accounting periods.
//!
//! A [`Period`] is the calendar month a record belongs to for reporting
//! purposes (its *competence*), independent of the day the money actually
//! moved.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{LedgerError, ResultLedger};

/// A calendar month, with a 1-based month number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    /// 1 = January ... 12 = December.
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> ResultLedger<Self> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidDate(format!("invalid month: {month}")));
        }
        Ok(Self { year, month })
    }

    /// The period a given calendar day falls in.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month before this one.
    #[must_use]
    pub fn pred(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The last `count` periods ending at `self`, oldest first.
    #[must_use]
    pub fn trailing(self, count: usize) -> Vec<Period> {
        let mut periods = Vec::with_capacity(count);
        let mut period = self;
        for _ in 0..count {
            periods.push(period);
            period = period.pred();
        }
        periods.reverse();
        periods
    }

    /// Compact label like `Jan 26`.
    #[must_use]
    pub fn label(self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first_day) => first_day.format("%b %y").to_string(),
            None => format!("{:02}/{}", self.month, self.year),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_validates_month_range() {
        assert!(Period::new(2026, 1).is_ok());
        assert!(Period::new(2026, 12).is_ok());
        assert!(Period::new(2026, 0).is_err());
        assert!(Period::new(2026, 13).is_err());
    }

    #[test]
    fn from_date_uses_one_based_months() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(Period::from_date(date), Period::new(2026, 1).unwrap());
    }

    #[test]
    fn pred_wraps_over_year_boundary() {
        let january = Period::new(2026, 1).unwrap();
        assert_eq!(january.pred(), Period::new(2025, 12).unwrap());
        let july = Period::new(2026, 7).unwrap();
        assert_eq!(july.pred(), Period::new(2026, 6).unwrap());
    }

    #[test]
    fn trailing_is_oldest_first_and_ends_at_self() {
        let august = Period::new(2026, 8).unwrap();
        let window = august.trailing(3);
        assert_eq!(
            window,
            vec![
                Period::new(2026, 6).unwrap(),
                Period::new(2026, 7).unwrap(),
                august,
            ]
        );
        assert!(august.trailing(0).is_empty());
    }

    #[test]
    fn trailing_crosses_year_boundary() {
        let february = Period::new(2026, 2).unwrap();
        let window = february.trailing(4);
        assert_eq!(window[0], Period::new(2025, 11).unwrap());
        assert_eq!(window[3], february);
    }

    #[test]
    fn label_is_compact_month_year() {
        assert_eq!(Period::new(2026, 1).unwrap().label(), "Jan 26");
        assert_eq!(Period::new(2025, 12).unwrap().label(), "Dec 25");
    }

    #[test]
    fn display_is_sortable() {
        assert_eq!(Period::new(2026, 3).unwrap().to_string(), "2026-03");
    }
}
