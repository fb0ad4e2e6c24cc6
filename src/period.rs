// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Billing periods anchored on a configurable day of the month.
//!
//! A start day larger than a month's length clamps to that month's last day,
//! month by month, so consecutive periods always tile the calendar.

use crate::models::BillingPeriod;
use chrono::{Datelike, NaiveDate};

pub const MIN_START_DAY: u32 = 1;
pub const MAX_START_DAY: u32 = 31;

pub fn is_valid_start_day(day: u32) -> bool {
    (MIN_START_DAY..=MAX_START_DAY).contains(&day)
}

/// Period containing `reference`. Falls back to the calendar month when
/// `start_day` is missing or outside 1..=31.
pub fn compute_period(reference: NaiveDate, start_day: Option<u32>) -> BillingPeriod {
    match start_day.filter(|d| is_valid_start_day(*d)) {
        Some(day) => custom_period(reference, day).unwrap_or_else(|| calendar_month(reference)),
        None => calendar_month(reference),
    }
}

/// Upper bound on how far `periods_back` walks.
pub const MAX_PERIODS_BACK: usize = 1200;

/// The `n` most recent periods up to and including the one containing
/// `reference`, newest first. `n` is capped at `MAX_PERIODS_BACK`.
pub fn periods_back(reference: NaiveDate, start_day: Option<u32>, n: usize) -> Vec<BillingPeriod> {
    let n = n.min(MAX_PERIODS_BACK);
    let mut out = Vec::with_capacity(n);
    let mut cur = compute_period(reference, start_day);
    for _ in 0..n {
        out.push(cur);
        let prev = cur.previous(start_day);
        if prev == cur {
            break;
        }
        cur = prev;
    }
    out
}

impl BillingPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn next(&self, start_day: Option<u32>) -> BillingPeriod {
        match self.to.succ_opt() {
            Some(d) => compute_period(d, start_day),
            None => *self,
        }
    }

    pub fn previous(&self, start_day: Option<u32>) -> BillingPeriod {
        match self.from.pred_opt() {
            Some(d) => compute_period(d, start_day),
            None => *self,
        }
    }
}

fn custom_period(reference: NaiveDate, day: u32) -> Option<BillingPeriod> {
    let (y, m) = (reference.year(), reference.month());
    let (sy, sm) = if reference.day() >= day.min(days_in_month(y, m)?) {
        (y, m)
    } else {
        shift_month(y, m, -1)
    };
    let from = anchor(sy, sm, day)?;
    let (ny, nm) = shift_month(sy, sm, 1);
    // clamp against the configured day, not from.day(), or a short month
    // would drag every later period earlier
    let to = anchor(ny, nm, day)?.pred_opt()?;
    Some(BillingPeriod { from, to })
}

fn calendar_month(reference: NaiveDate) -> BillingPeriod {
    let (y, m) = (reference.year(), reference.month());
    let from = NaiveDate::from_ymd_opt(y, m, 1);
    let to = days_in_month(y, m).and_then(|last| NaiveDate::from_ymd_opt(y, m, last));
    match (from, to) {
        (Some(from), Some(to)) => BillingPeriod { from, to },
        _ => BillingPeriod {
            from: reference,
            to: reference,
        },
    }
}

fn anchor(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last))
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (ny, nm) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(ny, nm, 1)?
        .pred_opt()
        .map(|d| d.day())
}

fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let idx = year * 12 + month as i32 - 1 + delta;
    (idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1)
}
