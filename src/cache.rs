// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Cached period summaries, stored per household in `summary_cache`.

use crate::models::{BillingPeriod, SummaryAggregate};
use crate::notify::{ChangeEvent, ChangeKind, ChangeListener};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, instrument, warn};

/// Stable key for the summary of `from..=to`. ISO dates keep it readable
/// and make distinct ranges map to distinct keys.
pub fn cache_key(from: NaiveDate, to: NaiveDate) -> String {
    format!("summary:{}..{}", from, to)
}

pub fn period_key(period: &BillingPeriod) -> String {
    cache_key(period.from, period.to)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SummaryCache;

impl SummaryCache {
    pub fn get(
        &self,
        conn: &Connection,
        household: &str,
        period: &BillingPeriod,
    ) -> Result<Option<SummaryAggregate>> {
        let key = period_key(period);
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM summary_cache WHERE household=?1 AND cache_key=?2",
                params![household, &key],
                |r| r.get(0),
            )
            .optional()?;
        match payload {
            Some(p) => match serde_json::from_str(&p) {
                Ok(s) => Ok(Some(s)),
                Err(e) => {
                    warn!(household, key = %key, error = %e, "dropping unreadable cached summary");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub fn put(
        &self,
        conn: &Connection,
        household: &str,
        period: &BillingPeriod,
        summary: &SummaryAggregate,
    ) -> Result<()> {
        let payload = serde_json::to_string(summary)?;
        conn.execute(
            "INSERT INTO summary_cache(household, cache_key, payload) VALUES (?1,?2,?3)
             ON CONFLICT(household, cache_key) DO UPDATE SET payload=excluded.payload,
                created_at=datetime('now')",
            params![household, period_key(period), payload],
        )?;
        Ok(())
    }

    #[instrument(skip(self, conn, compute), fields(key = %period_key(period)))]
    pub fn get_or_compute<F>(
        &self,
        conn: &Connection,
        household: &str,
        period: &BillingPeriod,
        compute: F,
    ) -> Result<SummaryAggregate>
    where
        F: FnOnce() -> Result<SummaryAggregate>,
    {
        if let Some(hit) = self.get(conn, household, period)? {
            debug!("summary cache hit");
            return Ok(hit);
        }
        debug!("summary cache miss");
        let fresh = compute()?;
        self.put(conn, household, period, &fresh)?;
        Ok(fresh)
    }

    pub fn invalidate_household(&self, conn: &Connection, household: &str) -> Result<usize> {
        let n = conn
            .execute(
                "DELETE FROM summary_cache WHERE household=?1",
                params![household],
            )
            .with_context(|| format!("Invalidate summaries for household '{}'", household))?;
        debug!(household, removed = n, "summary cache invalidated");
        Ok(n)
    }
}

impl ChangeListener for SummaryCache {
    fn on_change(&self, conn: &Connection, event: &ChangeEvent) -> Result<()> {
        match event.kind {
            ChangeKind::Transactions | ChangeKind::Accounts | ChangeKind::Settings => {
                self.invalidate_household(conn, &event.household)?;
            }
            ChangeKind::Categories | ChangeKind::Budgets => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::cell::Cell;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn period() -> BillingPeriod {
        BillingPeriod {
            from: d(2025, 5, 20),
            to: d(2025, 6, 19),
        }
    }

    #[test]
    fn key_is_stable_and_distinguishes_ranges() {
        let a = d(2025, 5, 20);
        let b = d(2025, 6, 19);
        let c = d(2025, 6, 20);
        assert_eq!(cache_key(a, b), cache_key(a, b));
        assert_eq!(cache_key(a, b), "summary:2025-05-20..2025-06-19");
        assert_ne!(cache_key(a, b), cache_key(a, c));
        assert_ne!(cache_key(a, b), cache_key(c, b));
        assert_ne!(cache_key(a, b), cache_key(b, a));
    }

    #[test]
    fn computes_once_then_serves_from_cache() {
        let conn = crate::db::open_in_memory().unwrap();
        let cache = SummaryCache;
        let calls = Cell::new(0);
        let compute = || -> Result<SummaryAggregate> {
            calls.set(calls.get() + 1);
            Ok(SummaryAggregate {
                total_income: Decimal::from(10),
                net_balance: Decimal::from(10),
                count: 1,
                ..Default::default()
            })
        };
        let first = cache.get_or_compute(&conn, "home", &period(), compute).unwrap();
        let second = cache.get_or_compute(&conn, "home", &period(), compute).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.get(&conn, "other", &period()).unwrap(), None);
    }

    #[test]
    fn transaction_changes_drop_only_that_household() {
        let conn = crate::db::open_in_memory().unwrap();
        let cache = SummaryCache;
        let s = SummaryAggregate::default();
        cache.put(&conn, "home", &period(), &s).unwrap();
        cache.put(&conn, "office", &period(), &s).unwrap();

        cache
            .on_change(&conn, &ChangeEvent::new("home", ChangeKind::Budgets))
            .unwrap();
        assert!(cache.get(&conn, "home", &period()).unwrap().is_some());

        cache
            .on_change(&conn, &ChangeEvent::new("home", ChangeKind::Transactions))
            .unwrap();
        assert!(cache.get(&conn, "home", &period()).unwrap().is_none());
        assert!(cache.get(&conn, "office", &period()).unwrap().is_some());
    }

    #[test]
    fn unreadable_payload_is_a_miss() {
        let conn = crate::db::open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO summary_cache(household, cache_key, payload) VALUES ('home', ?1, 'not json')",
            params![period_key(&period())],
        )
        .unwrap();
        assert_eq!(SummaryCache.get(&conn, "home", &period()).unwrap(), None);
    }
}
