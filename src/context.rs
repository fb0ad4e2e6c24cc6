// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cache::SummaryCache;
use crate::models::BillingPeriod;
use crate::notify::{ChangeEvent, ChangeFeed, ChangeKind, ChangeListener};
use crate::period::compute_period;
use crate::utils::{get_household, get_period_start_day, parse_date};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;

/// Everything a command needs to know about who is asking and when. Built
/// once per invocation and handed down by reference.
pub struct Session {
    pub household: String,
    pub period_start_day: Option<u32>,
    pub today: NaiveDate,
    feed: ChangeFeed,
}

impl Session {
    /// Session with the summary cache already listening for changes.
    pub fn new(household: &str, period_start_day: Option<u32>, today: NaiveDate) -> Self {
        let mut feed = ChangeFeed::new();
        feed.subscribe(Box::new(SummaryCache));
        Session {
            household: household.to_string(),
            period_start_day,
            today,
            feed,
        }
    }

    pub fn load(conn: &Connection, today: NaiveDate) -> Result<Self> {
        let household = get_household(conn)?;
        let start_day = get_period_start_day(conn)?;
        info!(%household, ?start_day, %today, "session loaded");
        Ok(Self::new(&household, start_day, today))
    }

    pub fn subscribe(&mut self, listener: Box<dyn ChangeListener>) {
        self.feed.subscribe(listener);
    }

    pub fn current_period(&self) -> BillingPeriod {
        self.period_for(self.today)
    }

    pub fn period_for(&self, date: NaiveDate) -> BillingPeriod {
        compute_period(date, self.period_start_day)
    }

    /// Period named on the command line: `current`, a date inside it, or
    /// nothing at all (the current period).
    pub fn resolve_period(&self, arg: Option<&str>) -> Result<BillingPeriod> {
        match arg.map(str::trim) {
            None | Some("current") => Ok(self.current_period()),
            Some(d) => Ok(self.period_for(parse_date(d)?)),
        }
    }

    /// Tell listeners that this household's `kind` records changed.
    pub fn notify(&self, conn: &Connection, kind: ChangeKind) -> Result<()> {
        self.feed
            .publish(conn, &ChangeEvent::new(&self.household, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Count(std::rc::Rc<std::cell::Cell<usize>>);

    impl ChangeListener for Count {
        fn on_change(&self, _conn: &Connection, event: &ChangeEvent) -> Result<()> {
            assert_eq!(event.household, "home");
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn notify_reaches_extra_listeners() {
        let conn = crate::db::open_in_memory().unwrap();
        let hits = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut s = Session::new("home", None, day(2025, 6, 1));
        s.subscribe(Box::new(Count(hits.clone())));
        s.notify(&conn, ChangeKind::Transactions).unwrap();
        s.notify(&conn, ChangeKind::Budgets).unwrap();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn resolves_named_periods() {
        let s = Session::new("home", Some(25), day(2025, 6, 30));
        let current = s.resolve_period(None).unwrap();
        assert_eq!(current.from, day(2025, 6, 25));
        assert_eq!(current.to, day(2025, 7, 24));
        assert_eq!(s.resolve_period(Some("current")).unwrap(), current);
        let earlier = s.resolve_period(Some("2025-06-10")).unwrap();
        assert_eq!(earlier.from, day(2025, 5, 25));
        assert!(s.resolve_period(Some("June")).is_err());
    }
}
