// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! On-change notifications. Writers publish what changed; listeners such as
//! the summary cache decide what to recompute.

use anyhow::Result;
use rusqlite::Connection;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Transactions,
    Accounts,
    Categories,
    Budgets,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub household: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(household: &str, kind: ChangeKind) -> Self {
        ChangeEvent {
            household: household.to_string(),
            kind,
        }
    }
}

pub trait ChangeListener {
    fn on_change(&self, conn: &Connection, event: &ChangeEvent) -> Result<()>;
}

#[derive(Default)]
pub struct ChangeFeed {
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers `event` in subscription order, stopping at the first error.
    pub fn publish(&self, conn: &Connection, event: &ChangeEvent) -> Result<()> {
        debug!(?event, listeners = self.listeners.len(), "publishing change");
        for l in &self.listeners {
            l.on_change(conn, event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        tag: &'static str,
        seen: Rc<RefCell<Vec<(&'static str, ChangeKind)>>>,
        fail: bool,
    }

    impl ChangeListener for Recorder {
        fn on_change(&self, _conn: &Connection, event: &ChangeEvent) -> Result<()> {
            self.seen.borrow_mut().push((self.tag, event.kind));
            if self.fail {
                anyhow::bail!("listener {} failed", self.tag);
            }
            Ok(())
        }
    }

    #[test]
    fn delivers_in_order_and_stops_on_error() {
        let conn = Connection::open_in_memory().unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut feed = ChangeFeed::new();
        for (tag, fail) in [("a", false), ("b", true), ("c", false)] {
            feed.subscribe(Box::new(Recorder {
                tag,
                seen: Rc::clone(&seen),
                fail,
            }));
        }
        assert_eq!(feed.len(), 3);

        let err = feed
            .publish(&conn, &ChangeEvent::new("home", ChangeKind::Budgets))
            .unwrap_err();
        assert!(err.to_string().contains("listener b failed"));
        assert_eq!(
            *seen.borrow(),
            vec![("a", ChangeKind::Budgets), ("b", ChangeKind::Budgets)]
        );
    }

    #[test]
    fn empty_feed_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        let feed = ChangeFeed::new();
        assert!(feed.is_empty());
        feed.publish(&conn, &ChangeEvent::new("home", ChangeKind::Accounts))
            .unwrap();
    }
}
