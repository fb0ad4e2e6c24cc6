// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TxKind;
use crate::store::{TxFilter, load_categories, load_transactions};
use crate::tree::find_cycles;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub issue: &'static str,
    pub detail: String,
}

/// Scan stored rows for anything the write path would have rejected.
pub fn diagnose(conn: &Connection) -> Result<Vec<Issue>> {
    let mut out = Vec::new();
    let tree = load_categories(conn)?;

    for id in find_cycles(&tree) {
        out.push(Issue {
            issue: "category_cycle",
            detail: tree[&id].name.clone(),
        });
    }
    for c in tree.values() {
        let parent = c.parent_id.and_then(|p| tree.get(&p));
        if let Some(p) = parent.filter(|p| p.kind != c.kind) {
            out.push(Issue {
                issue: "parent_kind_mismatch",
                detail: format!("{} ({}) under {} ({})", c.name, c.kind, p.name, p.kind),
            });
        }
    }

    for t in load_transactions(conn, &TxFilter::default())? {
        match t.kind {
            TxKind::Transfer => {
                if t.to_account_id.is_none() {
                    out.push(Issue {
                        issue: "transfer_without_destination",
                        detail: format!("#{} on {}", t.id, t.date),
                    });
                } else if t.to_account_id == Some(t.account_id) {
                    out.push(Issue {
                        issue: "transfer_same_account",
                        detail: format!("#{} on {}", t.id, t.date),
                    });
                }
            }
            TxKind::Income | TxKind::Expense => match t.category_id.and_then(|c| tree.get(&c)) {
                None => out.push(Issue {
                    issue: "missing_category",
                    detail: format!("#{} {} on {}", t.id, t.kind, t.date),
                }),
                Some(c) if !c.kind.accepts(t.kind) => out.push(Issue {
                    issue: "kind_mismatch",
                    detail: format!("#{} {} filed under {} ({})", t.id, t.kind, c.name, c.kind),
                }),
                Some(_) => {}
            },
        }
    }
    if !out.is_empty() {
        warn!(issues = out.len(), "doctor found problems");
    }
    Ok(out)
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let issues = diagnose(conn)?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &issues)? {
        return Ok(());
    }
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.issue.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
