// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::Session;
use crate::currency::format_currency;
use crate::models::{BillingPeriod, CategoryKind};
use crate::notify::ChangeKind;
use crate::store::{
    TxFilter, delete_category, insert_category, load_categories, load_transactions,
    set_category_parent,
};
use crate::summary::aggregate_by_category;
use crate::tree::{ordered, rollup};
use crate::utils::{id_for_category, maybe_print_json, pretty_table, required};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            let kind: CategoryKind = required(sub, "kind")?.parse()?;
            let parent_id = sub
                .get_one::<String>("parent")
                .map(|p| id_for_category(conn, p))
                .transpose()?;
            insert_category(conn, name, kind, parent_id)?;
            session.notify(conn, ChangeKind::Categories)?;
            println!("Added {} category '{}'", kind, name.trim());
        }
        Some(("move", sub)) => {
            let name = required(sub, "name")?;
            let id = id_for_category(conn, name)?;
            let parent = sub.get_one::<String>("parent");
            let parent_id = parent.map(|p| id_for_category(conn, p)).transpose()?;
            set_category_parent(conn, id, parent_id)?;
            session.notify(conn, ChangeKind::Categories)?;
            match parent {
                Some(p) => println!("Moved '{}' under '{}'", name.trim(), p.trim()),
                None => println!("Moved '{}' to the top level", name.trim()),
            }
        }
        Some(("list", sub)) => {
            let period = session.resolve_period(sub.get_one::<String>("date").map(String::as_str))?;
            let rows = tree_rows(conn, &period)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
                let data = rows
                    .iter()
                    .map(|r| {
                        vec![
                            format!("{}{}", "  ".repeat(r.depth), r.name),
                            r.kind.to_string(),
                            format_currency(Some(r.own_total)),
                            format_currency(Some(r.total)),
                        ]
                    })
                    .collect();
                println!("Period {} .. {}", period.from, period.to);
                println!(
                    "{}",
                    pretty_table(&["Category", "Kind", "Own", "Incl. subcategories"], data)
                );
            }
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?.trim();
            delete_category(conn, id_for_category(conn, name)?)
                .with_context(|| format!("Remove category '{}'", name))?;
            session.notify(conn, ChangeKind::Categories)?;
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub kind: CategoryKind,
    pub parent: Option<String>,
    pub depth: usize,
    pub own_total: Decimal,
    pub total: Decimal,
}

/// The category tree in display order with period totals, own and rolled up.
pub fn tree_rows(conn: &Connection, period: &BillingPeriod) -> Result<Vec<CategoryRow>> {
    let tree = load_categories(conn)?;
    let txs = load_transactions(
        conn,
        &TxFilter {
            period: Some(*period),
            ..Default::default()
        },
    )?;
    let own = aggregate_by_category(&txs);
    let totals = rollup(&tree, &own);
    Ok(ordered(&tree)
        .into_iter()
        .map(|(depth, c)| CategoryRow {
            name: c.name.clone(),
            kind: c.kind,
            parent: c
                .parent_id
                .and_then(|p| tree.get(&p))
                .map(|p| p.name.clone()),
            depth,
            own_total: own.get(&Some(c.id)).copied().unwrap_or_default(),
            total: totals.get(&c.id).copied().unwrap_or_default(),
        })
        .collect())
}
