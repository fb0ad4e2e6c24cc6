// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::Session;
use crate::currency::format_currency;
use crate::models::{BillingPeriod, Budget, Transaction};
use crate::notify::ChangeKind;
use crate::period::compute_period;
use crate::store::{TxFilter, load_budgets, load_categories, load_transactions, upsert_budget};
use crate::tree::{CategoryTree, descendants};
use crate::utils::{id_for_category, maybe_print_json, parse_amount, parse_date, pretty_table, required};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, session, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => status(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let cat = required(sub, "category")?;
    let amount = parse_amount(required(sub, "amount")?)?;
    let period = match sub.get_one::<String>("period-start") {
        Some(d) => session.period_for(parse_date(d)?),
        None => session.current_period(),
    };
    let rollover = sub.get_flag("rollover");
    let cat_id = id_for_category(conn, cat)?;
    upsert_budget(conn, period.from, cat_id, amount, rollover)?;
    session.notify(conn, ChangeKind::Budgets)?;
    println!(
        "Budget set for {} .. {} / {} = {}{}",
        period.from,
        period.to,
        cat.trim(),
        format_currency(Some(amount)),
        if rollover { " (rollover)" } else { "" }
    );
    Ok(())
}

#[derive(Serialize)]
struct BudgetListRow {
    period_start: NaiveDate,
    category: String,
    amount: Decimal,
    rollover: bool,
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let tree = load_categories(conn)?;
    let mut data: Vec<BudgetListRow> = load_budgets(conn)?
        .into_iter()
        .map(|b| BudgetListRow {
            period_start: b.period_start,
            category: category_name(&tree, b.category_id),
            amount: b.amount,
            rollover: b.rollover,
        })
        .collect();
    data.sort_by(|a, b| {
        b.period_start
            .cmp(&a.period_start)
            .then_with(|| a.category.cmp(&b.category))
    });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.period_start.to_string(),
                    r.category.clone(),
                    format_currency(Some(r.amount)),
                    if r.rollover { "yes".into() } else { "no".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Period start", "Category", "Budget", "Rollover"], rows)
        );
    }
    Ok(())
}

fn category_name(tree: &CategoryTree, id: i64) -> String {
    tree.get(&id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| format!("#{}", id))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub category: String,
    pub budget: Decimal,
    pub carryover: Decimal,
    pub spent: Decimal,
    pub available: Decimal,
    pub rollover: bool,
}

fn spent_between(
    txs: &[Transaction],
    ids: &[i64],
    from: NaiveDate,
    to: NaiveDate,
) -> Decimal {
    txs.iter()
        .filter(|t| t.date >= from && t.date <= to)
        .filter(|t| t.category_id.is_some_and(|c| ids.contains(&c)))
        .map(|t| t.amount)
        .sum()
}

/// Budget position of every category budgeted in `period`.
///
/// A budget belongs to the period containing its `period_start`, so budgets
/// stay attached to the right period after the start day changes. Spending
/// counts the category and all of its descendants. Rollover budgets also
/// carry forward whatever earlier budgets of the same category left unspent
/// (or overspent) since the first one was set.
pub fn budget_status(
    budgets: &[Budget],
    tree: &CategoryTree,
    txs: &[Transaction],
    period: &BillingPeriod,
    start_day: Option<u32>,
) -> Vec<BudgetStatus> {
    // rows set under an older start day can share a period; one line per category
    let mut current: BTreeMap<i64, (Decimal, bool)> = BTreeMap::new();
    for b in budgets.iter().filter(|b| period.contains(b.period_start)) {
        let entry = current.entry(b.category_id).or_insert((Decimal::ZERO, false));
        entry.0 += b.amount;
        entry.1 |= b.rollover;
    }
    let mut out: Vec<BudgetStatus> = current
        .into_iter()
        .map(|(category_id, (amount, rollover))| {
            let ids = descendants(category_id, tree);
            let spent = spent_between(txs, &ids, period.from, period.to);
            let carryover = if rollover {
                let earlier: Vec<&Budget> = budgets
                    .iter()
                    .filter(|e| e.category_id == category_id && e.period_start < period.from)
                    .collect();
                match earlier.iter().map(|e| e.period_start).min() {
                    Some(first) => {
                        let since = compute_period(first, start_day).from;
                        let until = period.from.pred_opt().unwrap_or(period.from);
                        let budgeted: Decimal = earlier.iter().map(|e| e.amount).sum();
                        budgeted - spent_between(txs, &ids, since, until)
                    }
                    None => Decimal::ZERO,
                }
            } else {
                Decimal::ZERO
            };
            BudgetStatus {
                category: category_name(tree, category_id),
                budget: amount,
                carryover,
                spent,
                available: amount + carryover - spent,
                rollover,
            }
        })
        .collect();
    out.sort_by(|a, b| a.category.cmp(&b.category));
    out
}

fn status(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let period = session.resolve_period(sub.get_one::<String>("date").map(String::as_str))?;
    let budgets = load_budgets(conn)?;
    let tree = load_categories(conn)?;
    let txs = load_transactions(
        conn,
        &TxFilter {
            period: Some(BillingPeriod {
                from: budgets
                    .iter()
                    .map(|b| session.period_for(b.period_start).from)
                    .min()
                    .map_or(period.from, |d| d.min(period.from)),
                to: period.to,
            }),
            ..Default::default()
        },
    )?;
    debug!(budgets = budgets.len(), txs = txs.len(), "computing budget status");
    let data = budget_status(&budgets, &tree, &txs, &period, session.period_start_day);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.category.clone(),
                    format_currency(Some(r.budget)),
                    format_currency(Some(r.carryover)),
                    format_currency(Some(r.spent)),
                    format_currency(Some(r.available)),
                ]
            })
            .collect();
        println!("Period {} .. {}", period.from, period.to);
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Carryover", "Spent", "Available"], rows)
        );
    }
    Ok(())
}
