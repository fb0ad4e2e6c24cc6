// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cache::SummaryCache;
use crate::commands::accounts::{balances, print_balances};
use crate::context::Session;
use crate::currency::format_currency;
use crate::models::{BillingPeriod, CategoryKind, SummaryAggregate};
use crate::period::{MAX_PERIODS_BACK, periods_back};
use crate::store::{TxFilter, load_categories, load_transactions};
use crate::summary::{aggregate, aggregate_by_category};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, session, sub)?,
        Some(("balances", sub)) => {
            print_balances(&balances(conn)?, sub.get_flag("json"), sub.get_flag("jsonl"))?
        }
        Some(("cashflow", sub)) => cashflow(conn, session, sub)?,
        Some(("by-category", sub)) => by_category(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

/// Summary of `period`, served from the household's cache when present.
pub fn period_summary(
    conn: &Connection,
    session: &Session,
    period: &BillingPeriod,
) -> Result<SummaryAggregate> {
    SummaryCache.get_or_compute(conn, &session.household, period, || {
        let txs = load_transactions(
            conn,
            &TxFilter {
                period: Some(*period),
                ..Default::default()
            },
        )?;
        Ok(aggregate(&txs))
    })
}

#[derive(Serialize)]
struct SummaryReport {
    household: String,
    period: BillingPeriod,
    #[serde(flatten)]
    summary: SummaryAggregate,
}

fn summary(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let period = session.resolve_period(sub.get_one::<String>("date").map(String::as_str))?;
    let s = period_summary(conn, session, &period)
        .with_context(|| format!("Summarise {} .. {}", period.from, period.to))?;
    let report = SummaryReport {
        household: session.household.clone(),
        period,
        summary: s,
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let s = &report.summary;
    let date_or_dash = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());
    let rows = vec![
        vec!["Period".into(), format!("{} .. {}", period.from, period.to)],
        vec!["Income".into(), format_currency(Some(s.total_income))],
        vec!["Expense".into(), format_currency(Some(s.total_expense))],
        vec!["Net".into(), format_currency(Some(s.net_balance))],
        vec!["Transactions".into(), s.count.to_string()],
        vec!["Transfers".into(), s.transfer_count.to_string()],
        vec!["Smallest".into(), format_currency(s.min_amount)],
        vec!["Largest".into(), format_currency(s.max_amount)],
        vec!["First".into(), date_or_dash(s.first_date)],
        vec!["Last".into(), date_or_dash(s.last_date)],
    ];
    println!("{}", pretty_table(&[report.household.as_str(), ""], rows));
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CashflowRow {
    pub from: String,
    pub to: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

/// Income, expense and net for the last `n` billing periods, newest first.
pub fn cashflow_rows(conn: &Connection, session: &Session, n: usize) -> Result<Vec<CashflowRow>> {
    periods_back(session.today, session.period_start_day, n)
        .into_iter()
        .map(|p| {
            let s = period_summary(conn, session, &p)?;
            Ok(CashflowRow {
                from: p.from.to_string(),
                to: p.to.to_string(),
                income: s.total_income,
                expense: s.total_expense,
                net: s.net_balance,
            })
        })
        .collect()
}

fn cashflow(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let n = sub
        .get_one::<u64>("periods")
        .map_or(6, |n| usize::try_from(*n).unwrap_or(MAX_PERIODS_BACK));
    let data = cashflow_rows(conn, session, n)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    format!("{} .. {}", r.from, r.to),
                    format_currency(Some(r.income)),
                    format_currency(Some(r.expense)),
                    format_currency(Some(r.net)),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Period", "Income", "Expense", "Net"], rows)
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub kind: Option<CategoryKind>,
    pub amount: Decimal,
    /// Share of all income or all expense in the period, in percent.
    pub share: Decimal,
}

/// Own totals per category for `period`, largest first within each kind.
pub fn category_shares(conn: &Connection, period: &BillingPeriod) -> Result<Vec<CategoryShare>> {
    let txs = load_transactions(
        conn,
        &TxFilter {
            period: Some(*period),
            ..Default::default()
        },
    )?;
    let tree = load_categories(conn)?;
    let s = aggregate(&txs);
    let mut out: Vec<CategoryShare> = aggregate_by_category(&txs)
        .into_iter()
        .map(|(id, amount)| {
            let cat = id.and_then(|i| tree.get(&i));
            let kind = cat.map(|c| c.kind);
            let whole = match kind {
                Some(CategoryKind::Income) => s.total_income,
                _ => s.total_expense,
            };
            let share = if whole.is_zero() {
                Decimal::ZERO
            } else {
                (amount * Decimal::ONE_HUNDRED / whole).round_dp(1)
            };
            CategoryShare {
                category: cat.map_or_else(|| "(uncategorized)".to_string(), |c| c.name.clone()),
                kind,
                amount,
                share,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        let rank = |k: Option<CategoryKind>| matches!(k, Some(CategoryKind::Income));
        rank(a.kind)
            .cmp(&rank(b.kind))
            .then_with(|| b.amount.cmp(&a.amount))
            .then_with(|| a.category.cmp(&b.category))
    });
    Ok(out)
}

fn by_category(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let period = session.resolve_period(sub.get_one::<String>("date").map(String::as_str))?;
    let data = category_shares(conn, &period)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.category.clone(),
                    r.kind.map_or_else(|| "-".to_string(), |k| k.to_string()),
                    format_currency(Some(r.amount)),
                    format!("{}%", r.share),
                ]
            })
            .collect();
        println!("Period {} .. {}", period.from, period.to);
        println!(
            "{}",
            pretty_table(&["Category", "Kind", "Amount", "Share"], rows)
        );
    }
    Ok(())
}
