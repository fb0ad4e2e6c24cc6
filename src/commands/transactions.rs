// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::Session;
use crate::currency::format_currency;
use crate::models::{Transaction, TxKind};
use crate::notify::ChangeKind;
use crate::store::{
    TxFilter, delete_transaction, insert_transaction, load_accounts, load_categories,
    load_transaction, load_transactions, replace_transaction,
};
use crate::tree::descendants;
use crate::utils::{
    id_for_account, id_for_category, maybe_print_json, parse_amount, parse_date, pretty_table,
    required,
};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub)?,
        Some(("edit", sub)) => edit(conn, session, sub)?,
        Some(("rm", sub)) => {
            let id = *sub
                .get_one::<i64>("id")
                .ok_or_else(|| anyhow!("Missing required argument --id"))?;
            delete_transaction(conn, id)?;
            session.notify(conn, ChangeKind::Transactions)?;
            println!("Removed transaction {}", id);
        }
        Some(("list", sub)) => list(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn optional_id(
    conn: &Connection,
    sub: &clap::ArgMatches,
    name: &str,
    lookup: fn(&Connection, &str) -> Result<i64>,
) -> Result<Option<i64>> {
    sub.get_one::<String>(name)
        .map(|v| lookup(conn, v))
        .transpose()
}

fn add(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let t = Transaction {
        id: 0,
        kind: required(sub, "kind")?.parse()?,
        date: parse_date(required(sub, "date")?)?,
        amount: parse_amount(required(sub, "amount")?)?,
        account_id: id_for_account(conn, required(sub, "account")?)?,
        to_account_id: optional_id(conn, sub, "to-account", id_for_account)?,
        category_id: optional_id(conn, sub, "category", id_for_category)?,
        note: sub.get_one::<String>("note").cloned(),
    };
    let id = insert_transaction(conn, &t).context("Rejected transaction")?;
    session.notify(conn, ChangeKind::Transactions)?;
    println!(
        "Recorded {} #{} of {} on {}",
        t.kind,
        id,
        format_currency(Some(t.amount)),
        t.date
    );
    Ok(())
}

/// Build the replacement record for an edit. Fields not given keep their old
/// value, except links the new kind cannot carry, which are dropped.
fn edited(conn: &Connection, old: &Transaction, sub: &clap::ArgMatches) -> Result<Transaction> {
    let kind: TxKind = match sub.get_one::<String>("kind") {
        Some(k) => k.parse()?,
        None => old.kind,
    };
    let mut to_account_id = optional_id(conn, sub, "to-account", id_for_account)?;
    let mut category_id = optional_id(conn, sub, "category", id_for_category)?;
    if kind == TxKind::Transfer {
        to_account_id = to_account_id.or(old.to_account_id);
    } else {
        category_id = category_id.or(old.category_id);
    }
    let note = if sub.get_flag("clear-note") {
        None
    } else {
        sub.get_one::<String>("note").cloned().or_else(|| old.note.clone())
    };
    Ok(Transaction {
        id: old.id,
        kind,
        date: match sub.get_one::<String>("date") {
            Some(d) => parse_date(d)?,
            None => old.date,
        },
        amount: match sub.get_one::<String>("amount") {
            Some(a) => parse_amount(a)?,
            None => old.amount,
        },
        account_id: match sub.get_one::<String>("account") {
            Some(a) => id_for_account(conn, a)?,
            None => old.account_id,
        },
        to_account_id,
        category_id,
        note,
    })
}

fn edit(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow!("Missing required argument --id"))?;
    let old = load_transaction(conn, id)?.ok_or_else(|| anyhow!("Transaction {} not found", id))?;
    let new = edited(conn, &old, sub)?;
    if new == old {
        println!("Transaction {} unchanged", id);
        return Ok(());
    }
    replace_transaction(conn, &new).context("Rejected edit")?;
    session.notify(conn, ChangeKind::Transactions)?;
    println!("Updated transaction {}", id);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: TxKind,
    pub amount: Decimal,
    pub account: String,
    pub to_account: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
}

/// Transactions joined with account and category names, newest first.
pub fn named_rows(conn: &Connection, filter: &TxFilter) -> Result<Vec<TransactionRow>> {
    let accounts: HashMap<i64, String> = load_accounts(conn)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let categories = load_categories(conn)?;
    let account_name = |id: i64| accounts.get(&id).cloned().unwrap_or_else(|| format!("#{}", id));
    Ok(load_transactions(conn, filter)?
        .into_iter()
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            kind: t.kind,
            amount: t.amount,
            account: account_name(t.account_id),
            to_account: t.to_account_id.map(account_name),
            category: t
                .category_id
                .and_then(|c| categories.get(&c))
                .map(|c| c.name.clone()),
            note: t.note,
        })
        .collect())
}

/// Filter from the `tx list` / `export` flags. A category also matches
/// everything filed under its subcategories.
pub fn filter_from_args(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
) -> Result<TxFilter> {
    let period = sub
        .get_one::<String>("period")
        .map(|p| session.resolve_period(Some(p)))
        .transpose()?;
    let account_id = sub
        .try_get_one::<String>("account")
        .ok()
        .flatten()
        .map(|a| id_for_account(conn, a))
        .transpose()?;
    let category_ids = match sub.try_get_one::<String>("category").ok().flatten() {
        Some(c) => {
            let root = id_for_category(conn, c)?;
            Some(descendants(root, &load_categories(conn)?))
        }
        None => None,
    };
    let kind = sub
        .try_get_one::<String>("kind")
        .ok()
        .flatten()
        .map(|k| k.parse::<TxKind>())
        .transpose()?;
    let limit = sub.try_get_one::<usize>("limit").ok().flatten().copied();
    Ok(TxFilter {
        period,
        account_id,
        category_ids,
        kind,
        limit,
    })
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let filter = filter_from_args(conn, session, sub)?;
    let data = named_rows(conn, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                let target = match (&r.to_account, &r.category) {
                    (Some(to), _) => format!("-> {}", to),
                    (None, Some(c)) => c.clone(),
                    (None, None) => String::new(),
                };
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.to_string(),
                    format_currency(Some(r.amount)),
                    r.account.clone(),
                    target,
                    r.note.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Kind", "Amount", "Account", "Category / To", "Note"],
                rows,
            )
        );
    }
    Ok(())
}
