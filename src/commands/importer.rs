// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::Session;
use crate::models::{Transaction, TxKind};
use crate::notify::ChangeKind;
use crate::store::insert_transaction;
use crate::utils::{id_for_account, id_for_category, parse_date, required};
use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, StringRecord};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::{HashMap, hash_map::Entry};
use tracing::info;

pub fn handle(conn: &mut Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let path = required(sub, "path")?.trim();
            let n = import_transactions(conn, path)?;
            session.notify(conn, ChangeKind::Transactions)?;
            println!("Imported {} transactions from {}", n, path);
            Ok(())
        }
        _ => Ok(()),
    }
}

struct Columns {
    date: usize,
    kind: usize,
    amount: usize,
    account: usize,
    to_account: Option<usize>,
    category: Option<usize>,
    note: Option<usize>,
}

impl Columns {
    fn from_headers(h: &StringRecord) -> Result<Self> {
        let find = |name: &str| h.iter().position(|c| c.trim().eq_ignore_ascii_case(name));
        let need = |name: &str| find(name).ok_or_else(|| anyhow!("CSV is missing a '{}' column", name));
        Ok(Columns {
            date: need("date")?,
            kind: need("kind")?,
            amount: need("amount")?,
            account: need("account")?,
            to_account: find("to_account"),
            category: find("category"),
            note: find("note"),
        })
    }
}

fn cell(rec: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| rec.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// The `amount` column holds plain decimals as written by the exporter;
/// `.` is always the decimal point here, never a thousands separator.
fn parse_amount_column(raw: &str) -> Result<Decimal> {
    let d = raw
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}'", raw))?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(anyhow!("Amount '{}' must not be negative", raw));
    }
    Ok(d)
}

fn cached(
    cache: &mut HashMap<String, i64>,
    conn: &Connection,
    name: &str,
    lookup: fn(&Connection, &str) -> Result<i64>,
) -> Result<i64> {
    match cache.entry(name.to_string()) {
        Entry::Occupied(e) => Ok(*e.get()),
        Entry::Vacant(e) => Ok(*e.insert(lookup(conn, name)?)),
    }
}

/// Import every row of the CSV at `path` or none of them. Returns the number
/// of rows written. The `amount_display` column is ignored.
pub fn import_transactions(conn: &mut Connection, path: &str) -> Result<usize> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;
    let cols = Columns::from_headers(rdr.headers()?)?;

    let tx = conn.transaction()?;
    let mut accounts: HashMap<String, i64> = HashMap::new();
    let mut categories: HashMap<String, i64> = HashMap::new();
    let mut n = 0;

    for (i, result) in rdr.records().enumerate() {
        // header is line 1
        let line = i + 2;
        let rec = result.with_context(|| format!("Read line {}", line))?;
        let field = |idx: usize, name: &str| {
            cell(&rec, Some(idx)).ok_or_else(|| anyhow!("Line {}: {} missing", line, name))
        };
        let kind: TxKind = field(cols.kind, "kind")?
            .parse()
            .with_context(|| format!("Line {}", line))?;
        let date = parse_date(field(cols.date, "date")?).with_context(|| format!("Line {}", line))?;
        let amount = parse_amount_column(field(cols.amount, "amount")?)
            .with_context(|| format!("Line {}", line))?;
        let account_id = cached(&mut accounts, &tx, field(cols.account, "account")?, id_for_account)
            .with_context(|| format!("Line {}", line))?;
        let to_account_id = cell(&rec, cols.to_account)
            .map(|a| cached(&mut accounts, &tx, a, id_for_account))
            .transpose()
            .with_context(|| format!("Line {}", line))?;
        let category_id = cell(&rec, cols.category)
            .map(|c| cached(&mut categories, &tx, c, id_for_category))
            .transpose()
            .with_context(|| format!("Line {}", line))?;

        let t = Transaction {
            id: 0,
            kind,
            date,
            amount,
            category_id,
            account_id,
            to_account_id,
            note: cell(&rec, cols.note).map(str::to_string),
        };
        insert_transaction(&tx, &t).with_context(|| format!("Line {} rejected", line))?;
        n += 1;
    }
    tx.commit()?;
    info!(rows = n, path, "import committed");
    Ok(n)
}
