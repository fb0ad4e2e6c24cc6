// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::context::Session;
use crate::currency::format_currency;
use crate::notify::ChangeKind;
use crate::store::{TxFilter, insert_account, load_accounts, load_transactions};
use crate::summary::account_balance;
use crate::utils::{maybe_print_json, parse_signed_amount, pretty_table, required};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Serialize)]
pub struct BalanceRow {
    pub account: String,
    pub initial_balance: Decimal,
    pub balance: Decimal,
}

/// Every account with its derived balance, ordered by name.
pub fn balances(conn: &Connection) -> Result<Vec<BalanceRow>> {
    let txs = load_transactions(conn, &TxFilter::default())?;
    Ok(load_accounts(conn)?
        .into_iter()
        .map(|a| BalanceRow {
            balance: account_balance(&a, &txs),
            initial_balance: a.initial_balance,
            account: a.name,
        })
        .collect())
}

pub fn print_balances(rows: &[BalanceRow], json: bool, jsonl: bool) -> Result<()> {
    if !maybe_print_json(json, jsonl, &rows)? {
        let data = rows
            .iter()
            .map(|r| {
                vec![
                    r.account.clone(),
                    format_currency(Some(r.initial_balance)),
                    format_currency(Some(r.balance)),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Account", "Opening", "Balance"], data));
    }
    Ok(())
}

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            let initial = parse_signed_amount(required(sub, "initial")?)?;
            insert_account(conn, name, initial)?;
            session.notify(conn, ChangeKind::Accounts)?;
            println!(
                "Added account '{}' (opening {})",
                name.trim(),
                format_currency(Some(initial))
            );
        }
        Some(("list", sub)) => {
            print_balances(&balances(conn)?, sub.get_flag("json"), sub.get_flag("jsonl"))?;
        }
        Some(("rm", sub)) => {
            let name = required(sub, "name")?.trim();
            let n = conn.execute("DELETE FROM accounts WHERE name=?1", params![name])?;
            if n == 0 {
                return Err(anyhow!("Account '{}' not found", name));
            }
            session.notify(conn, ChangeKind::Accounts)?;
            println!("Removed account '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
