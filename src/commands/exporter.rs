// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::{filter_from_args, named_rows};
use crate::context::Session;
use crate::currency::format_currency;
use crate::utils::required;
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use serde_json::json;
use tracing::info;

/// Column layout shared with the importer.
pub const CSV_HEADER: [&str; 8] = [
    "date",
    "kind",
    "amount",
    "amount_display",
    "account",
    "to_account",
    "category",
    "note",
];

pub fn handle(conn: &Connection, session: &Session, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, session, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    let filter = filter_from_args(conn, session, sub)?;
    let mut rows = named_rows(conn, &filter)?;
    // oldest first in files
    rows.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record(CSV_HEADER)?;
            for r in &rows {
                wtr.write_record([
                    r.date.clone(),
                    r.kind.to_string(),
                    r.amount.to_string(),
                    format_currency(Some(r.amount)),
                    r.account.clone(),
                    r.to_account.clone().unwrap_or_default(),
                    r.category.clone().unwrap_or_default(),
                    r.note.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|r| {
                    json!({
                        "date": r.date,
                        "kind": r.kind,
                        "amount": r.amount,
                        "amount_display": format_currency(Some(r.amount)),
                        "account": r.account,
                        "to_account": r.to_account,
                        "category": r.category,
                        "note": r.note,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Write {}", out))?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    info!(count = rows.len(), path = out, "export finished");
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
