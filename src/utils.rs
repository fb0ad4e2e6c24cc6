// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::period::{MAX_START_DAY, MIN_START_DAY, is_valid_start_day};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::ArgMatches;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use tracing::warn;

pub const DEFAULT_HOUSEHOLD: &str = "default";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s.trim()))
}

/// Non-negative rupiah amount as typed by a user.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = crate::currency::parse_rupiah(s)?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err(anyhow!("Amount '{}' must not be negative", s.trim()));
    }
    Ok(d)
}

/// Signed amount, used for opening balances that may start overdrawn.
pub fn parse_signed_amount(s: &str) -> Result<Decimal> {
    crate::currency::parse_rupiah(s)
}

/// Value of a string argument clap has already declared required.
pub fn required<'a>(m: &'a ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing required argument --{}", name))
}

pub fn parse_start_day(s: &str) -> Result<u32> {
    let d: u32 = s
        .trim()
        .parse()
        .with_context(|| format!("Invalid period start day '{}'", s.trim()))?;
    if !is_valid_start_day(d) {
        return Err(anyhow!(
            "Period start day must be between {} and {} (got {})",
            MIN_START_DAY,
            MAX_START_DAY,
            d
        ));
    }
    Ok(d)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn id_for_account(conn: &Connection, name: &str) -> Result<i64> {
    let name = name.trim();
    let mut stmt = conn.prepare("SELECT id FROM accounts WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Account '{}' not found", name))?;
    Ok(id)
}

pub fn id_for_category(conn: &Connection, name: &str) -> Result<i64> {
    let name = name.trim();
    let mut stmt = conn.prepare("SELECT id FROM categories WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Category '{}' not found", name))?;
    Ok(id)
}

// Household settings
fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_household(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, "household")?.unwrap_or_else(|| DEFAULT_HOUSEHOLD.to_string()))
}

pub fn set_household(conn: &Connection, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Household name must not be empty"));
    }
    set_setting(conn, "household", name)
}

/// Stored start day, or `None` for plain calendar months. An unusable
/// stored value also means calendar months, with a warning.
pub fn get_period_start_day(conn: &Connection) -> Result<Option<u32>> {
    match get_setting(conn, "period_start_day")? {
        Some(v) => match parse_start_day(&v) {
            Ok(day) => Ok(Some(day)),
            Err(e) => {
                warn!(value = %v, error = %e, "ignoring invalid period_start_day");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

pub fn set_period_start_day(conn: &Connection, day: u32) -> Result<()> {
    if !is_valid_start_day(day) {
        return Err(anyhow!("Period start day must be between 1 and 31"));
    }
    set_setting(conn, "period_start_day", &day.to_string())
}

pub fn clear_period_start_day(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key='period_start_day'", [])?;
    Ok(())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // arrays stream one element per line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
