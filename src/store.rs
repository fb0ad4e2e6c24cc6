// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed reads and validated writes over the SQLite tables.

use crate::models::{
    Account, BillingPeriod, Budget, Category, CategoryKind, Transaction, TxKind,
};
use crate::tree::CategoryTree;
use crate::validation::{check_parent, check_transaction};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use tracing::{info, instrument};

fn dec(raw: &str, what: &str) -> Result<Decimal> {
    raw.parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}' in {}", raw, what))
}

fn date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid stored date '{}'", raw))
}

pub fn load_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare("SELECT id, name, initial_balance FROM accounts ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, initial) = row?;
        let initial_balance = dec(&initial, "accounts")?;
        out.push(Account {
            id,
            name,
            initial_balance,
        });
    }
    Ok(out)
}

pub fn insert_account(conn: &Connection, name: &str, initial_balance: Decimal) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Account name must not be empty"));
    }
    conn.execute(
        "INSERT INTO accounts(name, initial_balance) VALUES (?1, ?2)",
        params![name, initial_balance.to_string()],
    )
    .with_context(|| format!("Add account '{}'", name))?;
    Ok(conn.last_insert_rowid())
}

fn category_from_row(id: i64, name: String, kind: &str, parent_id: Option<i64>) -> Result<Category> {
    Ok(Category {
        id,
        name,
        kind: kind.parse()?,
        parent_id,
    })
}

pub fn load_categories(conn: &Connection) -> Result<CategoryTree> {
    let mut stmt = conn.prepare("SELECT id, name, kind, parent_id FROM categories")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<i64>>(3)?,
        ))
    })?;
    let mut out = CategoryTree::new();
    for row in rows {
        let (id, name, kind, parent_id) = row?;
        out.insert(id, category_from_row(id, name, &kind, parent_id)?);
    }
    Ok(out)
}

pub fn load_category(conn: &Connection, id: i64) -> Result<Option<Category>> {
    let row = conn
        .query_row(
            "SELECT id, name, kind, parent_id FROM categories WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, Option<i64>>(3)?,
                ))
            },
        )
        .optional()?;
    row.map(|(id, name, kind, parent_id)| category_from_row(id, name, &kind, parent_id))
        .transpose()
}

/// Insert a category, validating the parent link against the current tree.
#[instrument(skip(conn))]
pub fn insert_category(
    conn: &Connection,
    name: &str,
    kind: CategoryKind,
    parent_id: Option<i64>,
) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Category name must not be empty"));
    }
    if let Some(pid) = parent_id {
        let tree = load_categories(conn)?;
        let parent = tree
            .get(&pid)
            .ok_or_else(|| anyhow!("Parent category {} not found", pid))?;
        // id 0 never collides with an AUTOINCREMENT row
        let candidate = Category {
            id: 0,
            name: name.to_string(),
            kind,
            parent_id,
        };
        check_parent(&candidate, parent, &tree)?;
    }
    conn.execute(
        "INSERT INTO categories(name, kind, parent_id) VALUES (?1, ?2, ?3)",
        params![name, kind.as_str(), parent_id],
    )
    .with_context(|| format!("Add category '{}'", name))?;
    let id = conn.last_insert_rowid();
    info!(id, "category added");
    Ok(id)
}

/// Re-parent an existing category, refusing links that would loop.
pub fn set_category_parent(conn: &Connection, id: i64, parent_id: Option<i64>) -> Result<()> {
    let tree = load_categories(conn)?;
    let child = tree
        .get(&id)
        .ok_or_else(|| anyhow!("Category {} not found", id))?;
    if let Some(pid) = parent_id {
        let parent = tree
            .get(&pid)
            .ok_or_else(|| anyhow!("Parent category {} not found", pid))?;
        check_parent(child, parent, &tree)?;
    }
    conn.execute(
        "UPDATE categories SET parent_id=?1 WHERE id=?2",
        params![parent_id, id],
    )?;
    Ok(())
}

/// Remove a category. Refused while income or expense rows still point at
/// it; subcategories move to the top level.
pub fn delete_category(conn: &Connection, id: i64) -> Result<()> {
    let used: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE category_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if used > 0 {
        return Err(anyhow!(
            "Category {} is used by {} transaction(s); move them to another category first",
            id,
            used
        ));
    }
    let n = conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(anyhow!("Category {} not found", id));
    }
    info!(id, "category removed");
    Ok(())
}

/// Filters for `load_transactions`; `None` means "any".
#[derive(Debug, Default, Clone)]
pub struct TxFilter {
    pub period: Option<BillingPeriod>,
    pub account_id: Option<i64>,
    pub category_ids: Option<Vec<i64>>,
    pub kind: Option<TxKind>,
    pub limit: Option<usize>,
}

pub fn load_transactions(conn: &Connection, filter: &TxFilter) -> Result<Vec<Transaction>> {
    let mut sql = String::from(
        "SELECT id, kind, date, amount, category_id, account_id, to_account_id, note
         FROM transactions WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(p) = &filter.period {
        sql.push_str(" AND date>=? AND date<=?");
        params_vec.push(p.from.to_string());
        params_vec.push(p.to.to_string());
    }
    if let Some(acct) = filter.account_id {
        sql.push_str(" AND (account_id=? OR to_account_id=?)");
        params_vec.push(acct.to_string());
        params_vec.push(acct.to_string());
    }
    if let Some(ids) = &filter.category_ids {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sql.push_str(" AND category_id IN (");
        sql.push_str(&vec!["?"; ids.len()].join(","));
        sql.push(')');
        params_vec.extend(ids.iter().map(|i| i.to_string()));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND kind=?");
        params_vec.push(kind.as_str().to_string());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        out.push(tx_from_row(r)?);
    }
    Ok(out)
}

fn tx_from_row(r: &rusqlite::Row<'_>) -> Result<Transaction> {
    let kind: String = r.get(1)?;
    let d: String = r.get(2)?;
    let amount: String = r.get(3)?;
    Ok(Transaction {
        id: r.get(0)?,
        kind: kind.parse()?,
        date: date(&d)?,
        amount: dec(&amount, "transactions")?,
        category_id: r.get(4)?,
        account_id: r.get(5)?,
        to_account_id: r.get(6)?,
        note: r.get(7)?,
    })
}

pub fn load_transaction(conn: &Connection, id: i64) -> Result<Option<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, date, amount, category_id, account_id, to_account_id, note
         FROM transactions WHERE id=?1",
    )?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(r) => Ok(Some(tx_from_row(r)?)),
        None => Ok(None),
    }
}

fn validate(conn: &Connection, t: &Transaction) -> Result<()> {
    let category = match t.category_id {
        Some(id) => Some(
            load_category(conn, id)?.ok_or_else(|| anyhow!("Category {} not found", id))?,
        ),
        None => None,
    };
    check_transaction(t, category.as_ref())?;
    Ok(())
}

/// Validate and insert `t` (its `id` is ignored). Returns the new row id.
#[instrument(skip(conn, t), fields(kind = %t.kind, amount = %t.amount))]
pub fn insert_transaction(conn: &Connection, t: &Transaction) -> Result<i64> {
    validate(conn, t)?;
    conn.execute(
        "INSERT INTO transactions(kind, date, amount, category_id, account_id, to_account_id, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            t.kind.as_str(),
            t.date.to_string(),
            t.amount.to_string(),
            t.category_id,
            t.account_id,
            t.to_account_id,
            t.note
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!(id, "transaction recorded");
    Ok(id)
}

/// Replace the full record stored under `t.id`.
#[instrument(skip(conn, t), fields(id = t.id))]
pub fn replace_transaction(conn: &Connection, t: &Transaction) -> Result<()> {
    validate(conn, t)?;
    let n = conn.execute(
        "UPDATE transactions SET kind=?1, date=?2, amount=?3, category_id=?4, account_id=?5,
            to_account_id=?6, note=?7
         WHERE id=?8",
        params![
            t.kind.as_str(),
            t.date.to_string(),
            t.amount.to_string(),
            t.category_id,
            t.account_id,
            t.to_account_id,
            t.note,
            t.id
        ],
    )?;
    if n == 0 {
        return Err(anyhow!("Transaction {} not found", t.id));
    }
    info!("transaction replaced");
    Ok(())
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(anyhow!("Transaction {} not found", id));
    }
    info!(id, "transaction removed");
    Ok(())
}

pub fn load_budgets(conn: &Connection) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, period_start, category_id, amount, rollover FROM budgets
         ORDER BY period_start, category_id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, i64>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, bool>(4)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, start, category_id, amount, rollover) = row?;
        out.push(Budget {
            id,
            period_start: date(&start)?,
            category_id,
            amount: dec(&amount, "budgets")?,
            rollover,
        });
    }
    Ok(out)
}

pub fn upsert_budget(
    conn: &Connection,
    period_start: NaiveDate,
    category_id: i64,
    amount: Decimal,
    rollover: bool,
) -> Result<()> {
    conn.execute(
        "INSERT INTO budgets(period_start, category_id, amount, rollover) VALUES (?1,?2,?3,?4)
         ON CONFLICT(period_start, category_id) DO UPDATE SET amount=excluded.amount,
            rollover=excluded.rollover",
        params![period_start.to_string(), category_id, amount.to_string(), rollover],
    )?;
    Ok(())
}
