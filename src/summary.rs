// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Folding transactions into income / expense / net totals.
//!
//! Transfers move money between the household's own accounts, so they never
//! count toward income or expense. They are tallied in `transfer_count` only.

use crate::models::{Account, BillingPeriod, SummaryAggregate, Transaction, TxKind};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub fn aggregate(transactions: &[Transaction]) -> SummaryAggregate {
    transactions
        .iter()
        .fold(SummaryAggregate::default(), |acc, t| acc.record(t))
}

/// Aggregate only the transactions dated inside `period`.
pub fn aggregate_in(period: &BillingPeriod, transactions: &[Transaction]) -> SummaryAggregate {
    transactions
        .iter()
        .filter(|t| period.contains(t.date))
        .fold(SummaryAggregate::default(), |acc, t| acc.record(t))
}

/// Per-category totals for income and expense rows. Uncategorised rows are
/// keyed under `None`.
pub fn aggregate_by_category(transactions: &[Transaction]) -> BTreeMap<Option<i64>, Decimal> {
    let mut out = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.kind != TxKind::Transfer) {
        *out.entry(t.category_id).or_insert(Decimal::ZERO) += t.amount;
    }
    out
}

/// Current balance: opening amount, plus income and incoming transfers,
/// minus expenses and outgoing transfers.
pub fn account_balance(account: &Account, transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .fold(account.initial_balance, |bal, t| match t.kind {
            TxKind::Income if t.account_id == account.id => bal + t.amount,
            TxKind::Expense if t.account_id == account.id => bal - t.amount,
            TxKind::Transfer if t.account_id == account.id => bal - t.amount,
            TxKind::Transfer if t.to_account_id == Some(account.id) => bal + t.amount,
            _ => bal,
        })
}

impl SummaryAggregate {
    /// Fold a single transaction into the running aggregate.
    pub fn record(mut self, t: &Transaction) -> Self {
        match t.kind {
            TxKind::Transfer => {
                self.transfer_count += 1;
                return self;
            }
            TxKind::Income => self.total_income += t.amount,
            TxKind::Expense => self.total_expense += t.amount,
        }
        self.count += 1;
        self.net_balance = self.total_income - self.total_expense;
        self.min_amount = Some(self.min_amount.map_or(t.amount, |m| m.min(t.amount)));
        self.max_amount = Some(self.max_amount.map_or(t.amount, |m| m.max(t.amount)));
        self.first_date = Some(self.first_date.map_or(t.date, |d| d.min(t.date)));
        self.last_date = Some(self.last_date.map_or(t.date, |d| d.max(t.date)));
        self
    }

    /// Combine two aggregates computed over disjoint transaction sets.
    pub fn merge(self, other: &SummaryAggregate) -> Self {
        let total_income = self.total_income + other.total_income;
        let total_expense = self.total_expense + other.total_expense;
        SummaryAggregate {
            total_income,
            total_expense,
            net_balance: total_income - total_expense,
            count: self.count + other.count,
            transfer_count: self.transfer_count + other.transfer_count,
            min_amount: pick(self.min_amount, other.min_amount, Decimal::min),
            max_amount: pick(self.max_amount, other.max_amount, Decimal::max),
            first_date: pick(self.first_date, other.first_date, Ord::min),
            last_date: pick(self.last_date, other.last_date, Ord::max),
        }
    }

    /// Income, expense and transfer rows together.
    pub fn activity_count(&self) -> usize {
        self.count + self.transfer_count
    }
}

fn pick<T: Copy>(a: Option<T>, b: Option<T>, f: impl Fn(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(x), Some(y)) => Some(f(x, y)),
        (x, None) => x,
        (None, y) => y,
    }
}
