// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CategoryKind, TxKind};
use rust_decimal::Decimal;
use thiserror::Error;

/// Record-shape rules checked before anything is written.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Amount must not be negative (got {0})")]
    NegativeAmount(Decimal),

    #[error("Transfer needs a destination account")]
    MissingDestination,

    #[error("Transfer source and destination must differ (account {0})")]
    SameAccount(i64),

    #[error("Transfers cannot carry a category")]
    TransferWithCategory,

    #[error("{0} transactions need a category")]
    MissingCategory(TxKind),

    #[error("{0} transactions cannot have a destination account")]
    UnexpectedDestination(TxKind),

    #[error("Category '{name}' is {category} but the transaction is {tx}")]
    KindMismatch {
        name: String,
        category: CategoryKind,
        tx: TxKind,
    },

    #[error("Parent category '{parent}' is {parent_kind}, expected {kind}")]
    ParentKindMismatch {
        parent: String,
        parent_kind: CategoryKind,
        kind: CategoryKind,
    },

    #[error("Making '{parent}' the parent of '{name}' would create a cycle")]
    CategoryCycle { name: String, parent: String },
}
