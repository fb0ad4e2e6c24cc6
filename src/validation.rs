// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::ValidationError;
use crate::models::{Category, Transaction, TxKind};
use crate::tree::CategoryTree;
use rust_decimal::Decimal;

/// Check a full transaction record. `category` is the row `t.category_id`
/// points at, already resolved by the caller.
pub fn check_transaction(
    t: &Transaction,
    category: Option<&Category>,
) -> Result<(), ValidationError> {
    if t.amount < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount(t.amount));
    }
    match t.kind {
        TxKind::Transfer => {
            let to = t.to_account_id.ok_or(ValidationError::MissingDestination)?;
            if to == t.account_id {
                return Err(ValidationError::SameAccount(to));
            }
            if t.category_id.is_some() {
                return Err(ValidationError::TransferWithCategory);
            }
        }
        TxKind::Income | TxKind::Expense => {
            if t.to_account_id.is_some() {
                return Err(ValidationError::UnexpectedDestination(t.kind));
            }
            let cat = category.ok_or(ValidationError::MissingCategory(t.kind))?;
            if !cat.kind.accepts(t.kind) {
                return Err(ValidationError::KindMismatch {
                    name: cat.name.clone(),
                    category: cat.kind,
                    tx: t.kind,
                });
            }
        }
    }
    Ok(())
}

/// Check that `child` may hang under `parent`. `tree` maps every known
/// category id to its record.
pub fn check_parent(
    child: &Category,
    parent: &Category,
    tree: &CategoryTree,
) -> Result<(), ValidationError> {
    if parent.kind != child.kind {
        return Err(ValidationError::ParentKindMismatch {
            parent: parent.name.clone(),
            parent_kind: parent.kind,
            kind: child.kind,
        });
    }
    let cycle = || ValidationError::CategoryCycle {
        name: child.name.clone(),
        parent: parent.name.clone(),
    };
    let mut cur = Some(parent.id);
    let mut steps = 0;
    while let Some(id) = cur {
        if id == child.id || steps > tree.len() {
            return Err(cycle());
        }
        steps += 1;
        cur = tree.get(&id).and_then(|c| c.parent_id);
    }
    Ok(())
}
