// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category hierarchy helpers over an id -> category map.

use crate::models::Category;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

pub type CategoryTree = HashMap<i64, Category>;

/// Ids of categories whose ancestor chain loops back on itself.
pub fn find_cycles(tree: &CategoryTree) -> Vec<i64> {
    let mut out: Vec<i64> = tree
        .values()
        .filter(|c| {
            let mut cur = c.parent_id;
            let mut steps = 0;
            while let Some(id) = cur {
                if id == c.id {
                    return true;
                }
                if steps > tree.len() {
                    return false;
                }
                steps += 1;
                cur = tree.get(&id).and_then(|p| p.parent_id);
            }
            false
        })
        .map(|c| c.id)
        .collect();
    out.sort_unstable();
    out
}

/// `root` followed by every category below it, breadth first.
pub fn descendants(root: i64, tree: &CategoryTree) -> Vec<i64> {
    let mut out = vec![root];
    let mut i = 0;
    while i < out.len() {
        let cur = out[i];
        let mut children: Vec<i64> = tree
            .values()
            .filter(|c| c.parent_id == Some(cur) && !out.contains(&c.id))
            .map(|c| c.id)
            .collect();
        children.sort_unstable();
        out.extend(children);
        i += 1;
    }
    out
}

/// Totals per category including everything booked under its descendants.
pub fn rollup(tree: &CategoryTree, own: &BTreeMap<Option<i64>, Decimal>) -> HashMap<i64, Decimal> {
    tree.keys()
        .map(|&id| {
            let total = descendants(id, tree)
                .iter()
                .filter_map(|d| own.get(&Some(*d)))
                .copied()
                .sum();
            (id, total)
        })
        .collect()
}

/// Depth-first listing (roots and siblings by name) with each entry's depth.
/// Categories stuck in a cycle have no root; they are appended at depth 0.
pub fn ordered(tree: &CategoryTree) -> Vec<(usize, &Category)> {
    fn children<'a>(tree: &'a CategoryTree, parent: Option<i64>) -> Vec<&'a Category> {
        let mut v: Vec<&Category> = tree
            .values()
            .filter(|c| match parent {
                Some(p) => c.parent_id == Some(p),
                None => c.parent_id.is_none_or(|p| !tree.contains_key(&p)),
            })
            .collect();
        v.sort_by(|a, b| a.name.cmp(&b.name));
        v
    }

    let mut out = Vec::with_capacity(tree.len());
    let mut seen = HashSet::new();
    let mut stack: Vec<(usize, &Category)> =
        children(tree, None).into_iter().rev().map(|c| (0, c)).collect();
    while let Some((depth, c)) = stack.pop() {
        if !seen.insert(c.id) {
            continue;
        }
        out.push((depth, c));
        for child in children(tree, Some(c.id)).into_iter().rev() {
            stack.push((depth + 1, child));
        }
    }
    let mut rest: Vec<&Category> = tree.values().filter(|c| !seen.contains(&c.id)).collect();
    rest.sort_by(|a, b| a.name.cmp(&b.name));
    out.extend(rest.into_iter().map(|c| (0, c)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryKind;

    fn cat(id: i64, name: &str, parent_id: Option<i64>) -> Category {
        Category {
            id,
            name: name.to_string(),
            kind: CategoryKind::Expense,
            parent_id,
        }
    }

    fn tree(cats: Vec<Category>) -> CategoryTree {
        cats.into_iter().map(|c| (c.id, c)).collect()
    }

    #[test]
    fn finds_cycles_and_descendants() {
        let t = tree(vec![
            cat(1, "A", Some(2)),
            cat(2, "B", Some(1)),
            cat(3, "C", None),
            cat(4, "D", Some(3)),
            cat(5, "E", Some(4)),
        ]);
        assert_eq!(find_cycles(&t), vec![1, 2]);
        assert_eq!(descendants(3, &t), vec![3, 4, 5]);
        assert_eq!(descendants(5, &t), vec![5]);
        assert_eq!(descendants(1, &t), vec![1, 2]);
    }

    #[test]
    fn rollup_adds_children_into_parents() {
        let t = tree(vec![
            cat(1, "Home", None),
            cat(2, "Utilities", Some(1)),
            cat(3, "Power", Some(2)),
            cat(4, "Food", None),
        ]);
        let own: BTreeMap<Option<i64>, Decimal> = [
            (Some(1), Decimal::from(5)),
            (Some(3), Decimal::from(100)),
            (Some(4), Decimal::from(7)),
            (None, Decimal::from(1000)),
        ]
        .into_iter()
        .collect();
        let totals = rollup(&t, &own);
        assert_eq!(totals[&1], Decimal::from(105));
        assert_eq!(totals[&2], Decimal::from(100));
        assert_eq!(totals[&3], Decimal::from(100));
        assert_eq!(totals[&4], Decimal::from(7));
    }

    #[test]
    fn ordered_walks_depth_first_by_name() {
        let t = tree(vec![
            cat(1, "Home", None),
            cat(2, "Utilities", Some(1)),
            cat(3, "Power", Some(2)),
            cat(4, "Food", None),
            cat(5, "Rent", Some(1)),
            cat(6, "X", Some(7)),
            cat(7, "Y", Some(6)),
        ]);
        let listing: Vec<(usize, &str)> = ordered(&t)
            .into_iter()
            .map(|(d, c)| (d, c.name.as_str()))
            .collect();
        assert_eq!(
            listing,
            vec![
                (0, "Food"),
                (0, "Home"),
                (1, "Rent"),
                (1, "Utilities"),
                (2, "Power"),
                (0, "X"),
                (0, "Y"),
            ]
        );
    }
}
