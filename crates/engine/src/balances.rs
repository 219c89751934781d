//! Balance views derived from the ledger.
//!
//! A view is rebuilt from scratch on every read and never stored. Two modes
//! exist:
//!
//! - [`BalanceMode::Raw`]: the ledger entries as they are, in ledger order.
//! - [`BalanceMode::Simplify`]: entries are summed per `(creditor, debtor)`
//!   pair, then every pair of users with debt flowing both ways is netted into
//!   at most one edge.
//!
//! Netting is strictly two-party: a cycle `A -> B -> C -> A` is left as is.
//!
//! ## Orientation of the netted edge
//!
//! The aggregate is keyed `view[creditor][debtor]`. For a pair `{x, y}` with
//! `a = view[x][y]`, `b = view[y][x]` and `m = max(a, b)`, netting stores
//! `view[x][y] = m - a` and `view[y][x] = m - b`. The surviving value sits in
//! the slot of the *smaller* original debt: with `V owes U 100` and
//! `U owes V 30` the result is `view[V][U] = 70`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{LedgerEntry, Money};

/// `outer user -> inner user -> amount`, see the module docs for orientation.
pub type BalanceView = BTreeMap<String, BTreeMap<String, Money>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BalanceMode {
    #[default]
    Raw,
    Simplify,
}

impl BalanceMode {
    #[must_use]
    pub fn from_flag(simplify: bool) -> Self {
        if simplify { Self::Simplify } else { Self::Raw }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Balances {
    Raw(Vec<LedgerEntry>),
    Simplified(BalanceView),
}

/// Builds the requested view from a ledger snapshot.
#[must_use]
pub fn simplify(entries: Vec<LedgerEntry>, mode: BalanceMode) -> Balances {
    match mode {
        BalanceMode::Raw => Balances::Raw(entries),
        BalanceMode::Simplify => Balances::Simplified(net_pairs(aggregate(&entries))),
    }
}

/// Sums the entries into `view[creditor][debtor]`.
#[must_use]
pub fn aggregate(entries: &[LedgerEntry]) -> BalanceView {
    let mut view = BalanceView::new();
    for entry in entries {
        *view
            .entry(entry.creditor.clone())
            .or_default()
            .entry(entry.debtor.clone())
            .or_insert(Money::ZERO) += entry.amount;
    }
    view
}

/// Nets every bidirectional pair, then drops empty rows and self-loops.
///
/// All adjustments are computed against the aggregate as it was before any
/// netting, then committed in a second pass.
#[must_use]
pub fn net_pairs(mut view: BalanceView) -> BalanceView {
    let mut adjustments: Vec<(String, String, Money)> = Vec::new();
    for (x, row) in &view {
        for (y, &a) in row.range::<String, _>((
            std::ops::Bound::Excluded(x),
            std::ops::Bound::Unbounded,
        )) {
            let Some(&b) = view.get(y).and_then(|other| other.get(x)) else {
                continue;
            };
            let m = a.max(b);
            adjustments.push((x.clone(), y.clone(), m - a));
            adjustments.push((y.clone(), x.clone(), m - b));
        }
    }

    for (outer, inner, amount) in adjustments {
        if let Some(row) = view.get_mut(&outer) {
            if amount.is_zero() {
                row.remove(&inner);
            } else {
                row.insert(inner, amount);
            }
        }
    }
    view.retain(|_, row| !row.is_empty());

    for (user, row) in view.iter_mut() {
        row.remove(user);
    }
    view.retain(|_, row| !row.is_empty());

    view
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn entry(id: i64, debtor: &str, creditor: &str, amount: i64) -> LedgerEntry {
        LedgerEntry {
            id,
            expense_id: 1,
            debtor: debtor.to_string(),
            creditor: creditor.to_string(),
            amount: Money::major(amount),
            created_at: Utc::now(),
        }
    }

    fn simplified(entries: Vec<LedgerEntry>) -> BalanceView {
        match simplify(entries, BalanceMode::Simplify) {
            Balances::Simplified(view) => view,
            Balances::Raw(_) => panic!("expected simplified view"),
        }
    }

    #[test]
    fn netting_keeps_remainder_in_smaller_debt_slot() {
        let view = simplified(vec![entry(1, "v", "u", 100), entry(2, "u", "v", 30)]);

        assert_eq!(view.len(), 1);
        assert_eq!(view["v"].len(), 1);
        assert_eq!(view["v"]["u"], Money::major(70));
        assert!(!view.contains_key("u"));
    }

    #[test]
    fn netting_is_symmetric_in_insertion_order() {
        let forward = simplified(vec![entry(1, "v", "u", 100), entry(2, "u", "v", 30)]);
        let backward = simplified(vec![entry(1, "u", "v", 30), entry(2, "v", "u", 100)]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn equal_mutual_debts_cancel_out() {
        let view = simplified(vec![entry(1, "a", "b", 25), entry(2, "b", "a", 25)]);
        assert!(view.is_empty());
    }

    #[test]
    fn entries_for_same_pair_are_summed() {
        let view = simplified(vec![
            entry(1, "a", "b", 10),
            entry(2, "a", "b", 15),
            entry(3, "c", "b", 5),
        ]);
        assert_eq!(view["b"]["a"], Money::major(25));
        assert_eq!(view["b"]["c"], Money::major(5));
    }

    #[test]
    fn three_party_cycle_is_not_cancelled() {
        let view = simplified(vec![
            entry(1, "a", "b", 10),
            entry(2, "b", "c", 10),
            entry(3, "c", "a", 10),
        ]);
        assert_eq!(view["b"]["a"], Money::major(10));
        assert_eq!(view["c"]["b"], Money::major(10));
        assert_eq!(view["a"]["c"], Money::major(10));
    }

    #[test]
    fn self_loops_are_dropped() {
        let view = simplified(vec![entry(1, "a", "a", 10), entry(2, "b", "a", 5)]);
        assert_eq!(view.len(), 1);
        assert_eq!(view["a"].len(), 1);
        assert_eq!(view["a"]["b"], Money::major(5));

        let view = simplified(vec![entry(1, "a", "a", 10)]);
        assert!(view.is_empty());
    }

    #[test]
    fn simplify_is_idempotent_on_same_snapshot() {
        let snapshot = vec![
            entry(1, "a", "b", 40),
            entry(2, "b", "a", 10),
            entry(3, "c", "a", 7),
            entry(4, "a", "c", 3),
        ];
        let first = simplify(snapshot.clone(), BalanceMode::Simplify);
        let second = simplify(snapshot, BalanceMode::Simplify);
        assert_eq!(first, second);
    }

    #[test]
    fn raw_mode_returns_entries_unaggregated() {
        let snapshot = vec![entry(1, "a", "b", 10), entry(2, "a", "b", 10)];
        match simplify(snapshot.clone(), BalanceMode::Raw) {
            Balances::Raw(entries) => assert_eq!(entries, snapshot),
            Balances::Simplified(_) => panic!("expected raw entries"),
        }
    }
}
