use super::types::RunCount;
use crate::model::{RosterEntry, Unit, UnitId};
use std::collections::BTreeMap;

/// Compte les affectations consécutives identiques dans la séquence triée.
/// L'adjacence est positionnelle : un trou dans le plan ne coupe pas la série.
pub(super) fn consecutive_counts(entries: &[RosterEntry]) -> BTreeMap<UnitId, usize> {
    let mut counts = BTreeMap::new();
    for pair in entries.windows(2) {
        if let [prev, cur] = pair {
            if prev.unit == cur.unit {
                *counts.entry(cur.unit).or_insert(0) += 1;
            }
        }
    }
    counts
}

pub(super) fn run_counts(units: &[Unit], entries: &[RosterEntry]) -> Vec<RunCount> {
    let counts = consecutive_counts(entries);
    units
        .iter()
        .map(|u| RunCount {
            unit: u.id,
            runs: counts.get(&u.id).copied().unwrap_or(0),
        })
        .collect()
}
