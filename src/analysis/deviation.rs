use super::types::{Deviation, QuarterSkew};
use crate::apportion::compute_targets;
use crate::calendar::Calendar;
use crate::config::QuarterWindow;
use crate::model::{RosterEntry, Unit, UnitId};
use chrono::Datelike;
use std::cmp::Reverse;
use std::collections::BTreeMap;

pub(super) fn count_by_unit<'a, I>(entries: I) -> BTreeMap<UnitId, usize>
where
    I: IntoIterator<Item = &'a RosterEntry>,
{
    let mut counts = BTreeMap::new();
    for e in entries {
        *counts.entry(e.unit).or_insert(0) += 1;
    }
    counts
}

/// Écarts triés par |diff| décroissant (tri stable).
pub(super) fn deviations(
    units: &[Unit],
    targets: &BTreeMap<UnitId, usize>,
    actual: &BTreeMap<UnitId, usize>,
) -> Vec<Deviation> {
    let mut rows: Vec<Deviation> = units
        .iter()
        .map(|u| {
            Deviation::new(
                u.id,
                targets.get(&u.id).copied().unwrap_or(0),
                actual.get(&u.id).copied().unwrap_or(0),
            )
        })
        .collect();
    rows.sort_by_key(|r| Reverse(r.diff.unsigned_abs()));
    rows
}

/// Écart global : la cible porte sur le nombre de jours retenus du plan.
pub(super) fn overall(units: &[Unit], entries: &[RosterEntry]) -> Vec<Deviation> {
    let targets = compute_targets(units, entries.len());
    deviations(units, &targets, &count_by_unit(entries))
}

/// Écart sur la fenêtre de fin d'année, cible calculée sur ses jours ouvrés.
pub(super) fn quarter_skew(
    units: &[Unit],
    entries: &[RosterEntry],
    calendar: &Calendar,
    window: QuarterWindow,
) -> QuarterSkew {
    let year = calendar.year();
    let working_days: usize = window
        .months()
        .map(|m| calendar.working_days_in_month(year, m).len())
        .sum();
    let targets = compute_targets(units, working_days);
    let actual = count_by_unit(
        entries
            .iter()
            .filter(|e| e.date.year() == year && window.contains(e.date.month())),
    );
    QuarterSkew {
        window,
        working_days,
        rows: deviations(units, &targets, &actual),
    }
}
