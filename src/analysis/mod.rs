//! Analyse des écarts : quotas (année, mois, fin d'année), séries
//! consécutives, jours préférés et répartition par jour de semaine.

mod deviation;
mod monthly;
mod preferences;
mod runs;
mod types;

pub use types::{
    Deviation, MonthlyCell, MonthlyQuota, PreferenceHits, QuarterSkew, RunCount,
    WeekdayCounts, WeekdayDistribution, YearMonth,
};

use crate::calendar::Calendar;
use crate::config::QuarterWindow;
use crate::model::{Unit, UnitId, Violation};
use crate::rules::CheckOutcome;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Résultat complet d'une validation.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub year: i32,
    /// Nombre d'entrées retenues du plan.
    pub total_days: usize,
    pub unit_count: usize,
    pub clean: bool,
    pub violations: Vec<Violation>,
    pub overall: Vec<Deviation>,
    pub runs: Vec<RunCount>,
    pub preferences: Vec<PreferenceHits>,
    pub monthly: Vec<MonthlyCell>,
    pub monthly_quota: Vec<MonthlyQuota>,
    pub quarter: QuarterSkew,
    pub weekdays: WeekdayDistribution,
}

/// Une unité par identifiant, dans l'ordre de première apparition ;
/// la dernière définition l'emporte.
pub fn distinct_units(units: &[Unit]) -> Vec<Unit> {
    let mut out: Vec<Unit> = Vec::with_capacity(units.len());
    for u in units {
        match out.iter_mut().find(|o| o.id == u.id) {
            Some(slot) => *slot = u.clone(),
            None => out.push(u.clone()),
        }
    }
    out
}

/// Lance toutes les analyses sur la séquence retenue, quelles que soient
/// les violations relevées.
pub fn analyze(
    outcome: &CheckOutcome,
    units: &[Unit],
    calendar: &Calendar,
    quarter: QuarterWindow,
) -> Analysis {
    let units = distinct_units(units);
    let entries = &outcome.entries;

    let known: BTreeSet<UnitId> = units.iter().map(|u| u.id).collect();
    let unknown: BTreeSet<UnitId> = entries
        .iter()
        .map(|e| e.unit)
        .filter(|id| !known.contains(id))
        .collect();
    for id in &unknown {
        warn!(unit = %id, "plan references a unit missing from the registry");
    }

    let analysis = Analysis {
        year: calendar.year(),
        total_days: entries.len(),
        unit_count: units.len(),
        clean: outcome.is_clean(),
        violations: outcome.violations.clone(),
        overall: deviation::overall(&units, entries),
        runs: runs::run_counts(&units, entries),
        preferences: preferences::preference_hits(&units, entries),
        monthly: monthly::monthly_summary(&units, entries),
        monthly_quota: monthly::monthly_quota(&units, entries, calendar),
        quarter: deviation::quarter_skew(&units, entries, calendar, quarter),
        weekdays: preferences::weekday_distribution(&units, entries, calendar.names()),
    };
    info!(
        days = analysis.total_days,
        units = analysis.unit_count,
        violations = analysis.violations.len(),
        "analysis complete"
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_units_keeps_first_position_last_definition() {
        let units = vec![
            Unit::new(UnitId::new(2), 10.0),
            Unit::new(UnitId::new(1), 20.0),
            Unit::new(UnitId::new(2), 30.0),
        ];
        let out = distinct_units(&units);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, UnitId::new(2));
        assert_eq!(out[0].weight, 30.0);
    }
}
