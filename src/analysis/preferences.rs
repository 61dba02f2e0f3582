use super::deviation::count_by_unit;
use super::types::{PreferenceHits, WeekdayCounts, WeekdayDistribution};
use crate::calendar::WeekdayNames;
use crate::model::{RosterEntry, Unit};
use chrono::Datelike;

pub(super) fn preference_hits(units: &[Unit], entries: &[RosterEntry]) -> Vec<PreferenceHits> {
    let totals = count_by_unit(entries);
    units
        .iter()
        .map(|u| PreferenceHits {
            unit: u.id,
            hits: entries
                .iter()
                .filter(|e| e.unit == u.id && u.prefers(&e.weekday))
                .count(),
            total: totals.get(&u.id).copied().unwrap_or(0),
        })
        .collect()
}

/// Répartition par jour de semaine ; samedi/dimanche seulement s'ils apparaissent.
pub(super) fn weekday_distribution(
    units: &[Unit],
    entries: &[RosterEntry],
    names: &WeekdayNames,
) -> WeekdayDistribution {
    let with_weekend = entries
        .iter()
        .any(|e| e.date.weekday().num_days_from_monday() >= 5);
    let columns = if with_weekend { 7 } else { 5 };

    let rows = units
        .iter()
        .map(|u| {
            let mut counts = vec![0usize; columns];
            for e in entries.iter().filter(|e| e.unit == u.id) {
                let idx = e.date.weekday().num_days_from_monday() as usize;
                counts[idx] += 1;
            }
            WeekdayCounts {
                unit: u.id,
                counts,
            }
        })
        .collect();

    WeekdayDistribution {
        names: names.all()[..columns].to_vec(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnitId;
    use chrono::NaiveDate;

    fn entry(d: u32, weekday: &str, unit: i64) -> RosterEntry {
        RosterEntry {
            date: NaiveDate::from_ymd_opt(2026, 1, d).unwrap(),
            weekday: weekday.into(),
            unit: UnitId::new(unit),
        }
    }

    #[test]
    fn hits_use_preferred_weekdays() {
        let mut unit = Unit::new(UnitId::new(1), 10.0);
        unit.preferred_weekdays = vec!["Montag".into(), "Freitag".into()];
        let entries = vec![
            entry(5, "Montag", 1),
            entry(6, "Dienstag", 1),
            entry(9, "Freitag", 1),
            entry(12, "Montag", 2),
        ];
        let rows = preference_hits(&[unit, Unit::new(UnitId::new(2), 5.0)], &entries);
        assert_eq!(rows[0], PreferenceHits { unit: UnitId::new(1), hits: 2, total: 3 });
        assert_eq!(rows[1], PreferenceHits { unit: UnitId::new(2), hits: 0, total: 1 });
    }

    #[test]
    fn distribution_counts_per_weekday() {
        let units = vec![Unit::new(UnitId::new(1), 10.0)];
        let entries = vec![entry(5, "", 1), entry(12, "", 1), entry(9, "", 1)];
        let dist = weekday_distribution(&units, &entries, &WeekdayNames::german());
        assert_eq!(dist.names.len(), 5);
        assert_eq!(dist.rows[0].counts, vec![2, 0, 0, 0, 1]);
    }

    #[test]
    fn weekend_columns_appear_when_needed() {
        let units = vec![Unit::new(UnitId::new(1), 10.0)];
        let entries = vec![entry(10, "", 1)];
        let dist = weekday_distribution(&units, &entries, &WeekdayNames::english());
        assert_eq!(dist.names.last().map(String::as_str), Some("Sunday"));
        assert_eq!(dist.rows[0].counts[5], 1);
    }
}
