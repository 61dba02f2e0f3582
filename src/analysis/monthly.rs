use super::types::{Deviation, MonthlyCell, MonthlyQuota, YearMonth};
use crate::apportion::compute_targets;
use crate::calendar::Calendar;
use crate::model::{RosterEntry, Unit, UnitId};
use chrono::Datelike;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    actual: usize,
    hits: usize,
}

fn month_of(entry: &RosterEntry) -> YearMonth {
    YearMonth {
        year: entry.date.year(),
        month: entry.date.month(),
    }
}

fn tally_by_month(
    units: &[Unit],
    entries: &[RosterEntry],
) -> BTreeMap<YearMonth, BTreeMap<UnitId, Tally>> {
    let preferred: BTreeMap<UnitId, &Unit> = units.iter().map(|u| (u.id, u)).collect();
    let mut months: BTreeMap<YearMonth, BTreeMap<UnitId, Tally>> = BTreeMap::new();
    for e in entries {
        let cell = months
            .entry(month_of(e))
            .or_default()
            .entry(e.unit)
            .or_default();
        cell.actual += 1;
        if preferred.get(&e.unit).is_some_and(|u| u.prefers(&e.weekday)) {
            cell.hits += 1;
        }
    }
    months
}

/// Ist et préférences par mois présent dans le plan, pour chaque unité.
pub(super) fn monthly_summary(units: &[Unit], entries: &[RosterEntry]) -> Vec<MonthlyCell> {
    let months = tally_by_month(units, entries);
    let mut out = Vec::new();
    for (month, tallies) in &months {
        for u in units {
            let t = tallies.get(&u.id).copied().unwrap_or_default();
            out.push(MonthlyCell {
                month: *month,
                unit: u.id,
                actual: t.actual,
                hits: t.hits,
            });
        }
    }
    out
}

/// Soll/Ist mensuel : cible recalculée sur les jours ouvrés de chaque mois.
pub(super) fn monthly_quota(
    units: &[Unit],
    entries: &[RosterEntry],
    calendar: &Calendar,
) -> Vec<MonthlyQuota> {
    let year = calendar.year();
    let months = tally_by_month(units, entries);
    let mut out = Vec::new();
    for month in 1..=12 {
        let key = YearMonth { year, month };
        let working_days = calendar.working_days_in_month(year, month).len();
        let targets = compute_targets(units, working_days);
        let tallies = months.get(&key);
        for u in units {
            let actual = tallies
                .and_then(|t| t.get(&u.id))
                .map(|t| t.actual)
                .unwrap_or(0);
            let target = targets.get(&u.id).copied().unwrap_or(0);
            out.push(MonthlyQuota {
                month: key,
                working_days,
                deviation: Deviation::new(u.id, target, actual),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekdayNames;
    use chrono::NaiveDate;

    fn entry(m: u32, d: u32, weekday: &str, unit: i64) -> RosterEntry {
        RosterEntry {
            date: NaiveDate::from_ymd_opt(2026, m, d).unwrap(),
            weekday: weekday.into(),
            unit: UnitId::new(unit),
        }
    }

    fn units() -> Vec<Unit> {
        let mut a = Unit::new(UnitId::new(1), 75.0);
        a.preferred_weekdays = vec!["Montag".into()];
        vec![a, Unit::new(UnitId::new(2), 25.0)]
    }

    #[test]
    fn summary_groups_by_month() {
        let entries = vec![
            entry(1, 5, "Montag", 1),
            entry(1, 6, "Dienstag", 2),
            entry(2, 2, "Montag", 1),
        ];
        let cells = monthly_summary(&units(), &entries);
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[0].month.to_string(), "01.2026");
        assert_eq!((cells[0].actual, cells[0].hits), (1, 1));
        assert_eq!((cells[1].actual, cells[1].hits), (1, 0));
        assert_eq!(cells[2].month.month, 2);
        assert_eq!(cells[3].actual, 0);
    }

    #[test]
    fn quota_covers_all_twelve_months() {
        let cal = Calendar::for_year(2026, WeekdayNames::german()).unwrap();
        let entries = vec![entry(3, 2, "Montag", 2)];
        let rows = monthly_quota(&units(), &entries, &cal);
        assert_eq!(rows.len(), 24);

        // März : 22 jours ouvrés → 16.5 / 5.5, le plus gros pensum gagne
        let march: Vec<&MonthlyQuota> = rows.iter().filter(|r| r.month.month == 3).collect();
        assert!(march.iter().all(|r| r.working_days == 22));
        assert_eq!(march[0].deviation, Deviation::new(UnitId::new(1), 17, 0));
        assert_eq!(march[1].deviation, Deviation::new(UnitId::new(2), 5, 1));

        for month in 1..=12 {
            let sum: usize = rows
                .iter()
                .filter(|r| r.month.month == month)
                .map(|r| r.deviation.target)
                .sum();
            assert_eq!(sum, cal.working_days_in_month(2026, month).len());
        }
    }
}
