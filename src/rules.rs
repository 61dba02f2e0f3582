use crate::calendar::{parse_date_de, Calendar};
use crate::model::{RosterEntry, RosterRow, Unit, UnitId, Violation};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Résultat du contrôle des règles : entrées retenues (triées) et violations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckOutcome {
    pub entries: Vec<RosterEntry>,
    pub violations: Vec<Violation>,
}

impl CheckOutcome {
    /// Un plan est propre si aucune violation n'a été relevée.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Index id → unité ; en cas de doublon, la dernière définition gagne.
pub fn index_units(units: &[Unit]) -> BTreeMap<UnitId, &Unit> {
    units.iter().map(|u| (u.id, u)).collect()
}

/// Contrôle chaque ligne dans l'ordre du fichier, puis les indisponibilités
/// sur la séquence triée par date.
pub fn check_roster(rows: &[RosterRow], units: &[Unit], calendar: &Calendar) -> CheckOutcome {
    let mut out = CheckOutcome::default();

    for row in rows {
        let date = match parse_date_de(&row.date) {
            Ok(date) => date,
            Err(_) => {
                out.violations.push(Violation::InvalidDateFormat {
                    raw: row.date.clone(),
                });
                continue;
            }
        };

        let expected = calendar.weekday_name(date);
        if !row.weekday.is_empty() && row.weekday != expected {
            out.violations.push(Violation::WeekdayMismatch {
                date,
                recorded: row.weekday.clone(),
                expected: expected.to_string(),
            });
        }
        if calendar.is_weekend(date) {
            out.violations.push(Violation::WeekendAssignment { date });
        }
        if calendar.is_holiday(date) {
            out.violations.push(Violation::HolidayAssignment { date });
        }

        let Some(unit) = UnitId::parse(&row.unit) else {
            out.violations.push(Violation::InvalidUnitReference {
                raw: row.unit.clone(),
            });
            continue;
        };

        out.entries.push(RosterEntry {
            date,
            weekday: expected.to_string(),
            unit,
        });
    }

    // tri stable : l'ordre du fichier départage les dates identiques
    out.entries.sort_by_key(|e| e.date);

    let by_id = index_units(units);
    for entry in &out.entries {
        if let Some(unit) = by_id.get(&entry.unit) {
            if unit.is_unavailable_on(entry.date) {
                out.violations.push(Violation::UnitUnavailable {
                    unit: entry.unit,
                    date: entry.date,
                });
            }
        }
    }

    for v in &out.violations {
        debug!(kind = v.kind().as_str(), "{v}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekdayNames;
    use crate::model::{Unavailability, ViolationKind};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn cal() -> Calendar {
        Calendar::for_year(2026, WeekdayNames::german()).unwrap()
    }

    fn kinds(outcome: &CheckOutcome) -> Vec<ViolationKind> {
        outcome.violations.iter().map(Violation::kind).collect()
    }

    #[test]
    fn clean_row_produces_no_violation() {
        let out = check_roster(&[RosterRow::new("02.01.2026", "Freitag", "1")], &[], &cal());
        assert!(out.is_clean());
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].weekday, "Freitag");
    }

    #[test]
    fn new_year_is_holiday_without_mismatch() {
        let out = check_roster(&[RosterRow::new("01.01.2026", "Donnerstag", "1")], &[], &cal());
        assert_eq!(kinds(&out), vec![ViolationKind::HolidayAssignment]);
        assert!(!out.is_clean());
        assert_eq!(out.entries.len(), 1);
    }

    #[test]
    fn weekend_always_flagged() {
        let out = check_roster(&[RosterRow::new("03.01.2026", "", "x")], &[], &cal());
        assert_eq!(
            kinds(&out),
            vec![
                ViolationKind::WeekendAssignment,
                ViolationKind::InvalidUnitReference
            ]
        );
        assert!(out.entries.is_empty());
    }

    #[test]
    fn one_date_can_trigger_several_violations() {
        // 08.03.2026 : dimanche et jour férié
        let out = check_roster(&[RosterRow::new("08.03.2026", "Montag", "2")], &[], &cal());
        assert_eq!(
            kinds(&out),
            vec![
                ViolationKind::WeekdayMismatch,
                ViolationKind::WeekendAssignment,
                ViolationKind::HolidayAssignment
            ]
        );
        assert_eq!(out.entries.len(), 1);
    }

    #[test]
    fn invalid_date_row_is_dropped() {
        let out = check_roster(
            &[
                RosterRow::new("2026-01-05", "Montag", "1"),
                RosterRow::new("05.01.2026", "Montag", "1"),
            ],
            &[],
            &cal(),
        );
        assert_eq!(kinds(&out), vec![ViolationKind::InvalidDateFormat]);
        assert_eq!(out.entries.len(), 1);
    }

    #[test]
    fn entries_are_sorted_by_date() {
        let out = check_roster(
            &[
                RosterRow::new("07.01.2026", "", "3"),
                RosterRow::new("05.01.2026", "", "1"),
                RosterRow::new("06.01.2026", "", "2"),
            ],
            &[],
            &cal(),
        );
        let ids: Vec<i64> = out.entries.iter().map(|e| e.unit.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn unavailability_single_and_range_inclusive() {
        let mut unit = Unit::new(UnitId::new(5), 10.0);
        unit.unavailable = vec![
            Unavailability::single(d(2026, 1, 5)),
            Unavailability::new(d(2026, 1, 12), d(2026, 1, 16)).unwrap(),
        ];
        let rows = [
            RosterRow::new("16.01.2026", "Freitag", "5"),
            RosterRow::new("05.01.2026", "Montag", "5"),
            RosterRow::new("06.01.2026", "Dienstag", "5"),
            RosterRow::new("12.01.2026", "Montag", "5"),
            RosterRow::new("12.01.2026", "Montag", "6"),
        ];
        let out = check_roster(&rows, &[unit], &cal());
        let flagged: Vec<NaiveDate> = out
            .violations
            .iter()
            .map(|v| match v {
                Violation::UnitUnavailable { date, .. } => *date,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(flagged, vec![d(2026, 1, 5), d(2026, 1, 12), d(2026, 1, 16)]);
    }

    #[test]
    fn every_fixed_holiday_is_flagged() {
        let dates = [
            "01.01.2026", "08.03.2026", "03.04.2026", "06.04.2026", "01.05.2026",
            "14.05.2026", "25.05.2026", "03.10.2026", "25.12.2026", "26.12.2026",
        ];
        for date in dates {
            let out = check_roster(&[RosterRow::new(date, "", "1")], &[], &cal());
            assert!(
                kinds(&out).contains(&ViolationKind::HolidayAssignment),
                "{date} not flagged"
            );
        }
    }
}
