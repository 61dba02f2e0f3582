//! Calendrier des jours ouvrés : lundi–vendredi hors jours fériés fixes.
//!
//! Les jours fériés sont une table littérale par année (les fêtes mobiles
//! sont déjà résolues), jamais calculée.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Jours fériés régionaux (Berlin) 2026.
const HOLIDAYS_2026: [(u32, u32); 10] = [
    (1, 1),   // Neujahr
    (3, 8),   // Internationaler Frauentag
    (4, 3),   // Karfreitag
    (4, 6),   // Ostermontag
    (5, 1),   // Tag der Arbeit
    (5, 14),  // Christi Himmelfahrt
    (5, 25),  // Pfingstmontag
    (10, 3),  // Tag der Deutschen Einheit
    (12, 25), // 1. Weihnachtstag
    (12, 26), // 2. Weihnachtstag
];

fn builtin_holidays(year: i32) -> Option<&'static [(u32, u32)]> {
    match year {
        2026 => Some(&HOLIDAYS_2026),
        _ => None,
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("no holiday table for year {0}; supply one with --holidays")]
    UnknownYear(i32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid date `{0}`, expected dd.mm.yyyy")]
pub struct DateParseError(pub String);

/// Parse `dd.mm.yyyy` (champs non nécessairement complétés par des zéros).
pub fn parse_date_de(raw: &str) -> Result<NaiveDate, DateParseError> {
    let err = || DateParseError(raw.to_string());
    let mut parts = raw.trim().split('.');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(err());
    };
    let day: u32 = day.trim().parse().map_err(|_| err())?;
    let month: u32 = month.trim().parse().map_err(|_| err())?;
    let year: i32 = year.trim().parse().map_err(|_| err())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(err)
}

pub fn format_date_de(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Noms des jours de la semaine, lundi en premier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayNames([String; 7]);

impl WeekdayNames {
    pub fn new(names: [String; 7]) -> Self {
        Self(names)
    }

    pub fn german() -> Self {
        Self::from_strs([
            "Montag",
            "Dienstag",
            "Mittwoch",
            "Donnerstag",
            "Freitag",
            "Samstag",
            "Sonntag",
        ])
    }

    pub fn english() -> Self {
        Self::from_strs([
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
            "Sunday",
        ])
    }

    fn from_strs(names: [&str; 7]) -> Self {
        Self(names.map(str::to_owned))
    }

    pub fn name(&self, weekday: Weekday) -> &str {
        &self.0[weekday.num_days_from_monday() as usize]
    }

    /// Les cinq jours ouvrés (lundi–vendredi).
    pub fn workdays(&self) -> &[String] {
        &self.0[..5]
    }

    pub fn all(&self) -> &[String] {
        &self.0
    }
}

impl Default for WeekdayNames {
    fn default() -> Self {
        Self::german()
    }
}

#[derive(Debug, Clone)]
pub struct Calendar {
    year: i32,
    holidays: BTreeSet<NaiveDate>,
    names: WeekdayNames,
}

impl Calendar {
    /// Calendrier avec la table intégrée de l'année.
    pub fn for_year(year: i32, names: WeekdayNames) -> Result<Self, CalendarError> {
        let table = builtin_holidays(year).ok_or(CalendarError::UnknownYear(year))?;
        let holidays = table
            .iter()
            .filter_map(|&(m, d)| NaiveDate::from_ymd_opt(year, m, d))
            .collect();
        Ok(Self {
            year,
            holidays,
            names,
        })
    }

    /// Calendrier dont les jours fériés sont fournis par l'appelant.
    pub fn with_holidays<I>(year: i32, holidays: I, names: WeekdayNames) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            year,
            holidays: holidays.into_iter().collect(),
            names,
        }
    }

    /// Table intégrée si elle existe, complétée par `extra`.
    pub fn resolve(
        year: i32,
        extra: &[NaiveDate],
        names: WeekdayNames,
    ) -> Result<Self, CalendarError> {
        match Self::for_year(year, names.clone()) {
            Ok(mut cal) => {
                cal.holidays.extend(extra.iter().copied());
                Ok(cal)
            }
            Err(CalendarError::UnknownYear(_)) if !extra.is_empty() => {
                Ok(Self::with_holidays(year, extra.iter().copied(), names))
            }
            Err(e) => Err(e),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn names(&self) -> &WeekdayNames {
        &self.names
    }

    pub fn holidays(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.holidays.iter().copied()
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.is_weekend(date) && !self.is_holiday(date)
    }

    pub fn weekday_name(&self, date: NaiveDate) -> &str {
        self.names.name(date.weekday())
    }

    /// Jours ouvrés du mois, dans l'ordre. Mois hors 1..=12 : vide.
    pub fn working_days_in_month(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Vec::new();
        };
        first
            .iter_days()
            .take_while(|d| d.month() == month)
            .filter(|d| self.is_working_day(*d))
            .collect()
    }

    pub fn working_days_in_year(&self) -> usize {
        (1..=12)
            .map(|m| self.working_days_in_month(self.year, m).len())
            .sum()
    }
}
