use crate::calendar::format_date_de;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifiant fort pour une unité (département).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(i64);

impl UnitId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
    pub fn get(self) -> i64 {
        self.0
    }
    /// Parse tolérant : espaces ignorés, `None` si ce n'est pas un entier.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(Self)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unavailability end {end} is before start {start}")]
pub struct InvertedInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Indisponibilité d'une unité : intervalle fermé [start, end].
/// La désérialisation passe par [`Unavailability::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUnavailability")]
pub struct Unavailability {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawUnavailability {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawUnavailability> for Unavailability {
    type Error = InvertedInterval;

    fn try_from(raw: RawUnavailability) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl Unavailability {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvertedInterval> {
        if end < start {
            return Err(InvertedInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }
    pub fn end(&self) -> NaiveDate {
        self.end
    }
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// Bornes incluses.
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Unité planifiable, issue du fichier de configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    /// Pensum en pourcent (>= 0).
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_weekdays: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<Unavailability>,
}

impl Unit {
    pub fn new(id: UnitId, weight: f64) -> Self {
        Self {
            id,
            weight,
            preferred_weekdays: Vec::new(),
            unavailable: Vec::new(),
        }
    }

    pub fn is_unavailable_on(&self, day: NaiveDate) -> bool {
        self.unavailable.iter().any(|u| u.covers(day))
    }

    pub fn prefers(&self, weekday_name: &str) -> bool {
        self.preferred_weekdays.iter().any(|p| p == weekday_name)
    }
}

/// Ligne brute du plan, telle que lue (champs déjà trimés).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    pub date: String,
    pub weekday: String,
    pub unit: String,
}

impl RosterRow {
    pub fn new<D: Into<String>, W: Into<String>, U: Into<String>>(date: D, weekday: W, unit: U) -> Self {
        Self {
            date: date.into(),
            weekday: weekday.into(),
            unit: unit.into(),
        }
    }
}

/// Entrée retenue après contrôle ; `weekday` est le nom calculé, pas celui du fichier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub date: NaiveDate,
    pub weekday: String,
    pub unit: UnitId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    InvalidDateFormat,
    WeekdayMismatch,
    WeekendAssignment,
    HolidayAssignment,
    InvalidUnitReference,
    UnitUnavailable,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::InvalidDateFormat => "invalid-date-format",
            ViolationKind::WeekdayMismatch => "weekday-mismatch",
            ViolationKind::WeekendAssignment => "weekend-assignment",
            ViolationKind::HolidayAssignment => "holiday-assignment",
            ViolationKind::InvalidUnitReference => "invalid-unit-reference",
            ViolationKind::UnitUnavailable => "unit-unavailable",
        }
    }
}

/// Violation d'une règle, accumulée sans dédoublonnage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Violation {
    InvalidDateFormat { raw: String },
    WeekdayMismatch {
        date: NaiveDate,
        recorded: String,
        expected: String,
    },
    WeekendAssignment { date: NaiveDate },
    HolidayAssignment { date: NaiveDate },
    InvalidUnitReference { raw: String },
    UnitUnavailable { unit: UnitId, date: NaiveDate },
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::InvalidDateFormat { .. } => ViolationKind::InvalidDateFormat,
            Violation::WeekdayMismatch { .. } => ViolationKind::WeekdayMismatch,
            Violation::WeekendAssignment { .. } => ViolationKind::WeekendAssignment,
            Violation::HolidayAssignment { .. } => ViolationKind::HolidayAssignment,
            Violation::InvalidUnitReference { .. } => ViolationKind::InvalidUnitReference,
            Violation::UnitUnavailable { .. } => ViolationKind::UnitUnavailable,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InvalidDateFormat { raw } => write!(f, "invalid date format: {raw}"),
            Violation::WeekdayMismatch {
                date,
                recorded,
                expected,
            } => write!(
                f,
                "weekday mismatch: {} (recorded: {recorded}, computed: {expected})",
                format_date_de(*date)
            ),
            Violation::WeekendAssignment { date } => {
                write!(f, "weekend assignment: {}", format_date_de(*date))
            }
            Violation::HolidayAssignment { date } => {
                write!(f, "holiday assignment: {}", format_date_de(*date))
            }
            Violation::InvalidUnitReference { raw } => {
                write!(f, "invalid unit reference in plan: {raw}")
            }
            Violation::UnitUnavailable { unit, date } => {
                write!(f, "unit {unit} unavailable on {}", format_date_de(*date))
            }
        }
    }
}
