use crate::calendar::WeekdayNames;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Noms des colonnes attendues dans le CSV du plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterColumns {
    pub date: String,
    pub weekday: String,
    pub unit: String,
}

impl RosterColumns {
    /// Exports historiques : `Datum;Wochentag;Abteilungsnummer`.
    pub fn german() -> Self {
        Self {
            date: "Datum".into(),
            weekday: "Wochentag".into(),
            unit: "Abteilungsnummer".into(),
        }
    }
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            date: "Date".into(),
            weekday: "WeekdayName".into(),
            unit: "UnitId".into(),
        }
    }
}

/// Fenêtre de mois (bornes incluses) pour l'analyse de fin d'année.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterWindow {
    pub first_month: u32,
    pub last_month: u32,
}

impl QuarterWindow {
    pub fn contains(&self, month: u32) -> bool {
        self.first_month <= month && month <= self.last_month
    }

    pub fn months(&self) -> impl Iterator<Item = u32> {
        self.first_month..=self.last_month
    }
}

impl Default for QuarterWindow {
    fn default() -> Self {
        Self {
            first_month: 10,
            last_month: 12,
        }
    }
}

/// Paramètres d'une validation ; rien n'est global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub year: i32,
    pub weekday_names: WeekdayNames,
    pub columns: RosterColumns,
    pub quarter: QuarterWindow,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_holidays: Vec<NaiveDate>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            year: 2026,
            weekday_names: WeekdayNames::german(),
            columns: RosterColumns::default(),
            quarter: QuarterWindow::default(),
            extra_holidays: Vec::new(),
        }
    }
}
