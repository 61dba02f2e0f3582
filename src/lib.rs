#![forbid(unsafe_code)]
//! Plancheck — validation d'un plan de service annuel (un jour ouvré → une unité).
//!
//! - Lecture des fichiers `;`-délimités (unités, plan).
//! - Contrôle des règles : week-end, jours fériés, jour de semaine, indisponibilités.
//! - Cibles proportionnelles par plus forts restes (année, mois, fin d'année).
//! - Séries consécutives, jours préférés, rapports CSV/Markdown/JSON.

pub mod analysis;
pub mod apportion;
pub mod calendar;
pub mod config;
pub mod io;
pub mod model;
pub mod report;
pub mod rules;

pub use analysis::{analyze, Analysis};
pub use apportion::compute_targets;
pub use calendar::{Calendar, CalendarError, WeekdayNames};
pub use config::{QuarterWindow, RosterColumns, ValidationConfig};
pub use model::{RosterEntry, RosterRow, Unavailability, Unit, UnitId, Violation, ViolationKind};
pub use report::{export_reports, render_summary};
pub use rules::{check_roster, CheckOutcome};

use anyhow::Context;
use std::path::Path;

/// Valide un plan déjà lu. Seule la construction du calendrier peut échouer.
pub fn validate(
    rows: &[RosterRow],
    units: &[Unit],
    config: &ValidationConfig,
) -> Result<Analysis, CalendarError> {
    let calendar = Calendar::resolve(
        config.year,
        &config.extra_holidays,
        config.weekday_names.clone(),
    )?;
    let outcome = check_roster(rows, units, &calendar);
    Ok(analyze(&outcome, units, &calendar, config.quarter))
}

/// Lit les deux fichiers puis valide. Les erreurs de configuration ou
/// d'accès fichier interrompent la validation.
pub fn validate_files<P: AsRef<Path>, Q: AsRef<Path>>(
    plan: P,
    units: Q,
    config: &ValidationConfig,
) -> anyhow::Result<Analysis> {
    let units = io::import_units_csv(units)?;
    let rows = io::import_roster_csv(plan, &config.columns)?;
    validate(&rows, &units, config).context("building calendar")
}
