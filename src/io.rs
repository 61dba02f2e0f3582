use crate::calendar::{parse_date_de, DateParseError};
use crate::config::RosterColumns;
use crate::model::{InvertedInterval, RosterRow, Unavailability, Unit, UnitId};
use anyhow::Context;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

const BOM: char = '\u{feff}';

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("line {line}: {source}")]
    InvalidDate {
        line: usize,
        #[source]
        source: DateParseError,
    },
    #[error("line {line}: invalid weight `{value}`")]
    InvalidWeight { line: usize, value: String },
    #[error("line {line}: weight must be >= 0, got {value}")]
    NegativeWeight { line: usize, value: f64 },
    #[error("line {line}: {source}")]
    InvertedInterval {
        line: usize,
        #[source]
        source: InvertedInterval,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    Comment,
    /// Premier champ non entier (ligne d'en-tête ou ligne cassée).
    Header,
}

/// Résultat du parsing d'une ligne de configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Unit(Unit),
    Skipped(SkipReason),
}

/// Parse une ligne `id;pensum%;jours préférés;indisponibilités`.
pub fn parse_unit_line(raw: &str, line: usize) -> Result<LineOutcome, RegistryError> {
    let trimmed = raw.trim().trim_start_matches(BOM);
    if trimmed.trim().is_empty() {
        return Ok(LineOutcome::Skipped(SkipReason::Blank));
    }
    if trimmed.starts_with('#') {
        return Ok(LineOutcome::Skipped(SkipReason::Comment));
    }

    let mut fields: Vec<&str> = trimmed.split(';').map(str::trim).collect();
    if fields.len() < 4 {
        fields.resize(4, "");
    }

    let Some(id) = UnitId::parse(fields[0]) else {
        return Ok(LineOutcome::Skipped(SkipReason::Header));
    };

    let weight = parse_weight(fields[1], line)?;
    let mut unit = Unit::new(id, weight);
    unit.preferred_weekdays = split_list(fields[2]).map(str::to_owned).collect();
    unit.unavailable = split_list(fields[3])
        .map(|token| parse_unavailability(token, line))
        .collect::<Result<_, _>>()?;
    Ok(LineOutcome::Unit(unit))
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}

fn parse_weight(raw: &str, line: usize) -> Result<f64, RegistryError> {
    let cleaned = raw.replace('%', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    let value: f64 = cleaned
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| RegistryError::InvalidWeight {
            line,
            value: raw.to_string(),
        })?;
    if value < 0.0 {
        return Err(RegistryError::NegativeWeight { line, value });
    }
    Ok(value)
}

/// `dd.mm.yyyy` ou `dd.mm.yyyy-dd.mm.yyyy` (coupé au premier tiret).
fn parse_unavailability(token: &str, line: usize) -> Result<Unavailability, RegistryError> {
    let date = |raw: &str| {
        parse_date_de(raw.trim()).map_err(|source| RegistryError::InvalidDate { line, source })
    };
    match token.split_once('-') {
        Some((start, end)) => Unavailability::new(date(start)?, date(end)?)
            .map_err(|source| RegistryError::InvertedInterval { line, source }),
        None => Ok(Unavailability::single(date(token)?)),
    }
}

/// Lit toutes les unités, dans l'ordre du fichier.
pub fn read_units<R: BufRead>(reader: R) -> Result<Vec<Unit>, RegistryError> {
    let mut out: Vec<Unit> = Vec::new();
    for (idx, raw) in reader.lines().enumerate() {
        let raw = raw?;
        let line = idx + 1;
        match parse_unit_line(&raw, line)? {
            LineOutcome::Unit(unit) => {
                if out.iter().any(|u| u.id == unit.id) {
                    warn!(unit = %unit.id, line, "duplicate unit id, last definition wins");
                }
                out.push(unit);
            }
            LineOutcome::Skipped(reason) => debug!(line, ?reason, "skipping registry line"),
        }
    }
    Ok(out)
}

/// Import des unités depuis un fichier `;`-délimité.
pub fn import_units_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Unit>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("reading {}", path.display()))?;
    let units = read_units(BufReader::new(file))
        .with_context(|| format!("parsing unit registry {}", path.display()))?;
    info!(count = units.len(), path = %path.display(), "unit registry loaded");
    Ok(units)
}

/// Lit le plan (en-tête obligatoire) ; aucune validation à ce stade.
pub fn read_roster<R: Read>(reader: R, columns: &RosterColumns) -> Result<Vec<RosterRow>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().trim_start_matches(BOM).trim() == name)
    };
    let date_idx = position(&columns.date);
    let weekday_idx = position(&columns.weekday);
    let unit_idx = position(&columns.unit);
    if date_idx.is_none() || unit_idx.is_none() {
        warn!(?columns, "roster header lacks expected columns");
    }

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let field = |idx: Option<usize>| {
            idx.and_then(|i| rec.get(i))
                .map(str::trim)
                .unwrap_or("")
                .to_string()
        };
        out.push(RosterRow {
            date: field(date_idx),
            weekday: field(weekday_idx),
            unit: field(unit_idx),
        });
    }
    Ok(out)
}

pub fn import_roster_csv<P: AsRef<Path>>(
    path: P,
    columns: &RosterColumns,
) -> anyhow::Result<Vec<RosterRow>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("reading {}", path.display()))?;
    let rows = read_roster(file, columns)
        .with_context(|| format!("parsing roster {}", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "roster loaded");
    Ok(rows)
}

/// Liste de jours fériés : dates `dd.mm.yyyy` séparées par retour à la
/// ligne, virgule ou point-virgule ; `#` commente le reste de la ligne.
pub fn read_holidays<R: BufRead>(reader: R) -> anyhow::Result<Vec<NaiveDate>> {
    let mut out = Vec::new();
    for (idx, raw) in reader.lines().enumerate() {
        let raw = raw?;
        let content = raw.split('#').next().unwrap_or("").trim_start_matches(BOM);
        for token in content
            .split([',', ';'])
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            let date =
                parse_date_de(token).with_context(|| format!("holiday list line {}", idx + 1))?;
            out.push(date);
        }
    }
    Ok(out)
}

pub fn import_holidays<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<NaiveDate>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("reading {}", path.display()))?;
    read_holidays(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn unit(outcome: LineOutcome) -> Unit {
        match outcome {
            LineOutcome::Unit(u) => u,
            other => panic!("expected unit, got {other:?}"),
        }
    }

    #[test]
    fn weight_percent_and_lists() {
        let u = unit(
            parse_unit_line(
                "7; 12.5% ;Montag, Freitag ,;03.02.2026, 10.08.2026-21.08.2026",
                1,
            )
            .unwrap(),
        );
        assert_eq!(u.id, UnitId::new(7));
        assert_eq!(u.weight, 12.5);
        assert_eq!(u.preferred_weekdays, vec!["Montag", "Freitag"]);
        assert_eq!(u.unavailable.len(), 2);
        assert!(u.unavailable[0].is_single());
        assert_eq!(u.unavailable[0].start(), d(2026, 2, 3));
        assert_eq!(u.unavailable[1].start(), d(2026, 8, 10));
        assert_eq!(u.unavailable[1].end(), d(2026, 8, 21));
    }

    #[test]
    fn short_lines_are_padded() {
        let u = unit(parse_unit_line("3", 1).unwrap());
        assert_eq!(u.weight, 0.0);
        assert!(u.preferred_weekdays.is_empty());
        assert!(u.unavailable.is_empty());
    }

    #[test]
    fn header_comment_and_blank_lines_are_skipped() {
        assert_eq!(
            parse_unit_line("\u{feff}Nummer;Pensum;Lieblingstage;Verhinderungen", 1).unwrap(),
            LineOutcome::Skipped(SkipReason::Header)
        );
        assert_eq!(
            parse_unit_line("  # Kommentar", 2).unwrap(),
            LineOutcome::Skipped(SkipReason::Comment)
        );
        assert_eq!(
            parse_unit_line("   ", 3).unwrap(),
            LineOutcome::Skipped(SkipReason::Blank)
        );
    }

    #[test]
    fn bom_before_first_unit_is_ignored() {
        let u = unit(parse_unit_line("\u{feff}1;50%;;", 1).unwrap());
        assert_eq!(u.id, UnitId::new(1));
    }

    #[test]
    fn malformed_unavailability_date_is_fatal() {
        let err = parse_unit_line("1;10;;32.01.2026", 4).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDate { line: 4, .. }));
        let err = parse_unit_line("1;10;;01.02.2026-bald", 5).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDate { line: 5, .. }));
    }

    #[test]
    fn bad_weights_are_fatal() {
        assert!(matches!(
            parse_unit_line("1;abc;;", 2).unwrap_err(),
            RegistryError::InvalidWeight { line: 2, .. }
        ));
        assert!(matches!(
            parse_unit_line("1;-5%;;", 3).unwrap_err(),
            RegistryError::NegativeWeight { line: 3, .. }
        ));
    }

    #[test]
    fn inverted_range_is_fatal() {
        assert!(matches!(
            parse_unit_line("1;10;;21.08.2026-10.08.2026", 9).unwrap_err(),
            RegistryError::InvertedInterval { line: 9, .. }
        ));
    }

    #[test]
    fn registry_keeps_file_order() {
        let src = "\u{feff}Nummer;Pensum;Lieblingstage;Verhinderungen\n# test\n\n2;30%;Dienstag;\n1;70%;;\n";
        let units = read_units(src.as_bytes()).unwrap();
        let ids: Vec<i64> = units.iter().map(|u| u.id.get()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn roster_columns_are_looked_up_by_name() {
        let src = "UnitId;Date;WeekdayName;Extra\n 3 ;02.01.2026;Freitag;x\n4;05.01.2026\n";
        let rows = read_roster(src.as_bytes(), &RosterColumns::default()).unwrap();
        assert_eq!(
            rows,
            vec![
                RosterRow::new("02.01.2026", "Freitag", "3"),
                RosterRow::new("05.01.2026", "", "4"),
            ]
        );
    }

    #[test]
    fn roster_missing_column_defaults_to_empty() {
        let src = "Datum;Abteilungsnummer\n02.01.2026;3\n";
        let rows = read_roster(src.as_bytes(), &RosterColumns::german()).unwrap();
        assert_eq!(rows, vec![RosterRow::new("02.01.2026", "", "3")]);
    }

    #[test]
    fn roster_header_bom_is_ignored() {
        let src = "\u{feff}Date;WeekdayName;UnitId\n02.01.2026;Freitag;3\n";
        let rows = read_roster(src.as_bytes(), &RosterColumns::default()).unwrap();
        assert_eq!(rows[0].date, "02.01.2026");
    }

    #[test]
    fn holiday_list_accepts_mixed_separators() {
        let src = "# Feiertage 2027\n01.01.2027, 26.03.2027\n29.03.2027;01.05.2027 # Tag der Arbeit\n";
        let days = read_holidays(src.as_bytes()).unwrap();
        assert_eq!(days.len(), 4);
        assert_eq!(days[3], d(2027, 5, 1));
        assert!(read_holidays("01.13.2027".as_bytes()).is_err());
    }
}
