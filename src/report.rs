//! Mise en forme des résultats : tables `;`-délimitées, résumé Markdown,
//! export JSON, écriture atomique de l'ensemble.

use crate::analysis::{Analysis, Deviation};
use anyhow::Context;
use csv::WriterBuilder;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

pub const OVERALL_CSV: &str = "validation_overall.csv";
pub const CONSECUTIVE_CSV: &str = "validation_consecutive.csv";
pub const PREFERENCES_CSV: &str = "validation_preferences.csv";
pub const MONTHLY_SUMMARY_CSV: &str = "validation_monthly_summary.csv";
pub const MONTHLY_QUOTA_CSV: &str = "validation_monthly_quota_deviation.csv";
pub const QUARTER_SKEW_CSV: &str = "validation_q4_skew.csv";
pub const WEEKDAYS_CSV: &str = "validation_weekday_distribution.csv";
pub const SUMMARY_MD: &str = "validation_report.md";
pub const ANALYSIS_JSON: &str = "validation_report.json";

/// Table rendue (en-têtes + lignes de cellules texte).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new<const N: usize>(headers: [&str; N]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut w = WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        w.write_record(&self.headers)?;
        for row in &self.rows {
            w.write_record(row)?;
        }
        let bytes = w
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flushing csv buffer: {}", e.error()))?;
        Ok(String::from_utf8(bytes)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!("| {} |\n|", self.headers.join(" | "));
        out.push_str(&"---|".repeat(self.headers.len()));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        out
    }
}

fn int<I: itoa::Integer>(n: I) -> String {
    itoa::Buffer::new().format(n).to_owned()
}

pub fn overall_table(a: &Analysis) -> Table {
    let mut t = Table::new(["UnitId", "Target", "Actual", "Diff"]);
    for d in &a.overall {
        t.push(vec![int(d.unit.get()), int(d.target), int(d.actual), int(d.diff)]);
    }
    t
}

pub fn consecutive_table(a: &Analysis) -> Table {
    let mut t = Table::new(["UnitId", "RunCount"]);
    for r in &a.runs {
        t.push(vec![int(r.unit.get()), int(r.runs)]);
    }
    t
}

pub fn preferences_table(a: &Analysis) -> Table {
    let mut t = Table::new(["UnitId", "Hits", "Total"]);
    for p in &a.preferences {
        t.push(vec![int(p.unit.get()), int(p.hits), int(p.total)]);
    }
    t
}

pub fn monthly_summary_table(a: &Analysis) -> Table {
    let mut t = Table::new(["Month", "UnitId", "Actual", "Hits"]);
    for c in &a.monthly {
        t.push(vec![
            c.month.to_string(),
            int(c.unit.get()),
            int(c.actual),
            int(c.hits),
        ]);
    }
    t
}

pub fn monthly_quota_table(a: &Analysis) -> Table {
    let mut t = Table::new(["Month", "UnitId", "Target", "Actual", "Diff"]);
    for q in &a.monthly_quota {
        let d = &q.deviation;
        t.push(vec![
            q.month.to_string(),
            int(d.unit.get()),
            int(d.target),
            int(d.actual),
            int(d.diff),
        ]);
    }
    t
}

pub fn quarter_skew_table(a: &Analysis) -> Table {
    let mut t = Table::new(["UnitId", "Actual", "Target", "Diff"]);
    for d in &a.quarter.rows {
        t.push(vec![int(d.unit.get()), int(d.actual), int(d.target), int(d.diff)]);
    }
    t
}

pub fn weekday_table(a: &Analysis) -> Table {
    let mut headers = vec!["UnitId".to_string()];
    headers.extend(a.weekdays.names.iter().cloned());
    let rows = a
        .weekdays
        .rows
        .iter()
        .map(|r| {
            std::iter::once(int(r.unit.get()))
                .chain(r.counts.iter().map(|&c| int(c)))
                .collect()
        })
        .collect();
    Table { headers, rows }
}

fn signed(d: &Deviation) -> String {
    format!("{:+}", d.diff)
}

/// Résumé lisible ; les violations précèdent toujours les statistiques.
pub fn render_summary(a: &Analysis) -> String {
    let mut out = format!(
        "# Validation report {}\n\n- Plan days: {}\n- Units: {}\n",
        a.year, a.total_days, a.unit_count
    );
    if a.clean {
        out.push_str("- Status: clean\n");
    } else {
        out.push_str(&format!("- Status: {} violation(s)\n", a.violations.len()));
    }

    out.push_str("\n## Rule violations\n\n");
    if a.violations.is_empty() {
        out.push_str("No hard rule violations (weekend/holiday/unavailability/weekday) found.\n");
    } else {
        for v in &a.violations {
            out.push_str(&format!("- {v}\n"));
        }
    }

    out.push_str("\n## Proportionality (target vs actual, diff = actual - target)\n\n");
    for d in &a.overall {
        out.push_str(&format!(
            "- Unit {}: target {}, actual {}, diff {}\n",
            d.unit,
            d.target,
            d.actual,
            signed(d)
        ));
    }
    out.push('\n');

    let sections = [
        ("Consecutive assignments per unit", consecutive_table(a)),
        ("Preferred weekday hits", preferences_table(a)),
        ("Monthly summary", monthly_summary_table(a)),
        ("Monthly quota deviation", monthly_quota_table(a)),
    ];
    for (title, table) in sections {
        out.push_str(&format!("## {title}\n\n"));
        out.push_str(&table.to_markdown());
        out.push('\n');
    }

    out.push_str(&format!(
        "## Quarter-end skew (months {}-{}, {} working days)\n\n",
        a.quarter.window.first_month, a.quarter.window.last_month, a.quarter.working_days
    ));
    out.push_str(&quarter_skew_table(a).to_markdown());
    out.push_str("\n## Weekday distribution\n\n");
    out.push_str(&weekday_table(a).to_markdown());
    out
}

/// Rend tous les artefacts en mémoire, sans rien écrire.
pub fn render_all(a: &Analysis) -> anyhow::Result<Vec<(&'static str, String)>> {
    Ok(vec![
        (OVERALL_CSV, overall_table(a).to_csv()?),
        (CONSECUTIVE_CSV, consecutive_table(a).to_csv()?),
        (PREFERENCES_CSV, preferences_table(a).to_csv()?),
        (MONTHLY_SUMMARY_CSV, monthly_summary_table(a).to_csv()?),
        (MONTHLY_QUOTA_CSV, monthly_quota_table(a).to_csv()?),
        (QUARTER_SKEW_CSV, quarter_skew_table(a).to_csv()?),
        (WEEKDAYS_CSV, weekday_table(a).to_csv()?),
        (SUMMARY_MD, render_summary(a)),
        (ANALYSIS_JSON, serde_json::to_string_pretty(a)?),
    ])
}

/// Écrit le jeu complet de rapports. Tous les fichiers sont d'abord rendus
/// et écrits dans des fichiers temporaires du répertoire cible ; les
/// renommages n'ont lieu qu'ensuite. Un échec de rendu ou d'écriture laisse
/// le répertoire intact, chaque remplacement reste atomique.
pub fn export_reports<P: AsRef<Path>>(dir: P, a: &Analysis) -> anyhow::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let artifacts = render_all(a)?;
    fs::create_dir_all(dir).with_context(|| format!("creating report directory {}", dir.display()))?;

    let mut staged = Vec::with_capacity(artifacts.len());
    for (name, content) in artifacts {
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(content.as_bytes())
            .with_context(|| format!("writing {name}"))?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        staged.push((dir.join(name), tmp));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (path, tmp) in staged {
        tmp.persist(&path)
            .with_context(|| format!("atomic rename to {}", path.display()))?;
        written.push(path);
    }
    info!(dir = %dir.display(), files = written.len(), "reports exported");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_table_has_separator_row() {
        let mut t = Table::new(["UnitId", "Hits", "Total"]);
        t.push(vec!["1".into(), "2".into(), "4".into()]);
        insta::assert_snapshot!(t.to_markdown(), @r"
        | UnitId | Hits | Total |
        |---|---|---|
        | 1 | 2 | 4 |
        ");
    }

    #[test]
    fn empty_markdown_table_keeps_header() {
        let t = Table::new(["Month"]);
        assert_eq!(t.to_markdown(), "| Month |\n|---|\n");
    }
}
