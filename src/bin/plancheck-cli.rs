#![forbid(unsafe_code)]
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use plancheck::{
    apportion, calendar::format_date_de, io, report, Calendar, RosterColumns, ValidationConfig,
    WeekdayNames,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Validation d'un plan de service annuel (règles, quotas, équité)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Année du plan (table des jours fériés, analyse mensuelle)
    #[arg(long, global = true, default_value_t = 2026)]
    year: i32,

    /// Langue des noms de jours de la semaine
    #[arg(long, global = true, value_enum, default_value_t = Locale::De)]
    locale: Locale,

    /// Fichier de jours fériés supplémentaires (dd.mm.yyyy)
    #[arg(long, global = true)]
    holidays: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Locale {
    De,
    En,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Columns {
    /// Date;WeekdayName;UnitId
    Default,
    /// Datum;Wochentag;Abteilungsnummer
    German,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Valider un plan contre la configuration des unités
    Validate {
        /// CSV du plan (Date;WeekdayName;UnitId)
        #[arg(long)]
        plan: String,
        /// CSV des unités (id;pensum%;jours préférés;indisponibilités)
        #[arg(long)]
        units: String,
        #[arg(long, value_enum, default_value_t = Columns::Default)]
        columns: Columns,
        /// Dossier d'export des rapports (optionnel)
        #[arg(long)]
        export_dir: Option<String>,
    },

    /// Afficher les cibles proportionnelles pour un nombre de jours
    Targets {
        #[arg(long)]
        units: String,
        #[arg(long)]
        days: usize,
    },

    /// Lister les jours ouvrés par mois
    Calendar {
        /// Afficher chaque date
        #[arg(long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    let mut config = ValidationConfig {
        year: cli.year,
        weekday_names: match cli.locale {
            Locale::De => WeekdayNames::german(),
            Locale::En => WeekdayNames::english(),
        },
        ..ValidationConfig::default()
    };
    if let Some(path) = &cli.holidays {
        config.extra_holidays = io::import_holidays(path)?;
    }

    let code = match cli.cmd {
        Commands::Validate {
            plan,
            units,
            columns,
            export_dir,
        } => {
            config.columns = match columns {
                Columns::Default => RosterColumns::default(),
                Columns::German => RosterColumns::german(),
            };
            let analysis = plancheck::validate_files(&plan, &units, &config)?;
            if let Some(dir) = export_dir {
                let written = report::export_reports(&dir, &analysis)?;
                eprintln!("{} report file(s) written to {dir}", written.len());
            }
            print!("{}", report::render_summary(&analysis));
            if analysis.clean {
                0
            } else {
                eprintln!("Found {} violation(s)", analysis.violations.len());
                // Code 2 = plan non conforme
                2
            }
        }
        Commands::Targets { units, days } => {
            let units = io::import_units_csv(units)?;
            let units = plancheck::analysis::distinct_units(&units);
            let targets = apportion::compute_targets(&units, days);
            for u in &units {
                println!(
                    "{} | {}% → {}",
                    u.id,
                    u.weight,
                    targets.get(&u.id).copied().unwrap_or(0)
                );
            }
            0
        }
        Commands::Calendar { verbose } => {
            let cal = Calendar::resolve(config.year, &config.extra_holidays, config.weekday_names)?;
            for month in 1..=12 {
                let days = cal.working_days_in_month(cal.year(), month);
                println!("{:02}.{} | {} working day(s)", month, cal.year(), days.len());
                if verbose {
                    for d in days {
                        println!("  {} {}", format_date_de(d), cal.weekday_name(d));
                    }
                }
            }
            println!("total | {}", cal.working_days_in_year());
            0
        }
    };

    std::process::exit(code);
}
