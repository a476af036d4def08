#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use garde::{
    config::{export_config_json, load_config_from_file, MonthConfig},
    io,
    scheduler::{Scheduler, SearchOptions, Violation},
    storage::{JsonStorage, Storage},
};
use clap::{Parser, Subcommand};
use std::ops::ControlFlow;
use std::time::Duration;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération des tableaux de garde
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

/// Entrées communes : personnel, congés, configuration du mois.
#[derive(clap::Args, Debug)]
struct Inputs {
    /// CSV du personnel
    #[arg(long)]
    staff: String,
    /// CSV des congés / restrictions
    #[arg(long)]
    leave: Option<String>,
    /// JSON de configuration du mois
    #[arg(long)]
    config: Option<String>,
    #[arg(long)]
    year: i32,
    #[arg(long)]
    month: u32,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer le tableau du mois
    Generate {
        #[command(flatten)]
        inputs: Inputs,
        /// Nombre d'essais
        #[arg(long, default_value_t = 2000)]
        iterations: usize,
        #[arg(long, default_value_t = 256)]
        batch_size: usize,
        /// Graine (recherche reproductible)
        #[arg(long)]
        seed: Option<u64>,
        /// Désactive le parallélisme
        #[arg(long)]
        sequential: bool,
        /// Budget de temps en secondes
        #[arg(long)]
        time_budget: Option<u64>,
        /// Tableau JSON de sortie
        #[arg(long, default_value = "roster.json")]
        out: String,
        #[arg(long)]
        out_csv: Option<String>,
        #[arg(long)]
        audit_csv: Option<String>,
    },

    /// Vérifier un tableau (éventuellement modifié à la main)
    Check {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long, default_value = "roster.json")]
        roster: String,
        /// Export CSV des violations (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Compteurs de gardes par personne
    Audit {
        #[command(flatten)]
        inputs: Inputs,
        #[arg(long, default_value = "roster.json")]
        roster: String,
        #[arg(long)]
        out: Option<String>,
    },

    /// Écrire une configuration de mois par défaut
    InitConfig {
        #[arg(long)]
        out: String,
    },
}

fn build_scheduler(inputs: &Inputs) -> Result<Scheduler> {
    let staff = io::import_staff_csv(&inputs.staff)
        .with_context(|| format!("loading staff from {}", inputs.staff))?;
    let leave = match &inputs.leave {
        Some(path) => io::import_leave_csv(path)?,
        None => Default::default(),
    };
    let config = match &inputs.config {
        Some(path) => load_config_from_file(path)?,
        None => MonthConfig::default(),
    };
    let scheduler = Scheduler::for_month(staff, &leave, &config, inputs.year, inputs.month)?;
    Ok(scheduler)
}

fn print_violations(violations: &[Violation]) {
    for v in violations {
        eprintln!("  {v}");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Generate {
            inputs,
            iterations,
            batch_size,
            seed,
            sequential,
            time_budget,
            out,
            out_csv,
            audit_csv,
        } => {
            let scheduler = build_scheduler(&inputs)?;
            let opts = SearchOptions {
                iterations,
                batch_size,
                seed,
                parallel: !sequential,
                time_budget: time_budget.map(Duration::from_secs),
            };
            let outcome = scheduler.generate_with_progress(opts, |p| {
                eprintln!(
                    "{}/{} trials, best score {:.2} (penalty {})",
                    p.trials_run, p.total_trials, p.best_score, p.best_penalty
                );
                ControlFlow::Continue(())
            })?;

            JsonStorage::open(&out).save(&outcome.roster)?;
            if let Some(path) = out_csv {
                io::export_roster_csv(path, &outcome.roster)?;
            }
            if let Some(path) = audit_csv {
                io::export_audit_csv(path, &outcome.audit)?;
            }
            println!(
                "Roster written to {out}: score {:.2}, penalty {}, {} trial(s)",
                outcome.roster.score, outcome.roster.penalty_count, outcome.trials_run
            );
            if outcome.violations.is_empty() {
                0
            } else {
                eprintln!("{} unresolved violation(s)", outcome.violations.len());
                print_violations(&outcome.violations);
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Check {
            inputs,
            roster,
            report,
        } => {
            let scheduler = build_scheduler(&inputs)?;
            let roster = JsonStorage::open(&roster).load()?;
            let violations = scheduler.detect_violations(&roster);
            if violations.is_empty() {
                println!("OK: no violations");
                0
            } else {
                eprintln!("Found {} violation(s)", violations.len());
                print_violations(&violations);
                if let Some(path) = report {
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["date", "slot", "staff", "kind"])?;
                    for v in &violations {
                        let date = v.date.to_string();
                        w.write_record([
                            date.as_str(),
                            v.slot.map(|s| s.column()).unwrap_or(""),
                            v.staff.as_deref().unwrap_or(""),
                            v.kind.as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                2
            }
        }
        Commands::Audit {
            inputs,
            roster,
            out,
        } => {
            let scheduler = build_scheduler(&inputs)?;
            let roster = JsonStorage::open(&roster).load()?;
            let audit = scheduler.audit(&roster);
            if let Some(path) = out {
                io::export_audit_csv(path, &audit)?;
            }
            for row in &audit {
                println!(
                    "{} | on-call {} (special {}) | T1 {} T2 {} T3 {} | passive {} | elot {} | minor-ot {} | wound {}",
                    row.name,
                    row.on_call_total,
                    row.special_on_call,
                    row.tier1,
                    row.tier2,
                    row.tier3,
                    row.passive,
                    row.elot,
                    row.minor_ot,
                    row.wound
                );
            }
            println!("score {:.2}", scheduler.score_roster(&roster));
            0
        }
        Commands::InitConfig { out } => {
            export_config_json(&out, &MonthConfig::default())?;
            println!("Config written to {out}");
            0
        }
    };

    std::process::exit(code);
}
