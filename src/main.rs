use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

mod artifacts;
mod batch;
mod error;
mod models;
mod pipeline;
mod report;

use artifacts::ArtifactStore;
use error::ScoreError;
use models::PatientRecord;

#[derive(Parser)]
#[command(name = "risk-screener")]
#[command(about = "Diabetes risk screening against pretrained model artifacts", long_about = None)]
struct Cli {
    /// Path to the serialized feature scaler
    #[arg(long, default_value = artifacts::DEFAULT_SCALER_PATH)]
    scaler: PathBuf,
    /// Path to the serialized classifier
    #[arg(long, default_value = artifacts::DEFAULT_MODEL_PATH)]
    model: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the loaded artifact schema
    Inspect,
    /// Score a single patient from command-line measurements
    Predict {
        #[arg(long, default_value_t = 0)]
        pregnancies: u32,
        #[arg(long, default_value_t = 120)]
        glucose: u32,
        #[arg(long, default_value_t = 70)]
        blood_pressure: u32,
        #[arg(long, default_value_t = 20)]
        skin_thickness: u32,
        #[arg(long, default_value_t = 120)]
        insulin: u32,
        #[arg(long, default_value_t = 32.0)]
        bmi: f64,
        #[arg(long, default_value_t = 0.5)]
        diabetes_pedigree: f64,
        #[arg(long, default_value_t = 30)]
        age: u32,
    },
    /// Score patients from a CSV file
    Batch {
        #[arg(long)]
        csv: PathBuf,
        /// Write the full assessment list as JSON
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Generate a markdown report for a CSV cohort
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = ArtifactStore::new(&cli.scaler, &cli.model);
    // Scoring is impossible without the artifact pair; fail here, before any
    // input is collected.
    let loaded = store.get().context("failed to load model artifacts")?;

    match cli.command {
        Commands::Inspect => {
            println!("Model: {}", loaded.classifier.model_name);
            println!("Features ({}):", loaded.scaler.n_features());
            for name in loaded.scaler.feature_names.iter() {
                println!("- {name}");
            }
        }
        Commands::Predict {
            pregnancies,
            glucose,
            blood_pressure,
            skin_thickness,
            insulin,
            bmi,
            diabetes_pedigree,
            age,
        } => {
            let record = PatientRecord {
                pregnancies,
                glucose,
                blood_pressure,
                skin_thickness,
                insulin,
                bmi,
                diabetes_pedigree,
                age,
            };

            match pipeline::score(&record, &loaded.scaler, &loaded.classifier) {
                Ok(result) => {
                    println!("Diabetes risk probability: {:.2}", result.probability);
                    println!("Risk level: {}", result.risk_band);
                    println!("{}", result.advisory());
                }
                Err(ScoreError::Input(reason)) => {
                    eprintln!("Invalid input: {reason}");
                    std::process::exit(2);
                }
                Err(error) => return Err(error.into()),
            }
        }
        Commands::Batch { csv, out, limit } => {
            let outcome = batch::score_csv(&csv, &store)?;

            if outcome.assessments.is_empty() {
                println!("No patient rows found in {}.", csv.display());
            } else {
                let mut ranked: Vec<_> = outcome.assessments.iter().collect();
                ranked.sort_by(|a, b| {
                    b.result
                        .probability
                        .partial_cmp(&a.result.probability)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

                println!("Top patients by risk probability:");
                for assessment in ranked.iter().take(limit) {
                    println!(
                        "- {} probability {:.2} ({})",
                        assessment.patient,
                        assessment.result.probability,
                        assessment.result.risk_band
                    );
                }
            }

            if outcome.skipped > 0 {
                println!("Skipped {} invalid rows.", outcome.skipped);
            }

            if let Some(out) = out {
                let json = serde_json::to_string_pretty(&outcome.assessments)?;
                std::fs::write(&out, json)?;
                println!("Assessments written to {}.", out.display());
            }
        }
        Commands::Report { csv, out } => {
            let outcome = batch::score_csv(&csv, &store)?;
            if outcome.skipped > 0 {
                println!("Skipped {} invalid rows.", outcome.skipped);
            }

            let report = report::build_report(
                &csv.display().to_string(),
                Utc::now(),
                &outcome.assessments,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
