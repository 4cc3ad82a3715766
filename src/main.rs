//! BreathSense CLI
//!
//! Runs the analytics engine against a dataset file: risk ranking, sensor
//! diagnostics, tenure diagnostics, and synthetic dataset seeding.

use std::error::Error;
use std::process::ExitCode;

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use breathsense_core::export::csv::write_csv;
use breathsense_core::metrics::extractor::sample_date_range;
use breathsense_core::store::Dataset;
use breathsense_core::{
    constants, diagnose_sensors, diagnose_tenure, AnalysisRequest, MemoryStore, RiskAnalyzer,
    Sample, SampleFilter, SampleStore, SortDirection, Subject,
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let Some(command) = args.first() else {
        print_usage();
        return Err("missing command".into());
    };

    match command.as_str() {
        "analyze" => cmd_analyze(&args[1..]),
        "sensors" => cmd_sensors(&args[1..]),
        "demography" => cmd_demography(&args[1..]),
        "seed" => cmd_seed(&args[1..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            Err(format!("unknown command '{other}'").into())
        }
    }
}

fn print_usage() {
    println!(
        "{} {} - risk analytics engine

USAGE:
    breathsense analyze <dataset.json> [--category C] [--from YYYY-MM-DD] [--to YYYY-MM-DD]
                        [--limit N] [--ascending] [--pairwise A] [--criteria] [--csv PATH]
    breathsense sensors <dataset.json>
    breathsense demography <dataset.json>
    breathsense seed <out.json> [--subjects N] [--samples N]",
        constants::APP_NAME,
        constants::APP_VERSION
    );
}

fn take_value(args: &[String], index: &mut usize, flag: &str) -> Result<String, Box<dyn Error>> {
    *index += 1;
    args.get(*index)
        .cloned()
        .ok_or_else(|| format!("{flag} needs a value").into())
}

fn cmd_analyze(args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut dataset_path: Option<String> = None;
    let mut category: Option<String> = None;
    let mut from: Option<String> = None;
    let mut to: Option<String> = None;
    let mut limit: Option<usize> = None;
    let mut ascending = false;
    let mut pairwise = constants::get_pairwise_value();
    let mut use_criteria_table = false;
    let mut csv_path: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--category" => category = Some(take_value(args, &mut i, "--category")?),
            "--from" => from = Some(take_value(args, &mut i, "--from")?),
            "--to" => to = Some(take_value(args, &mut i, "--to")?),
            "--limit" => limit = Some(take_value(args, &mut i, "--limit")?.parse()?),
            "--ascending" => ascending = true,
            "--pairwise" => pairwise = take_value(args, &mut i, "--pairwise")?.parse()?,
            "--criteria" => use_criteria_table = true,
            "--csv" => csv_path = Some(take_value(args, &mut i, "--csv")?),
            other if dataset_path.is_none() && !other.starts_with("--") => {
                dataset_path = Some(other.to_string());
            }
            other => return Err(format!("unknown flag '{other}'").into()),
        }
        i += 1;
    }

    let dataset_path = dataset_path.ok_or("missing dataset path")?;
    let store = MemoryStore::load(&dataset_path)?;
    log::info!(
        "loaded {} subjects, {} samples from {dataset_path}",
        store.subject_count(),
        store.sample_count()
    );

    let filter = SampleFilter::parse(category.as_deref(), from.as_deref(), to.as_deref())?;
    let analyzer = if use_criteria_table {
        RiskAnalyzer::from_criteria(&store, store.active_criteria()?)?
    } else {
        RiskAnalyzer::with_pairwise(&store, pairwise)?
    };

    let request = AnalysisRequest {
        filter,
        limit,
        sort: if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        },
    };
    let report = analyzer.analyze(&request)?;

    if report.records.is_empty() {
        println!("No subjects with qualifying samples under the current filter.");
        return Ok(());
    }

    println!("Weights:");
    for (name, weight) in report.weights.iter() {
        println!("  {name:<24} {:.4}", weight);
    }

    println!("\nRanking ({} subjects):", report.records.len());
    for (position, record) in report.records.iter().enumerate() {
        println!(
            "  {:2}. {:<12} | {:<8} | score: {:6.2}% | max: {:7.2} ppm | positives: {:3}",
            position + 1,
            record.external_id,
            record.tier.as_str(),
            record.score,
            record.severity_metric,
            record.frequency_metric,
        );
    }

    let summary = &report.summary;
    println!("\nPopulation: {} subjects", summary.total_subjects);
    println!("  mean score: {:.2}%", summary.mean_score);
    println!("  max score:  {:.2}%", summary.max_score);
    println!(
        "  tiers: {} critical / {} high / {} medium / {} low",
        summary.tiers.critical, summary.tiers.high, summary.tiers.medium, summary.tiers.low
    );
    if report.skipped_subjects > 0 {
        println!("  skipped subjects: {}", report.skipped_subjects);
    }
    if let Some((first, last)) = sample_date_range(&store)? {
        println!(
            "  sample range: {} .. {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }

    if let Some(path) = csv_path {
        write_csv(&report.records, &path)?;
        println!("\nCSV written to {path}");
    }

    Ok(())
}

fn load_store(args: &[String]) -> Result<MemoryStore, Box<dyn Error>> {
    let path = args
        .first()
        .filter(|a| !a.starts_with("--"))
        .ok_or("missing dataset path")?;
    Ok(MemoryStore::load(path)?)
}

fn cmd_sensors(args: &[String]) -> Result<(), Box<dyn Error>> {
    let store = load_store(args)?;
    let diagnostic = diagnose_sensors(&store)?;

    match diagnostic.coefficient {
        Some(r) => println!("Voltage vs concentration: r = {r:.4}"),
        None => println!("Voltage vs concentration: r = n/a"),
    }
    println!("Verdict: {}", diagnostic.verdict.summary());
    println!("Scatter points: {}", diagnostic.scatter_points.len());
    Ok(())
}

fn cmd_demography(args: &[String]) -> Result<(), Box<dyn Error>> {
    let store = load_store(args)?;
    let diagnostic = diagnose_tenure(&store)?;

    match diagnostic.coefficient {
        Some(r) => println!("Tenure vs concentration: r = {r:.4}"),
        None => println!("Tenure vs concentration: r = n/a"),
    }
    println!("Verdict: {}", diagnostic.verdict.summary());

    if !diagnostic.category_means.is_empty() {
        println!("\nMean concentration by category:");
        for (category, mean) in &diagnostic.category_means {
            println!("  {category:<16} {mean:7.2} ppm");
        }
    }
    Ok(())
}

const CATEGORIES: [&str; 6] = [
    "Logistica",
    "Almacen",
    "Operaciones",
    "Ventas",
    "Seguridad",
    "Administracion",
];

const FIRST_NAMES: [&str; 10] = [
    "Ana", "Carlos", "Lucia", "Miguel", "Sofia", "Jorge", "Elena", "Raul", "Carmen", "Pedro",
];

const LAST_NAMES: [&str; 10] = [
    "Torres", "Ramirez", "Flores", "Castillo", "Mendoza", "Ortega", "Vargas", "Reyes", "Luna",
    "Campos",
];

fn cmd_seed(args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut out_path: Option<String> = None;
    let mut subject_count = 75usize;
    let mut sample_count = 1000usize;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--subjects" => subject_count = take_value(args, &mut i, "--subjects")?.parse()?,
            "--samples" => sample_count = take_value(args, &mut i, "--samples")?.parse()?,
            other if out_path.is_none() && !other.starts_with("--") => {
                out_path = Some(other.to_string());
            }
            other => return Err(format!("unknown flag '{other}'").into()),
        }
        i += 1;
    }

    let out_path = out_path.ok_or("missing output path")?;
    let dataset = generate_dataset(subject_count, sample_count);
    std::fs::write(&out_path, serde_json::to_string_pretty(&dataset)?)?;
    log::info!(
        "wrote {} subjects and {} samples to {out_path}",
        dataset.subjects.len(),
        dataset.samples.len()
    );
    Ok(())
}

fn generate_dataset(subject_count: usize, sample_count: usize) -> Dataset {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    let subjects: Vec<Subject> = (1..=subject_count)
        .map(|i| {
            let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Ana");
            let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Torres");
            Subject {
                external_id: format!("EMP{i:03}"),
                display_name: format!("{first} {last}"),
                category: CATEGORIES.choose(&mut rng).copied().unwrap_or("Ventas").to_string(),
                enrolled_on: Some(
                    now.date_naive() - Duration::days(rng.gen_range(0..5 * 365)),
                ),
            }
        })
        .collect();

    let samples: Vec<Sample> = (0..sample_count)
        .map(|_| {
            let subject = subjects
                .choose(&mut rng)
                .map(|s| s.external_id.clone())
                .unwrap_or_else(|| "EMP001".to_string());
            let (raw_reading, voltage, concentration_ppm) = simulate_reading(&mut rng);
            Sample {
                subject_id: subject,
                raw_reading,
                voltage,
                concentration_ppm,
                taken_at: now - Duration::minutes(rng.gen_range(0..30 * 24 * 60)),
            }
        })
        .collect();

    Dataset {
        subjects,
        samples,
        criteria: vec![],
    }
}

/// Three-band sensor simulation: mostly sober baseline noise, occasional
/// residue, rare genuine intoxication above the alert band.
fn simulate_reading<R: Rng>(rng: &mut R) -> (i32, f64, f64) {
    let roll: f64 = rng.gen();
    let raw_reading = if roll < 0.90 {
        rng.gen_range(100..=180)
    } else if roll < 0.97 {
        rng.gen_range(181..=300)
    } else {
        rng.gen_range(301..=800)
    };

    let voltage = round2(raw_reading as f64 * (5.0 / 1023.0));
    let concentration_ppm = round2(((raw_reading - 100) as f64 * 0.85).max(0.0));
    (raw_reading, voltage, concentration_ppm)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
