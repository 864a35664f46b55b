//! A/B Simulation Example
//!
//! Drives an experiment engine with synthetic traffic and prints the ranked
//! report a dashboard would poll.
//!
//! Run with: cargo run --example ab_simulation
//! Verbose:  RUST_LOG=trueno_ab=debug cargo run --example ab_simulation

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use trueno_ab::analysis::{AnalysisConfig, ConfidenceModel};
use trueno_ab::experiment::Experiment;
use trueno_ab::report::SortOrder;
use trueno_ab::ExperimentEngine;

const EXPERIMENT_JSON: &str = r#"{
    "name": "pricing-page",
    "control_id": "monthly",
    "variants": [
        {"id": "monthly", "weight": 50, "config": {"default_plan": "monthly", "price": 29}},
        {"id": "annual", "weight": 25, "config": {"default_plan": "annual", "price": 290}},
        {"id": "trial", "weight": 25, "config": {"default_plan": "trial", "price": 0}}
    ]
}"#;

const VISITORS: usize = 20_000;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "simulation failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    println!("=== Trueno-AB Pricing Experiment ===\n");

    let experiment =
        Experiment::from_json(EXPERIMENT_JSON).context("failed to load experiment config")?;

    for (label, model) in [
        ("Heuristic confidence", ConfidenceModel::Heuristic),
        ("Two-proportion z-test", ConfidenceModel::TwoProportionZ),
    ] {
        let analysis = AnalysisConfig::builder().confidence_model(model).build();
        let engine = ExperimentEngine::with_analysis(experiment.clone(), analysis);
        simulate(&engine)?;
        print_report(label, &engine)?;
    }

    Ok(())
}

/// Synthetic traffic: each variant converts at a fixed underlying rate.
fn simulate(engine: &ExperimentEngine) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(2024);

    for i in 0..VISITORS {
        let visitor = format!("visitor-{i:06}");
        let variant = engine.record_visit(&visitor)?;

        let (rate, price) = match variant.id() {
            "annual" => (0.012, 290.0),
            "trial" => (0.009, 29.0),
            _ => (0.007, 29.0),
        };
        if rng.gen_bool(rate) {
            engine
                .record_conversion(&visitor, Some(price))
                .with_context(|| format!("recording conversion for {visitor}"))?;
        }
    }

    info!(visitors = VISITORS, "simulation complete");
    Ok(())
}

fn print_report(label: &str, engine: &ExperimentEngine) -> Result<()> {
    let report = engine.report();

    println!("{label}");
    println!("{}", "-".repeat(label.len()));
    println!(
        "   {:<10} {:>8} {:>6} {:>8} {:>10} {:>9} {:>7}",
        "variant", "visitors", "conv", "rate", "revenue", "lift", "conf"
    );
    for result in report.ranked(SortOrder::Descending) {
        let metrics = result.metrics();
        println!(
            "   {:<10} {:>8} {:>6} {:>7.3}% {:>10.2} {:>+8.1}% {:>7.1}{}",
            result.variant_id(),
            metrics.visitors(),
            metrics.conversions(),
            result.conversion_rate() * 100.0,
            metrics.revenue(),
            result.improvement_pct(),
            result.confidence(),
            if result.is_winner() { "  <- winner" } else { "" },
        );
    }

    match report.winner() {
        Some(winner) => println!("\n   Winner: {}", winner.variant_id()),
        None => println!("\n   No winner yet"),
    }
    println!("\n   JSON for dashboards:\n{}\n", report.to_json()?);
    Ok(())
}
