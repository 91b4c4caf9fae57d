//! insights-runner: headless insight report over a case table.
//!
//! Usage:
//!   insights-runner --cases cases.csv --sla-sheet SLA_sheet.csv
//!   insights-runner --cases cases.csv --config insights.json --now "2024-06-30 00:00:00" --json
//!   insights-runner --synthetic 500 --seed 12345 --context

use anyhow::{bail, Context, Result};
use caseflow_core::{
    clock::ReportClock,
    config::InsightsConfig,
    context::NarrativeContext,
    engine::InsightEngine,
    report::InsightReport,
    sample::{generate_records, SyntheticSpec},
    table::CaseTable,
    timestamp::parse_timestamp,
};
use std::env;
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let cases = flag_value(&args, "--cases");
    let sla_sheet = flag_value(&args, "--sla-sheet");
    let config_path = flag_value(&args, "--config");
    let now = flag_value(&args, "--now");
    let synthetic = parse_arg(&args, "--synthetic", 0usize);
    let seed = parse_arg(&args, "--seed", 42u64);
    let as_json = args.iter().any(|a| a == "--json");
    let as_context = args.iter().any(|a| a == "--context");

    let config = match config_path {
        Some(path) => InsightsConfig::load(path)
            .with_context(|| format!("loading configuration from {path}"))?,
        None => InsightsConfig::default(),
    };

    let clock = match now {
        Some(raw) => match parse_timestamp(raw) {
            Some(ts) => ReportClock::fixed(ts),
            None => bail!("--now: unrecognized timestamp '{raw}'"),
        },
        None => ReportClock::system(),
    };

    let engine = InsightEngine::build(config, sla_sheet.map(Path::new), clock)
        .context("building insight engine")?;

    let table: CaseTable = match (cases, synthetic) {
        (Some(path), _) => engine
            .load_cases(path)
            .with_context(|| format!("loading case table {path}"))?,
        (None, n) if n > 0 => {
            // Synthetic tables end at the report clock so ages look realistic.
            let mut spec = SyntheticSpec::new(n, seed, engine.clock.now);
            spec.start -= chrono::Duration::days(spec.span_days);
            engine.normalize_records(generate_records(&spec))
        }
        _ => bail!("either --cases FILE or --synthetic N is required"),
    };

    let report = engine.generate_report(&table);
    log::info!(
        "Report over {} cases: {} recommendations, {} warnings",
        table.len(),
        report.recommendations.len(),
        report.warnings.len(),
    );

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if as_context {
        let context = NarrativeContext::build(&report, &table, engine.resolver().defaults());
        print!("{}", context.render());
    } else {
        print_summary(&report, cases.unwrap_or("synthetic"), seed);
    }

    Ok(())
}

fn print_summary(report: &InsightReport, input: &str, seed: u64) {
    let es = &report.executive_summary;
    let kpis = &report.insights.kpis;

    println!("caseflow insights-runner");
    println!("  input:        {input}");
    if input == "synthetic" {
        println!("  seed:         {seed}");
    }
    println!("  generated at: {}", report.generated_at);
    println!();

    println!("=== EXECUTIVE SUMMARY ===");
    println!("  total cases:        {}", es.total_cases);
    println!("  closure rate:       {:.2}%", es.closure_rate);
    println!("  sla compliance:     {:.2}%", es.sla_compliance_rate);
    println!("  sla breaches:       {}", kpis.sla_breaches);
    match kpis.avg_resolution_time {
        Some(avg) => println!("  avg resolution:     {avg:.1} days"),
        None      => println!("  avg resolution:     n/a"),
    }
    println!("  high priority open: {}", es.high_priority_open);
    println!("  sla at risk:        {}", es.sla_at_risk_count);
    println!("  aging cases:        {}", es.aging_cases_count);

    if !es.top_risk_areas.is_empty() {
        println!();
        println!("=== TOP RISK AREAS ===");
        for area in &es.top_risk_areas {
            println!("  {:<26} | {:<24} | {}", area.risk_type, area.area, area.count);
        }
    }

    println!();
    println!("=== RECOMMENDATIONS ===");
    if report.recommendations.is_empty() {
        println!("  (none)");
    }
    for rec in report.recommendations_by_priority() {
        println!("  [{:?}] {}: {}", rec.priority, rec.category, rec.recommendation);
        for item in &rec.action_items {
            println!("      - {item}");
        }
    }

    if !report.warnings.is_empty() {
        println!();
        println!("=== WARNINGS ===");
        for w in &report.warnings {
            println!("  {}", serde_json::to_string(w).unwrap_or_else(|_| format!("{w:?}")));
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
