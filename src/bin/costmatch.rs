//! costmatch - semantic line-item pricing for construction budgets.
//!
//! Reads a price-base CSV and a project CSV, matches every project row
//! against the catalog and writes a three-file report (`valorado.csv`,
//! `pendientes.csv`, `candidatos.csv`) into the output directory.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use costmatch::{
    match_project_items, read_price_base, read_project_file, write_report, EmbeddingIndex,
    PipelineConfig,
};

struct Args {
    base: PathBuf,
    project: PathBuf,
    out: PathBuf,
    config: Option<PathBuf>,
    top_k: Option<usize>,
}

const USAGE: &str = "usage: costmatch --base <csv> --project <csv> --out <dir> \
                     [--config <yaml>] [--top-k <n>]";

fn parse_args(mut argv: std::env::Args) -> anyhow::Result<Args> {
    argv.next(); // program name

    let mut base = None;
    let mut project = None;
    let mut out = None;
    let mut config = None;
    let mut top_k = None;

    while let Some(flag) = argv.next() {
        let mut value = |name: &str| {
            argv.next()
                .with_context(|| format!("{name} requires a value\n{USAGE}"))
        };
        match flag.as_str() {
            "--base" => base = Some(PathBuf::from(value("--base")?)),
            "--project" => project = Some(PathBuf::from(value("--project")?)),
            "--out" => out = Some(PathBuf::from(value("--out")?)),
            "--config" => config = Some(PathBuf::from(value("--config")?)),
            "--top-k" => {
                let raw = value("--top-k")?;
                top_k = Some(raw.parse().with_context(|| {
                    format!("--top-k expects a positive integer, got {raw:?}")
                })?);
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown flag {other:?}\n{USAGE}"),
        }
    }

    Ok(Args {
        base: base.with_context(|| format!("--base is required\n{USAGE}"))?,
        project: project.with_context(|| format!("--project is required\n{USAGE}"))?,
        out: out.with_context(|| format!("--out is required\n{USAGE}"))?,
        config,
        top_k,
    })
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(top_k) = args.top_k {
        config.matcher.top_k = top_k;
        config.validate().context("applying --top-k override")?;
    }

    // RUST_LOG wins over the configured level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let rules = config.compile_rules().context("compiling matching rules")?;

    let base = read_price_base(&args.base, &config.units)
        .with_context(|| format!("reading price base {}", args.base.display()))?;
    let project = read_project_file(&args.project, &config.units)
        .with_context(|| format!("reading project file {}", args.project.display()))?;
    tracing::info!(
        base_rows = base.len(),
        project_rows = project.len(),
        "inputs loaded"
    );

    let catalog: Vec<String> = base.iter().map(|b| b.description_norm.clone()).collect();
    let index = EmbeddingIndex::build(config.embedding.clone(), &catalog)
        .context("building embedding index over the price base")?;

    let report = match_project_items(&project, &base, &index, &rules, &config.matcher)
        .context("matching project items")?;

    let auto = report
        .outcomes
        .iter()
        .filter(|o| o.decision == costmatch::Decision::Auto)
        .count();
    tracing::info!(
        total = report.outcomes.len(),
        auto,
        pending = report.outcomes.len() - auto,
        shortlist = report.shortlist.len(),
        "matching finished"
    );

    write_report(&args.out, &project, &report)
        .with_context(|| format!("writing report to {}", args.out.display()))?;
    println!("report written to {}", args.out.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(2);
        }
    };
    if let Err(err) = run(args) {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
