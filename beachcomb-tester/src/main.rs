mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::{parse_policies, parse_seeds, split_csv};
use logic::{RunReport, run_matrix};

#[derive(Debug, Parser)]
#[command(name = "beachcomb-tester", version = "0.1.0")]
#[command(about = "Automated QA harness for Beachcomb - scripted play with invariant checks")]
struct Args {
    /// Seeds to run (comma-separated, decimal or 0x-hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Player policies to run (random, sweeper, oracle or all)
    #[arg(long, default_value = "all")]
    policies: String,

    /// Policy actions per run
    #[arg(long, default_value_t = 400)]
    events: usize,

    /// Save and reload through storage every N events (0 disables)
    #[arg(long, default_value_t = 0)]
    checkpoint_every: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner();

    let start_time = Instant::now();
    let seeds = parse_seeds(&split_csv(&args.seeds))?;
    let policies = parse_policies(&split_csv(&args.policies))?;
    if args.verbose {
        println!(
            "🌊 {} policies × {} seeds, {} events each",
            policies.len(),
            seeds.len(),
            args.events
        );
    }

    let checkpoint_every = (args.checkpoint_every > 0).then_some(args.checkpoint_every);
    let outcomes = run_matrix(&policies, &seeds, args.events, checkpoint_every);
    let reports: Vec<RunReport> = outcomes.iter().map(RunReport::from).collect();

    if args.verbose {
        for report in &reports {
            let status = if report.passed { "✅" } else { "❌" };
            println!(
                "{status} [{} seed {}] level {}",
                report.policy.green(),
                report.seed,
                report.final_level
            );
        }
    }

    write_reports(&args, &reports, start_time)?;

    if reports.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "🏖️ Beachcomb Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn write_reports(args: &Args, reports: &[RunReport], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(output_target.writer(), reports)?,
        "markdown" => logic::reports::generate_markdown_report(output_target.writer(), reports)?,
        _ => logic::reports::generate_console_report(
            output_target.writer(),
            reports,
            start_time.elapsed(),
        )?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
