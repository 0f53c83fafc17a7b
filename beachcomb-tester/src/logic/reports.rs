use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use super::simulation::RunOutcome;

/// Serializable summary of one (policy, seed) run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub policy: String,
    pub seed: u64,
    pub events: usize,
    pub passed: bool,
    pub final_level: u32,
    pub coins: u64,
    pub best_streak: u32,
    pub items_found: usize,
    pub items_sold: usize,
    pub digs: usize,
    pub hits: usize,
    pub misses: usize,
    pub purchases: usize,
    pub levels_cleared: usize,
    pub checkpoints: usize,
    pub failures: Vec<String>,
}

impl From<&RunOutcome> for RunReport {
    fn from(outcome: &RunOutcome) -> Self {
        let state = &outcome.final_state;
        Self {
            policy: outcome.policy.to_string(),
            seed: outcome.seed,
            events: outcome.events,
            passed: outcome.passed(),
            final_level: state.player_level,
            coins: state.coins,
            best_streak: state.best_streak,
            items_found: state.collection.len(),
            items_sold: state.collection.iter().filter(|item| item.sold).count(),
            digs: outcome.tally.digs,
            hits: outcome.tally.hits,
            misses: outcome.tally.misses,
            purchases: outcome.tally.purchases,
            levels_cleared: outcome.tally.levels_cleared,
            checkpoints: outcome.tally.checkpoints,
            failures: outcome.failures.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonEnvelope<'a> {
    generated_at: DateTime<Utc>,
    runs: &'a [RunReport],
}

fn success_rate(reports: &[RunReport]) -> f64 {
    if reports.is_empty() {
        return 0.0;
    }
    let passed = reports.iter().filter(|r| r.passed).count();
    #[allow(clippy::cast_precision_loss)]
    let rate = (passed as f64 / reports.len() as f64) * 100.0;
    rate
}

fn hit_rate(report: &RunReport) -> f64 {
    if report.digs == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = (report.hits as f64 / report.digs as f64) * 100.0;
    rate
}

pub fn generate_console_report(
    out: &mut dyn Write,
    reports: &[RunReport],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Simulation Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=============================".cyan())?;

    let passed = reports.iter().filter(|r| r.passed).count();
    writeln!(out, "Total runs: {}", reports.len())?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (reports.len() - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(reports))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for report in reports {
        let status = if report.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {} seed {}",
            status,
            report.policy.bold(),
            report.seed
        )?;
        writeln!(
            out,
            "   Level {} | {} coins | best streak {}",
            report.final_level, report.coins, report.best_streak
        )?;
        writeln!(
            out,
            "   Found {} | sold {} | hit rate {:.1}% over {} digs",
            report.items_found,
            report.items_sold,
            hit_rate(report),
            report.digs
        )?;
        if !report.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &report.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, reports: &[RunReport]) -> Result<()> {
    let envelope = JsonEnvelope {
        generated_at: Utc::now(),
        runs: reports,
    };
    serde_json::to_writer_pretty(&mut *out, &envelope)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, reports: &[RunReport]) -> Result<()> {
    writeln!(out, "# Beachcomb Simulation Results\n")?;
    writeln!(out, "_Generated {}_\n", Utc::now().format("%Y-%m-%d %H:%M UTC"))?;

    let passed = reports.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {}", reports.len())?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", reports.len() - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(reports))?;

    writeln!(out, "## Runs\n")?;
    writeln!(
        out,
        "| Policy | Seed | Level | Coins | Best streak | Found | Sold | Hit rate | Status |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|---|")?;
    for report in reports {
        let status = if report.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} | {} | {:.1}% | {} |",
            report.policy,
            report.seed,
            report.final_level,
            report.coins,
            report.best_streak,
            report.items_found,
            report.items_sold,
            hit_rate(report),
            status
        )?;
    }

    let failing: Vec<&RunReport> = reports.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for report in failing {
            writeln!(out, "### {} seed {}\n", report.policy, report.seed)?;
            for failure in &report.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}
