//! # Step Report Rendering
//!
//! Plain-text form of a [`StepReport`] as written to the progress log:
//! a summary line, the per-candidate table, then the component table.

use mol_core::{RunResult, StepReport};
use std::fmt::Write;

/// Formats seconds as `1h 02m 03s`, dropping leading zero units.
pub fn format_duration(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.round() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

pub fn render_report(report: &StepReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "[{}] step {}/{}  fraction valid {:.2}%  mean score {:.4}  sigma {:.2}  elapsed {}  remaining {}",
        report.job_name,
        report.step + 1,
        report.n_steps,
        report.fraction_valid,
        report.mean_score,
        report.sigma,
        format_duration(report.elapsed_secs),
        format_duration(report.remaining_secs),
    );

    let _ = write!(out, "{:>10} {:>10} {:>10} {:>7}", "agent", "prior", "target", "score");
    for name in &report.component_names {
        let _ = write!(out, " {:>12}", truncate(name, 12));
    }
    let _ = writeln!(out, "  smiles");
    for row in &report.rows {
        let _ = write!(
            out,
            "{:>10.2} {:>10.2} {:>10.2} {:>7.4}",
            row.agent, row.prior, row.target, row.score
        );
        for value in &row.components {
            let _ = write!(out, " {value:>12.4}");
        }
        let _ = writeln!(out, "  {}", row.smiles);
    }

    if !report.component_names.is_empty() {
        let _ = writeln!(out, "{:<32} {:>10}", "component", "mean");
        for (name, mean) in report.component_names.iter().zip(&report.component_means) {
            let _ = writeln!(out, "{:<32} {mean:>10.4}", truncate(name, 32));
        }
    }
    out
}

pub fn render_summary(result: &RunResult) -> String {
    let mut out = format!(
        "[{}] {} finished after {} step(s)",
        result.job_name, result.run_type, result.steps_completed
    );
    if let Some(score) = result.final_mean_score {
        let _ = write!(out, "  final mean score {score:.4}");
    }
    if let Some(valid) = result.fraction_valid {
        let _ = write!(out, "  fraction valid {valid:.2}%");
    }
    if result.agent_resets > 0 {
        let _ = write!(out, "  resets {}", result.agent_resets);
    }
    out.push('\n');
    out
}

fn truncate(s: &str, width: usize) -> &str {
    match s.char_indices().nth(width) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
