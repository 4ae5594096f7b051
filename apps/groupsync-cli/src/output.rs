//! Report rendering for the terminal and for `--json`.

use std::fmt::Write as _;

use groupsync_reconcile::{Outcome, RunReport};

use crate::error::CliResult;

/// Check if colors should be used (respects NO_COLOR env var)
pub fn use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// Render the comparison report and patch summary.
pub fn render_report(report: &RunReport, color: bool) -> String {
    let mut out = String::new();
    let border = "═".repeat(59);
    let title = format!("{} → {}", report.source_group, report.target_group);

    let _ = writeln!(out, "{}", border);
    let _ = writeln!(out, "{:^59}", title);
    let _ = writeln!(out, "{}", border);
    let _ = writeln!(out);

    let key = |k: &str| paint(&format!("{}:", k), "1", color);
    let _ = writeln!(
        out,
        "  {} {}",
        key("Entra ID members"),
        group_count(report.source_group_id.as_deref(), report.source_member_count)
    );
    let _ = writeln!(
        out,
        "  {} {}",
        key("Netskope members"),
        group_count(report.target_group_id.as_deref(), report.target_member_count)
    );
    let _ = writeln!(out);

    if report.source_group_id.is_none() {
        let _ = writeln!(
            out,
            "{} Entra group '{}' not found; nothing to compare.",
            paint("Warning:", "33", color),
            report.source_group
        );
        return out;
    }

    if report.missing.is_empty() {
        let _ = writeln!(
            out,
            "{} All users in the Entra group appear to be present in the Netskope group.",
            paint("✓", "32", color)
        );
        return out;
    }

    let _ = writeln!(out, "Users in Entra group but missing in Netskope group:");
    for name in &report.missing {
        let _ = writeln!(out, "  - {}", name);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Total users to potentially add: {}", report.missing.len());

    if !report.unresolved.is_empty() {
        let _ = writeln!(out);
        for user in &report.unresolved {
            let _ = writeln!(
                out,
                "{} {} ({}): {}",
                paint("Warning:", "33", color),
                user.display_name,
                user.principal_name,
                user.reason
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", outcome_line(report, color));
    out
}

fn group_count(id: Option<&str>, count: usize) -> String {
    match id {
        Some(_) => count.to_string(),
        None => "group not found".to_string(),
    }
}

fn outcome_line(report: &RunReport, color: bool) -> String {
    let resolved = report.resolved.len();
    match &report.outcome {
        Outcome::AllPresent => "Nothing to add.".to_string(),
        Outcome::NothingResolved => format!(
            "{} None of the missing users exist in Netskope; no update sent.",
            paint("Warning:", "33", color)
        ),
        Outcome::TargetGroupMissing => format!(
            "{} Netskope group '{}' not found; {} resolved user(s) not added.",
            paint("Warning:", "33", color),
            report.target_group,
            resolved
        ),
        Outcome::DryRun => format!(
            "Dry run: would add {} user(s) to '{}'.",
            resolved, report.target_group
        ),
        Outcome::Declined => "Update declined; no changes made.".to_string(),
        Outcome::Patched { status, added } => format!(
            "{} Added {} user(s) to '{}' (HTTP {}).",
            paint("✓", "32", color),
            added,
            report.target_group,
            status
        ),
        Outcome::PatchRejected { status, body } => format!(
            "{} Netskope rejected the update (HTTP {}): {}",
            paint("✗", "31", color),
            status,
            body
        ),
        Outcome::PatchFailed { error } => format!(
            "{} Update could not be sent: {}",
            paint("✗", "31", color),
            error
        ),
    }
}

/// Print the rendered report to stdout.
pub fn print_report(report: &RunReport) {
    print!("{}", render_report(report, use_color()));
}

/// Print the report as pretty JSON to stdout.
pub fn print_json(report: &RunReport) -> CliResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}
