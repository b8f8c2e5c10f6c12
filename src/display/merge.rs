//! Merge result display formatting

use crate::envfile::MergeReport;
use crate::services::PersistSummary;

/// Describe what a merge did to an env file
pub fn format_merge_report(report: &MergeReport) -> String {
    if report.appended.is_empty() {
        return "No changes written.".to_string();
    }

    let mut output = String::new();

    for key in &report.archived {
        output.push_str(&format!("  Archived:  {} (kept as comment)\n", key));
    }
    for (from, to) in &report.renamed {
        output.push_str(&format!("  Renamed:   {} -> {}\n", from, to));
    }
    for key in &report.appended {
        output.push_str(&format!("  Written:   {}\n", key));
    }

    output
}

/// Summarize one persisted credential set
pub fn format_persist_summary(summary: &PersistSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Saved credentials for '{}' ({})\n",
        summary.app_name, summary.environment
    ));

    match (&summary.env_file, &summary.merge) {
        (Some(path), Some(report)) => {
            output.push_str(&format!("Env file: {}\n", path.display()));
            output.push_str(&format_merge_report(report));
            if !output.ends_with('\n') {
                output.push('\n');
            }
        }
        _ => output.push_str("Env file: not written\n"),
    }

    output.push_str(&format!(
        "Secure history: {}\n",
        if summary.logged { "logged" } else { "off" }
    ));

    for warning in &summary.warnings {
        output.push_str(&format!("Warning: {}\n", warning));
    }

    output
}
