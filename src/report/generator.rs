//! Markdown and JSON report generation.
//!
//! Renders an analytics snapshot the way the web dashboard presents it:
//! a stat-card overview, the per-job histogram, the 14-day upload
//! window, and the matched/unmatched breakdown.

use crate::models::{AnalyticsSnapshot, MATCH_THRESHOLD};
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Where the snapshot came from, for the report header.
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Store endpoint or local file the records were read from.
    pub source: String,
    /// Key pattern that was listed.
    pub pattern: String,
    /// When the snapshot was computed.
    pub generated_at: DateTime<Utc>,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(snapshot: &AnalyticsSnapshot, context: &ReportContext) -> String {
    let mut output = String::new();

    output.push_str("# Resume Analytics\n\n");
    output.push_str(&generate_metadata_section(context));
    output.push_str(&generate_overview_section(snapshot));
    output.push_str(&generate_jobs_section(snapshot));
    output.push_str(&generate_uploads_section(snapshot));
    output.push_str(&generate_match_section(snapshot));
    output.push_str(&generate_footer());

    output
}

/// Generate the snapshot as pretty-printed JSON (camelCase fields).
pub fn generate_json_report(snapshot: &AnalyticsSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Generate the metadata section.
fn generate_metadata_section(context: &ReportContext) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", context.source));
    section.push_str(&format!("- **Pattern:** `{}`\n", context.pattern));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        context.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push('\n');

    section
}

/// Generate the stat-card overview.
fn generate_overview_section(snapshot: &AnalyticsSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str("| Resumes Uploaded | Job Listings | AI Analyses | Match Success Rate |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {}% |\n\n",
        snapshot.total_resumes,
        snapshot.total_jobs,
        snapshot.total_analyses,
        snapshot.match_success_rate
    ));

    section
}

/// Generate the resumes-per-job table.
fn generate_jobs_section(snapshot: &AnalyticsSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Resumes Analyzed per Job\n\n");

    if snapshot.resumes_per_job.is_empty() {
        section.push_str("No resumes on record.\n\n");
        return section;
    }

    section.push_str("| Job | Resumes |\n");
    section.push_str("|:---|:---:|\n");
    for entry in &snapshot.resumes_per_job {
        section.push_str(&format!("| {} | {} |\n", entry.job, entry.count));
    }
    section.push('\n');

    section
}

/// Generate the uploads-over-time table.
fn generate_uploads_section(snapshot: &AnalyticsSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Resume Uploads Over Time\n\n");
    section.push_str("| Date | Uploads |\n");
    section.push_str("|:---|:---:|\n");
    for bucket in &snapshot.uploads_over_time {
        section.push_str(&format!("| {} | {} |\n", bucket.date, bucket.count));
    }
    section.push('\n');

    section
}

/// Generate the matched/unmatched breakdown.
fn generate_match_section(snapshot: &AnalyticsSnapshot) -> String {
    let mut section = String::new();

    section.push_str("## Matched vs Unmatched\n\n");
    section.push_str(&format!(
        "Resumes scoring {} or higher count as matched.\n\n",
        MATCH_THRESHOLD as u32
    ));
    section.push_str("| Outcome | Resumes |\n");
    section.push_str("|:---|:---:|\n");
    for stat in &snapshot.match_stats {
        section.push_str(&format!("| {} | {} |\n", stat.name, stat.value));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Generated by resumetrics v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}
