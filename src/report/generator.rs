//! Markdown report generation.
//!
//! This module renders an [`AnalyticsReport`] as a sectioned Markdown
//! document or as pretty-printed JSON.

use crate::analysis::aggregator::{GroupCount, GroupRate, ResponseTimeStats, TagCount};
use crate::analysis::snapshot::{CompanyStats, EngagementStats, QueryStats};
use crate::analysis::{Advice, AnalyticsReport};
use anyhow::{Context, Result};
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &AnalyticsReport) -> String {
    let mut output = String::new();

    output.push_str("# Job Search Outreach Report\n\n");

    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_table_of_contents());
    output.push_str(&generate_companies_section(&report.companies));
    output.push_str(&generate_engagements_section(&report.engagements));
    output.push_str(&generate_funnel_section(report));
    output.push_str(&generate_queries_section(&report.queries));
    output.push_str(&generate_suggestions_section(&report.advice));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Companies:** {}\n", report.companies.total));
    section.push_str(&format!(
        "- **Engagements:** {}\n",
        report.engagements.total
    ));
    section.push_str(&format!("- **Search Queries:** {}\n", report.queries.total));

    if !report.warnings.is_empty() {
        section.push_str("\n> **Warnings:**\n");
        for warning in &report.warnings {
            section.push_str(&format!("> - {}\n", warning));
        }
    }
    section.push('\n');

    section
}

fn generate_table_of_contents() -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    for title in ["Companies", "Engagements", "Funnel", "Queries", "Suggestions"] {
        toc.push_str(&format!("- [{}](#{})\n", title, title.to_lowercase()));
    }
    toc.push('\n');

    toc
}

fn generate_companies_section(stats: &CompanyStats) -> String {
    let mut section = String::new();

    section.push_str("## Companies\n\n");
    section.push_str(&format!("**Total companies:** {}\n\n", stats.total));

    if stats.total == 0 {
        section.push_str("No companies tracked yet.\n\n");
        return section;
    }

    section.push_str(&generate_group_table("Industry", &stats.by_industry));
    section.push_str(&generate_group_table("Contact Status", &stats.by_status));

    if !stats.technologies.is_empty() {
        section.push_str("### Technologies\n\n");
        section.push_str(&generate_tag_table("Technology", &stats.technologies));
    }

    section
}

fn generate_engagements_section(stats: &EngagementStats) -> String {
    let mut section = String::new();

    section.push_str("## Engagements\n\n");
    section.push_str(&format!("**Total engagements:** {}\n\n", stats.total));

    match stats.response_rate {
        Some(rate) => {
            section.push_str(&format!("**Overall response rate:** {:.1}%\n\n", rate));
        }
        None => {
            section.push_str("No engagement data available for response rate.\n\n");
            return section;
        }
    }

    section.push_str(&generate_rate_table("Platform", &stats.by_platform));
    section.push_str(&generate_rate_table("Engagement Type", &stats.by_type));
    section.push_str(&generate_group_table("Status", &stats.by_status));

    if let Some(ref times) = stats.response_time {
        section.push_str(&generate_response_time_block(times));
    }

    section
}

/// Generate the funnel section in stage order.
fn generate_funnel_section(report: &AnalyticsReport) -> String {
    let mut section = String::new();

    section.push_str("## Funnel\n\n");
    section.push_str("| Stage | Engagements | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");

    for stage in &report.engagements.funnel {
        section.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            stage.stage,
            stage.count,
            report.status_share(stage.count)
        ));
    }
    section.push('\n');

    section
}

fn generate_queries_section(stats: &QueryStats) -> String {
    let mut section = String::new();

    section.push_str("## Queries\n\n");
    section.push_str(&format!("**Total search queries:** {}\n\n", stats.total));

    if stats.by_platform.is_empty() {
        return section;
    }

    section.push_str("### By Platform\n\n");
    section.push_str("| Platform | Queries | Mean Rating | Mean Results |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for platform in &stats.by_platform {
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            group_label(&platform.platform),
            platform.count,
            optional_number(platform.mean_rating),
            optional_number(platform.mean_results)
        ));
    }
    section.push('\n');

    if !stats.top_keywords.is_empty() {
        section.push_str("### Top Keywords\n\n");
        section.push_str(&generate_tag_table("Keyword", &stats.top_keywords));
    }

    section
}

/// Generate the suggestions section.
fn generate_suggestions_section(advice: &Advice) -> String {
    let mut section = String::new();

    section.push_str("## Suggestions\n\n");

    match advice {
        Advice::InsufficientData => {
            section.push_str("Not enough data yet to make suggestions.\n\n");
        }
        Advice::Suggestions(suggestions) => {
            for (i, suggestion) in suggestions.iter().enumerate() {
                section.push_str(&format!(
                    "{}. **{}:** {}\n",
                    i + 1,
                    suggestion.rule,
                    suggestion.message
                ));
            }
            section.push('\n');
        }
    }

    section
}

fn generate_group_table(title: &str, groups: &[GroupCount]) -> String {
    if groups.is_empty() {
        return String::new();
    }

    let mut table = String::new();
    table.push_str(&format!("### By {}\n\n", title));
    table.push_str(&format!("| {} | Count | Percentage |\n", title));
    table.push_str("|:---|:---:|:---:|\n");
    for group in groups {
        table.push_str(&format!(
            "| {} | {} | {:.1}% |\n",
            group_label(&group.value),
            group.count,
            group.percentage
        ));
    }
    table.push('\n');

    table
}

fn generate_rate_table(title: &str, groups: &[GroupRate]) -> String {
    if groups.is_empty() {
        return String::new();
    }

    let mut table = String::new();
    table.push_str(&format!("### Response Rate by {}\n\n", title));
    table.push_str(&format!("| {} | Engagements | Responses | Rate |\n", title));
    table.push_str("|:---|:---:|:---:|:---:|\n");
    for group in groups {
        table.push_str(&format!(
            "| {} | {} | {} | {:.1}% |\n",
            group_label(&group.group),
            group.count,
            group.hits,
            group.rate
        ));
    }
    table.push('\n');

    table
}

fn generate_tag_table(title: &str, tags: &[TagCount]) -> String {
    let mut table = String::new();
    table.push_str(&format!("| {} | Count |\n", title));
    table.push_str("|:---|:---:|\n");
    for tag in tags {
        table.push_str(&format!("| {} | {} |\n", tag.tag, tag.count));
    }
    table.push('\n');

    table
}

fn generate_response_time_block(times: &ResponseTimeStats) -> String {
    format!(
        "### Response Time\n\n- **Responses timed:** {}\n- **Mean:** {:.1} hours\n- **Fastest:** {:.1} hours\n- **Slowest:** {:.1} hours\n\n",
        times.count, times.mean, times.min, times.max
    )
}

fn group_label(value: &str) -> &str {
    if value.is_empty() {
        "(unspecified)"
    } else {
        value
    }
}

fn optional_number(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by outreach-tracker*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AnalyticsReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
