//! Console output formatting.

use crate::analysis::{Advice, AnalyticsReport};
use crate::models::{format_date, Outcome};
use crate::tracker::{Listing, Upcoming};
use colored::*;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Render rows as a rounded console table.
pub fn table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Render a listing as a console or Markdown table.
pub fn listing_table(listing: &Listing, markdown: bool) -> String {
    let mut builder = Builder::default();
    builder.set_header(listing.columns.iter().map(|c| c.to_string()));
    for row in &listing.rows {
        builder.push_record(row.iter().cloned());
    }

    let mut table = builder.build();
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    table.to_string()
}

/// Plain-text analytics summary for the console.
pub fn analytics_text(report: &AnalyticsReport) -> String {
    let mut out = String::new();
    let companies = &report.companies;
    let engagements = &report.engagements;
    let queries = &report.queries;

    out.push_str(&format!("Companies tracked: {}\n", companies.total));
    if companies.total > 0 {
        out.push_str(&format!("\nIndustries\n{}\n", table(&companies.by_industry)));
        if !companies.technologies.is_empty() {
            out.push_str(&format!(
                "\nTechnologies\n{}\n",
                table(&companies.technologies)
            ));
        }
    }

    out.push_str(&format!("\nEngagements logged: {}\n", engagements.total));
    match engagements.response_rate {
        Some(rate) => {
            out.push_str(&format!("Overall response rate: {:.1}%\n", rate));
            out.push_str(&format!(
                "\nResponse rate by platform\n{}\n",
                table(&engagements.by_platform)
            ));
            out.push_str(&format!(
                "\nResponse rate by engagement type\n{}\n",
                table(&engagements.by_type)
            ));
            out.push_str(&format!("\nStatus\n{}\n", table(&engagements.by_status)));
        }
        None => out.push_str("No engagement data available for response rate.\n"),
    }
    out.push_str(&format!("\nFunnel\n{}\n", table(&engagements.funnel)));

    if let Some(ref times) = engagements.response_time {
        out.push_str(&format!(
            "\nAverage response time: {:.1} hours ({} timed, fastest {:.1}, slowest {:.1})\n",
            times.mean, times.count, times.min, times.max
        ));
    }

    out.push_str(&format!("\nSearch queries saved: {}\n", queries.total));
    if !queries.by_platform.is_empty() {
        let mut builder = Builder::default();
        builder.set_header(
            ["Platform", "Queries", "Mean Rating", "Mean Results"].map(String::from),
        );
        for platform in &queries.by_platform {
            builder.push_record([
                platform.platform.clone(),
                platform.count.to_string(),
                optional_number(platform.mean_rating),
                optional_number(platform.mean_results),
            ]);
        }
        out.push_str(&format!(
            "\n{}\n",
            builder.build().with(Style::rounded()).to_string()
        ));
    }
    if !queries.top_keywords.is_empty() {
        out.push_str(&format!("\nTop keywords\n{}\n", table(&queries.top_keywords)));
    }

    out.push_str(&format!("\nSuggestions\n{}", advice_text(&report.advice)));

    out
}

/// Numbered suggestions, or the insufficient-data note.
pub fn advice_text(advice: &Advice) -> String {
    match advice {
        Advice::InsufficientData => "Not enough data yet to make suggestions.\n".to_string(),
        Advice::Suggestions(suggestions) => suggestions
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. [{}] {}\n", i + 1, s.rule, s.message))
            .collect(),
    }
}

pub fn upcoming_text(upcoming: &Upcoming) -> String {
    if upcoming.actions.is_empty() {
        return "No upcoming actions scheduled\n".to_string();
    }

    format!(
        "Upcoming actions in the next {} day(s) ({} to {})\n{}\n",
        upcoming.days,
        format_date(upcoming.start),
        format_date(upcoming.end),
        table(&upcoming.actions)
    )
}

fn optional_number(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Print an outcome and its warnings.
pub fn print_outcome(outcome: &Outcome) {
    if outcome.success {
        print_success(&outcome.message);
    } else {
        print_error(&outcome.message);
    }
    print_warnings(&outcome.warnings);
}

pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        print_warning(warning);
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}
