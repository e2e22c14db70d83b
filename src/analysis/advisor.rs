//! Heuristic strategy suggestions.
//!
//! A fixed, ordered list of rules runs over the aggregator outputs. Each rule
//! either produces one suggestion or stays silent. Nothing is persisted
//! between runs.

use super::aggregator::{
    explode_tag_counts, rate_by_group, response_rate_by_group, response_time_stats, GroupRate,
};
use crate::models::{Company, Engagement};
use serde::Serialize;
use std::fmt;

/// Minimum engagements on a platform before it is compared.
pub const MIN_PLATFORM_SAMPLE: usize = 5;
/// Minimum occurrences of an engagement type before it is compared.
pub const MIN_TYPE_SAMPLE: usize = 5;
/// Minimum companies in an industry before it is compared.
pub const MIN_INDUSTRY_SAMPLE: usize = 3;
/// Best platform must beat the worst by more than this factor.
pub const PLATFORM_GAP_FACTOR: f64 = 1.5;
/// Floor for the recommended follow-up window, in hours.
pub const MIN_FOLLOW_UP_HOURS: f64 = 48.0;

/// Which heuristic produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    PlatformEffectiveness,
    EngagementType,
    IndustryFocus,
    TechnologyFocus,
    ResponseTime,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::PlatformEffectiveness => write!(f, "Platform"),
            Rule::EngagementType => write!(f, "Engagement Type"),
            Rule::IndustryFocus => write!(f, "Industry"),
            Rule::TechnologyFocus => write!(f, "Technology"),
            Rule::ResponseTime => write!(f, "Follow-up"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub rule: Rule,
    pub message: String,
}

/// Result of running every rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "suggestions", rename_all = "snake_case")]
pub enum Advice {
    Suggestions(Vec<Suggestion>),
    InsufficientData,
}

impl Advice {
    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            Advice::Suggestions(list) => list,
            Advice::InsufficientData => &[],
        }
    }
}

/// Run every rule in order.
pub fn advise(companies: &[Company], engagements: &[Engagement]) -> Advice {
    let suggestions: Vec<Suggestion> = [
        platform_effectiveness(engagements),
        engagement_type_effectiveness(engagements),
        industry_focus(companies),
        technology_focus(companies),
        response_time_guidance(engagements),
    ]
    .into_iter()
    .flatten()
    .collect();

    if suggestions.is_empty() {
        Advice::InsufficientData
    } else {
        Advice::Suggestions(suggestions)
    }
}

/// Highest rate; ties go to the earliest group.
fn best(rates: &[GroupRate]) -> Option<&GroupRate> {
    rates
        .iter()
        .fold(None, |best: Option<&GroupRate>, r| match best {
            Some(b) if b.rate >= r.rate => Some(b),
            _ => Some(r),
        })
}

/// Lowest rate; ties go to the earliest group.
fn worst(rates: &[GroupRate]) -> Option<&GroupRate> {
    rates
        .iter()
        .fold(None, |worst: Option<&GroupRate>, r| match worst {
            Some(w) if w.rate <= r.rate => Some(w),
            _ => Some(r),
        })
}

/// Named groups with at least `min_sample` records. Blank groups never qualify.
fn qualified(mut rates: Vec<GroupRate>, min_sample: usize) -> Vec<GroupRate> {
    rates.retain(|r| r.count >= min_sample && !r.group.is_empty());
    rates
}

pub fn platform_effectiveness(engagements: &[Engagement]) -> Option<Suggestion> {
    let rates = qualified(
        response_rate_by_group(engagements, |e| e.platform.as_str()),
        MIN_PLATFORM_SAMPLE,
    );
    let top = best(&rates)?;
    let bottom = worst(&rates)?;

    (top.rate > PLATFORM_GAP_FACTOR * bottom.rate).then(|| Suggestion {
        rule: Rule::PlatformEffectiveness,
        message: format!(
            "Focus more on {} which has a {:.1}% response rate compared to {}'s {:.1}%.",
            top.group, top.rate, bottom.group, bottom.rate
        ),
    })
}

pub fn engagement_type_effectiveness(engagements: &[Engagement]) -> Option<Suggestion> {
    let rates = qualified(
        response_rate_by_group(engagements, |e| e.engagement_type.as_str()),
        MIN_TYPE_SAMPLE,
    );
    let top = best(&rates)?;

    Some(Suggestion {
        rule: Rule::EngagementType,
        message: format!(
            "'{}' engagements get the highest response rate at {:.1}%. Use this approach more often.",
            top.group, top.rate
        ),
    })
}

pub fn industry_focus(companies: &[Company]) -> Option<Suggestion> {
    let rates = qualified(
        rate_by_group(companies, |c| c.industry.as_str(), Company::is_success),
        MIN_INDUSTRY_SAMPLE,
    );
    let top = best(&rates)?;

    (top.rate > 0.0).then(|| Suggestion {
        rule: Rule::IndustryFocus,
        message: format!(
            "Companies in the {} industry show the most progress ({:.1}%). Consider focusing on this sector.",
            top.group, top.rate
        ),
    })
}

pub fn technology_focus(companies: &[Company]) -> Option<Suggestion> {
    let tags = explode_tag_counts(companies, |c| c.technologies.as_str(), ',');
    let top = tags.first()?;

    Some(Suggestion {
        rule: Rule::TechnologyFocus,
        message: format!(
            "{} appears most often in job requirements. Make sure your portfolio highlights projects using it.",
            top.tag
        ),
    })
}

pub fn response_time_guidance(engagements: &[Engagement]) -> Option<Suggestion> {
    let stats = response_time_stats(engagements).ok()?;
    let window = MIN_FOLLOW_UP_HOURS.max(2.0 * stats.mean);

    Some(Suggestion {
        rule: Rule::ResponseTime,
        message: format!(
            "Average response time is {:.1} hours. Follow up if there is no response within {:.0} hours.",
            stats.mean, window
        ),
    })
}
