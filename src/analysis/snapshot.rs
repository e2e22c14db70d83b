//! One-shot analytics over all three record kinds.

use super::advisor::{advise, Advice};
use super::aggregator::{
    explode_tag_counts, group_counts, keyword_counts, mean_numeric, percentage, response_rate,
    response_rate_by_group, response_time_stats, status_funnel, GroupCount, GroupRate,
    ResponseTimeStats, StageCount, TagCount,
};
use crate::models::{parse_number, text, Company, Engagement, Query, FUNNEL_STAGES};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Company-side statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyStats {
    pub total: usize,
    pub by_industry: Vec<GroupCount>,
    /// The `top_n` most common technologies.
    pub technologies: Vec<TagCount>,
    /// Every technology tag, for the tag cloud.
    #[serde(skip)]
    pub all_technologies: Vec<TagCount>,
    pub by_status: Vec<GroupCount>,
}

/// Engagement-side statistics.
#[derive(Debug, Clone, Serialize)]
pub struct EngagementStats {
    pub total: usize,
    pub by_platform: Vec<GroupRate>,
    pub by_type: Vec<GroupRate>,
    /// `None` when there are no engagements.
    pub response_rate: Option<f64>,
    pub by_status: Vec<GroupCount>,
    pub funnel: Vec<StageCount>,
    /// `None` when no numeric response times exist.
    pub response_time: Option<ResponseTimeStats>,
}

/// Per-platform query statistics.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPlatformStats {
    pub platform: String,
    pub count: usize,
    pub mean_rating: Option<f64>,
    pub mean_results: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryStats {
    pub total: usize,
    pub by_platform: Vec<QueryPlatformStats>,
    pub top_keywords: Vec<TagCount>,
}

/// Everything shown by an analytics run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub generated_at: DateTime<Utc>,
    pub companies: CompanyStats,
    pub engagements: EngagementStats,
    pub queries: QueryStats,
    pub advice: Advice,
    /// Aggregate warnings from loading (e.g. skipped rows).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AnalyticsReport {
    /// Build the report; `top_n` caps the tag and keyword lists.
    pub fn build(
        companies: &[Company],
        engagements: &[Engagement],
        queries: &[Query],
        top_n: usize,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            companies: company_stats(companies, top_n),
            engagements: engagement_stats(engagements),
            queries: query_stats(queries, top_n),
            advice: advise(companies, engagements),
            warnings: Vec::new(),
        }
    }

    /// Share of engagements at a status, for the status breakdown.
    pub fn status_share(&self, count: usize) -> f64 {
        percentage(count, self.engagements.total)
    }
}

fn company_stats(companies: &[Company], top_n: usize) -> CompanyStats {
    let all_technologies = explode_tag_counts(companies, |c| c.technologies.as_str(), ',');
    let technologies = all_technologies.iter().take(top_n).cloned().collect();

    CompanyStats {
        total: companies.len(),
        by_industry: group_counts(companies, |c| c.industry.as_str()),
        technologies,
        all_technologies,
        by_status: group_counts(companies, |c| text(&c.contact_status)),
    }
}

fn engagement_stats(engagements: &[Engagement]) -> EngagementStats {
    EngagementStats {
        total: engagements.len(),
        by_platform: response_rate_by_group(engagements, |e| e.platform.as_str()),
        by_type: response_rate_by_group(engagements, |e| e.engagement_type.as_str()),
        response_rate: response_rate(engagements).ok(),
        by_status: group_counts(engagements, |e| e.status()),
        funnel: status_funnel(engagements, &FUNNEL_STAGES),
        response_time: response_time_stats(engagements).ok(),
    }
}

fn query_stats(queries: &[Query], top_n: usize) -> QueryStats {
    let by_platform = group_counts(queries, |q| q.platform.as_str())
        .into_iter()
        .map(|group| {
            let members: Vec<&Query> = queries
                .iter()
                .filter(|q| q.platform.trim() == group.value)
                .collect();
            QueryPlatformStats {
                mean_rating: mean_numeric(&members, |q| q.rating()),
                mean_results: mean_numeric(&members, |q| parse_number(text(&q.results_count))),
                platform: group.value,
                count: group.count,
            }
        })
        .collect();

    let mut top_keywords = keyword_counts(queries, |q| q.query.as_str());
    top_keywords.truncate(top_n);

    QueryStats {
        total: queries.len(),
        by_platform,
        top_keywords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(platform: &str, text: &str, rating: Option<&str>) -> Query {
        Query {
            platform: platform.to_string(),
            query: text.to_string(),
            effectiveness_rating: rating.map(String::from),
            results_count: Some("20".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_report() {
        let report = AnalyticsReport::build(&[], &[], &[], 10);
        assert_eq!(report.companies.total, 0);
        assert_eq!(report.engagements.response_rate, None);
        assert!(report.engagements.response_time.is_none());
        assert_eq!(report.engagements.funnel.len(), 5);
        assert!(report.queries.by_platform.is_empty());
        assert_eq!(report.advice, Advice::InsufficientData);
    }

    #[test]
    fn test_technology_lists() {
        let companies: Vec<Company> = (0..15)
            .map(|i| Company {
                name: format!("Firm {}", i),
                industry: "Software".to_string(),
                technologies: format!("Tech{}", i),
                ..Default::default()
            })
            .collect();
        let report = AnalyticsReport::build(&companies, &[], &[], 10);

        assert_eq!(report.companies.technologies.len(), 10);
        assert_eq!(report.companies.all_technologies.len(), 15);
    }

    #[test]
    fn test_query_stats() {
        let queries = vec![
            query("Indeed", "rust intern", Some("4")),
            query("LinkedIn", "Rust backend", None),
            query("Indeed", "python intern", Some("2")),
        ];
        let report = AnalyticsReport::build(&[], &[], &queries, 2);

        let indeed = &report.queries.by_platform[0];
        assert_eq!(indeed.platform, "Indeed");
        assert_eq!(indeed.count, 2);
        assert_eq!(indeed.mean_rating, Some(3.0));
        assert_eq!(indeed.mean_results, Some(20.0));
        assert_eq!(report.queries.by_platform[1].mean_rating, None);

        assert_eq!(report.queries.top_keywords.len(), 2);
        assert_eq!(report.queries.top_keywords[0].tag, "rust");
    }

    #[test]
    fn test_engagement_stats() {
        let engagements = vec![
            Engagement {
                platform: "LinkedIn".to_string(),
                engagement_type: "Comment".to_string(),
                status: Some("Initial Contact".to_string()),
                ..Default::default()
            },
            Engagement {
                platform: "Email".to_string(),
                engagement_type: "Cold Email".to_string(),
                status: Some("Response Received".to_string()),
                response_received: Some("Sure".to_string()),
                response_time_hours: Some("6".to_string()),
                ..Default::default()
            },
        ];
        let report = AnalyticsReport::build(&[], &engagements, &[], 10);

        assert_eq!(report.engagements.response_rate, Some(50.0));
        assert_eq!(report.engagements.by_platform.len(), 2);
        assert_eq!(report.engagements.funnel[1].count, 1);
        assert_eq!(report.engagements.response_time.as_ref().map(|s| s.mean), Some(6.0));
        assert_eq!(report.status_share(1), 50.0);
    }
}
