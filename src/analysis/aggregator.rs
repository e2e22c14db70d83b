//! Grouped counts, rates and statistics over loaded records.
//!
//! Everything here is a pure function of the records passed in. Groups are
//! reported in first-appearance order unless noted otherwise.

use crate::error::{Result, TrackerError};
use crate::models::Engagement;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tabled::Tabled;

/// Count of records sharing one field value.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct GroupCount {
    #[tabled(rename = "Value", display_with = "display_group")]
    pub value: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Percentage", display_with = "display_percent")]
    pub percentage: f64,
}

/// Frequency of one tag across all records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct TagCount {
    #[tabled(rename = "Tag")]
    pub tag: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// Hit rate within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct GroupRate {
    #[tabled(rename = "Group", display_with = "display_group")]
    pub group: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Hits")]
    pub hits: usize,
    /// Unrounded percentage; round when displaying.
    #[tabled(rename = "Rate", display_with = "display_percent")]
    pub rate: f64,
}

/// Exact-match count for one funnel stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct StageCount {
    #[tabled(rename = "Stage")]
    pub stage: String,
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// Summary of numeric response times, in hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseTimeStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / total` as a percentage rounded to one decimal place.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 * 100.0 / total as f64)
}

fn display_percent(value: &f64) -> String {
    format!("{:.1}%", value)
}

fn display_group(value: &String) -> String {
    if value.is_empty() {
        "(unspecified)".to_string()
    } else {
        value.clone()
    }
}

/// Tally keys in first-appearance order.
fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for key in keys {
        match index.get(key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key, order.len());
                order.push((key.to_string(), 1));
            }
        }
    }

    order
}

/// Count records by field value, most common first.
///
/// Blank values form their own group so the percentages always sum to 100.
pub fn group_counts<R, F>(records: &[R], field: F) -> Vec<GroupCount>
where
    F: Fn(&R) -> &str,
{
    let total = records.len();
    let mut counts = tally(records.iter().map(|r| field(r).trim()));
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

    counts
        .into_iter()
        .map(|(value, count)| GroupCount {
            value,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

/// Split a delimited field into trimmed tags and count them, most common
/// first. Blank values and empty fragments contribute nothing.
pub fn explode_tag_counts<R, F>(records: &[R], field: F, separator: char) -> Vec<TagCount>
where
    F: Fn(&R) -> &str,
{
    let tags = records
        .iter()
        .flat_map(|r| field(r).split(separator))
        .map(str::trim)
        .filter(|tag| !tag.is_empty());

    let mut counts = tally(tags);
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

    counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect()
}

/// Count lowercase whitespace-separated keywords in a free-text field.
pub fn keyword_counts<R, F>(records: &[R], field: F) -> Vec<TagCount>
where
    F: Fn(&R) -> &str,
{
    let lowered: Vec<String> = records.iter().map(|r| field(r).to_lowercase()).collect();

    let mut counts = tally(lowered.iter().flat_map(|text| text.split_whitespace()));
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

    counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect()
}

/// Percentage of records satisfying `hit`, or `DivisionUndefined` when empty.
pub fn hit_rate<R, H>(records: &[R], hit: H) -> Result<f64>
where
    H: Fn(&R) -> bool,
{
    if records.is_empty() {
        return Err(TrackerError::DivisionUndefined);
    }
    let hits = records.iter().filter(|r| hit(*r)).count();
    Ok(hits as f64 * 100.0 / records.len() as f64)
}

/// Per-group hit rate, groups in first-appearance order.
pub fn rate_by_group<R, F, H>(records: &[R], group: F, hit: H) -> Vec<GroupRate>
where
    F: Fn(&R) -> &str,
    H: Fn(&R) -> bool,
{
    let mut rates: Vec<GroupRate> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = group(record).trim();
        let i = match index.get(key) {
            Some(&i) => i,
            None => {
                index.insert(key.to_string(), rates.len());
                rates.push(GroupRate {
                    group: key.to_string(),
                    count: 0,
                    hits: 0,
                    rate: 0.0,
                });
                rates.len() - 1
            }
        };
        rates[i].count += 1;
        if hit(record) {
            rates[i].hits += 1;
        }
    }

    for rate in &mut rates {
        rate.rate = rate.hits as f64 * 100.0 / rate.count as f64;
    }

    rates
}

/// Share of engagements that got a response, to one decimal place.
pub fn response_rate(records: &[Engagement]) -> Result<f64> {
    hit_rate(records, Engagement::has_response).map(round1)
}

/// Response rate within each group of engagements.
pub fn response_rate_by_group<F>(records: &[Engagement], group: F) -> Vec<GroupRate>
where
    F: Fn(&Engagement) -> &str,
{
    rate_by_group(records, group, Engagement::has_response)
}

/// Exact-match count per stage, in the given stage order. Not cumulative.
pub fn status_funnel(records: &[Engagement], stages: &[&str]) -> Vec<StageCount> {
    stages
        .iter()
        .map(|stage| StageCount {
            stage: stage.to_string(),
            count: records.iter().filter(|e| e.status() == *stage).count(),
        })
        .collect()
}

/// Statistics over numeric response times; non-numeric values are ignored.
pub fn response_time_stats(records: &[Engagement]) -> Result<ResponseTimeStats> {
    let times: Vec<f64> = records.iter().filter_map(Engagement::response_time).collect();

    if times.is_empty() {
        return Err(TrackerError::NoData("response times"));
    }

    let sum: f64 = times.iter().sum();
    Ok(ResponseTimeStats {
        count: times.len(),
        mean: sum / times.len() as f64,
        min: times.iter().copied().fold(f64::INFINITY, f64::min),
        max: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Mean of the values `field` can parse, if any.
pub fn mean_numeric<R, F>(records: &[R], field: F) -> Option<f64>
where
    F: Fn(&R) -> Option<f64>,
{
    let values: Vec<f64> = records.iter().filter_map(field).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Engagements whose next action falls in `[start, end]`, earliest first.
///
/// Missing or unparseable dates are left out.
pub fn upcoming_actions(
    records: &[Engagement],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<(&Engagement, NaiveDate)> {
    let mut upcoming: Vec<_> = records
        .iter()
        .filter_map(|e| e.next_action_on().map(|date| (e, date)))
        .filter(|(_, date)| *date >= start && *date <= end)
        .collect();

    upcoming.sort_by_key(|(_, date)| *date);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{format_date, Company, FUNNEL_STAGES};
    use chrono::Duration;

    fn engagement(platform: &str, responded: bool) -> Engagement {
        Engagement {
            contact_name: "Jane".to_string(),
            company: "Acme".to_string(),
            platform: platform.to_string(),
            engagement_type: "Comment".to_string(),
            response_received: responded.then(|| "Thanks".to_string()),
            ..Default::default()
        }
    }

    fn company(industry: &str, technologies: &str) -> Company {
        Company {
            name: "Acme".to_string(),
            industry: industry.to_string(),
            technologies: technologies.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_group_counts_order_and_percentages() {
        let companies = vec![
            company("Software", ""),
            company("Fintech", ""),
            company("Software", ""),
            company("", ""),
            company("Health", ""),
            company("Fintech", ""),
            company("Software", ""),
        ];

        let counts = group_counts(&companies, |c| c.industry.as_str());
        assert_eq!(counts[0].value, "Software");
        assert_eq!(counts[0].count, 3);
        assert_eq!(counts[0].percentage, 42.9);
        assert_eq!(counts[1].value, "Fintech");

        let total: f64 = counts.iter().map(|c| c.percentage).sum();
        assert!((total - 100.0).abs() <= 0.1 * counts.len() as f64);
        assert!(counts.iter().any(|c| c.value.is_empty()));
    }

    #[test]
    fn test_explode_tag_counts() {
        let companies = vec![
            company("Software", "Python, AWS"),
            company("Software", "AWS,Go"),
            company("Software", ""),
            company("Software", " , "),
        ];

        let counts = explode_tag_counts(&companies, |c| c.technologies.as_str(), ',');
        let as_map: HashMap<_, _> = counts.iter().map(|t| (t.tag.as_str(), t.count)).collect();

        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0].tag, "AWS");
        assert_eq!(as_map.get("Python"), Some(&1));
        assert_eq!(as_map.get("AWS"), Some(&2));
        assert_eq!(as_map.get("Go"), Some(&1));
    }

    #[test]
    fn test_keyword_counts() {
        let queries = vec!["Rust Intern remote", "rust  backend intern"];
        let counts = keyword_counts(&queries, |q| *q);
        assert_eq!(counts[0], TagCount { tag: "rust".to_string(), count: 2 });
        assert_eq!(counts[1].tag, "intern");
    }

    #[test]
    fn test_response_rate() {
        let engagements = vec![
            engagement("LinkedIn", true),
            engagement("LinkedIn", true),
            engagement("Email", false),
            engagement("Email", true),
        ];
        assert_eq!(response_rate(&engagements).unwrap(), 75.0);

        let blank = Engagement {
            response_received: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(response_rate(&[blank]).unwrap(), 0.0);

        assert!(matches!(
            response_rate(&[]).unwrap_err(),
            TrackerError::DivisionUndefined
        ));
    }

    #[test]
    fn test_response_rate_by_group() {
        let engagements = vec![
            engagement("LinkedIn", true),
            engagement("Email", false),
            engagement("LinkedIn", false),
            engagement("Email", false),
            engagement("LinkedIn", true),
        ];

        let rates = response_rate_by_group(&engagements, |e| e.platform.as_str());
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].group, "LinkedIn");
        assert_eq!(rates[0].count, 3);
        assert_eq!(rates[0].hits, 2);
        assert_eq!(round1(rates[0].rate), 66.7);
        assert_eq!(rates[1].rate, 0.0);
    }

    #[test]
    fn test_group_rates_are_exact_at_whole_percentages() {
        let engagements: Vec<Engagement> = (0..5)
            .map(|i| engagement("LinkedIn", i < 3))
            .collect();

        let rates = response_rate_by_group(&engagements, |e| e.platform.as_str());
        assert_eq!(rates[0].rate, 60.0);
        assert_eq!(hit_rate(&engagements, Engagement::has_response).unwrap(), 60.0);
    }

    #[test]
    fn test_status_funnel_exact_match() {
        let mut engagements = vec![engagement("LinkedIn", false); 4];
        engagements[0].status = Some("Initial Contact".to_string());
        engagements[1].status = Some("Initial Contact".to_string());
        engagements[2].status = Some("Meeting Scheduled".to_string());
        engagements[3].status = Some("initial contact".to_string());

        let funnel = status_funnel(&engagements, &FUNNEL_STAGES);
        let counts: Vec<usize> = funnel.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![2, 0, 0, 1, 0]);
        assert_eq!(funnel[4].stage, "Interview Opportunity");
    }

    #[test]
    fn test_response_time_stats() {
        let mut engagements = vec![engagement("LinkedIn", true); 4];
        engagements[0].response_time_hours = Some("10".to_string());
        engagements[1].response_time_hours = Some("n/a".to_string());
        engagements[2].response_time_hours = Some("30.5".to_string());

        let stats = response_time_stats(&engagements).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 20.25);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.5);

        engagements.truncate(2);
        engagements[0].response_time_hours = None;
        assert!(matches!(
            response_time_stats(&engagements).unwrap_err(),
            TrackerError::NoData(_)
        ));
    }

    #[test]
    fn test_upcoming_actions_window() {
        let day0 = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let dates = [
            Some(format_date(day0 + Duration::days(8))),
            Some(format_date(day0 + Duration::days(7))),
            Some("someday".to_string()),
            None,
            Some(format_date(day0)),
            Some(format_date(day0 - Duration::days(1))),
        ];

        let engagements: Vec<Engagement> = dates
            .iter()
            .map(|d| Engagement {
                next_action_date: d.clone(),
                ..Default::default()
            })
            .collect();

        let upcoming = upcoming_actions(&engagements, day0, day0 + Duration::days(7));
        let found: Vec<NaiveDate> = upcoming.iter().map(|(_, d)| *d).collect();
        assert_eq!(found, vec![day0, day0 + Duration::days(7)]);
    }

    #[test]
    fn test_mean_numeric() {
        let values = vec!["4", "x", "5"];
        assert_eq!(mean_numeric(&values, |v| v.parse().ok()), Some(4.5));
        assert_eq!(mean_numeric(&values[1..2], |v| v.parse().ok()), None);
    }
}
