use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::TrendPolicy;
use crate::metrics::round1;
use crate::models::{RiskDistributionPoint, RiskTrendRow, RiskTrendSummary, Trend, TrendOutlook};

pub const RISK_CATEGORIES: [&str; 4] = ["very_high", "high", "moderate", "low"];

pub const OUTLOOK_COMBINED: &str =
    "High-risk patient counts are shrinking while the low-risk group grows.";
pub const OUTLOOK_LOW_GROWTH: &str = "More patients are moving into the low-risk group.";
pub const OUTLOOK_HIGH_DECLINE: &str =
    "High-risk patient counts are holding steady or shrinking.";
pub const OUTLOOK_ATTENTION: &str =
    "High-risk patient counts are growing and need attention.";

pub fn cutoff_date(now: DateTime<Utc>, since_days: i64) -> NaiveDate {
    now.date_naive() - Duration::days(since_days.max(1))
}

pub fn trend_rows(points: &[RiskDistributionPoint]) -> Vec<RiskTrendRow> {
    let mut periods: BTreeMap<NaiveDate, RiskTrendRow> = BTreeMap::new();

    for point in points {
        let row = periods.entry(point.period_date).or_insert_with(|| RiskTrendRow {
            period: point.period_date.format("%Y-%m-%d").to_string(),
            very_high: 0,
            high: 0,
            moderate: 0,
            low: 0,
            // The feed stamps every point in a period with the cohort-wide
            // total, so the first point is taken as authoritative instead of
            // re-summing the categories.
            total: i64::from(point.total_patients),
        });

        let count = i64::from(point.patient_count);
        match point.risk_category.as_str() {
            "very_high" => row.very_high = count,
            "high" => row.high = count,
            "moderate" => row.moderate = count,
            "low" => row.low = count,
            _ => {}
        }
    }

    periods.into_values().collect()
}

/// Compares the two ends of the ordered series, not adjacent periods: the
/// summary answers "where is this category now versus the start of the
/// requested window".
pub fn summarize(series: &[RiskTrendRow], policy: &TrendPolicy) -> Vec<RiskTrendSummary> {
    if series.len() < 2 {
        return Vec::new();
    }
    let previous = &series[0];
    let current = &series[series.len() - 1];

    RISK_CATEGORIES
        .iter()
        .map(|&category| {
            let current_count = current.category_count(category);
            let previous_count = previous.category_count(category);
            let change = current_count - previous_count;
            let raw_percent = if previous_count == 0 {
                0.0
            } else {
                100.0 * change as f64 / previous_count as f64
            };

            RiskTrendSummary {
                category: category.to_string(),
                current_count,
                previous_count,
                change,
                change_percent: round1(raw_percent),
                trend: classify(change, previous_count, raw_percent, policy.stability_band),
            }
        })
        .collect()
}

fn classify(change: i64, previous_count: i64, raw_percent: f64, stability_band: f64) -> Trend {
    if previous_count == 0 {
        // No base to take a percentage against. Growth from zero still
        // reads as movement, not stability.
        return if change > 0 {
            Trend::Increasing
        } else {
            Trend::Stable
        };
    }

    // Classification uses the unrounded percentage: a band of 5 keeps 4.999
    // stable while exactly 5.0 reads as movement.
    if raw_percent.abs() < stability_band {
        Trend::Stable
    } else if change > 0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    }
}

pub fn outlook(summaries: &[RiskTrendSummary]) -> TrendOutlook {
    let trend_for = |category: &str| {
        summaries
            .iter()
            .find(|summary| summary.category == category)
            .map(|summary| summary.trend)
    };
    // A category missing from the summaries fails containment outright.
    let contained =
        |trend: Option<Trend>| matches!(trend, Some(Trend::Decreasing | Trend::Stable));

    let high_risk_contained = contained(trend_for("very_high")) && contained(trend_for("high"));
    let low_risk_growing = matches!(trend_for("low"), Some(Trend::Increasing));

    let message = match (high_risk_contained, low_risk_growing) {
        (true, true) => OUTLOOK_COMBINED,
        (false, true) => OUTLOOK_LOW_GROWTH,
        (true, false) => OUTLOOK_HIGH_DECLINE,
        (false, false) => OUTLOOK_ATTENTION,
    };

    TrendOutlook {
        improving: high_risk_contained || low_risk_growing,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(
        year: i32,
        month: u32,
        day: u32,
        category: &str,
        patient_count: i32,
        total_patients: i32,
    ) -> RiskDistributionPoint {
        RiskDistributionPoint {
            period_date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            risk_category: category.to_string(),
            patient_count,
            percentage: 0.0,
            total_patients,
            cohort_filter: "all".to_string(),
        }
    }

    fn row(period: &str, very_high: i64, high: i64, moderate: i64, low: i64) -> RiskTrendRow {
        RiskTrendRow {
            period: period.to_string(),
            very_high,
            high,
            moderate,
            low,
            total: very_high + high + moderate + low,
        }
    }

    fn summary(category: &str, trend: Trend) -> RiskTrendSummary {
        RiskTrendSummary {
            category: category.to_string(),
            current_count: 0,
            previous_count: 0,
            change: 0,
            change_percent: 0.0,
            trend,
        }
    }

    #[test]
    fn cutoff_date_respects_since_days() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 12, 0, 0).unwrap();
        let expected = NaiveDate::from_ymd_opt(2026, 8, 11).unwrap();
        assert_eq!(cutoff_date(now, 14), expected);
    }

    #[test]
    fn rows_group_points_by_period_ascending() {
        let points = vec![
            point(2026, 8, 17, "very_high", 11, 200),
            point(2026, 8, 10, "very_high", 12, 200),
            point(2026, 8, 10, "low", 96, 200),
            point(2026, 8, 17, "low", 103, 200),
        ];

        let rows = trend_rows(&points);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "2026-08-10");
        assert_eq!(rows[0].very_high, 12);
        assert_eq!(rows[0].low, 96);
        assert_eq!(rows[0].moderate, 0);
        assert_eq!(rows[1].period, "2026-08-17");
        assert_eq!(rows[1].very_high, 11);
        assert_eq!(rows[1].low, 103);
    }

    #[test]
    fn row_total_comes_from_the_first_point_in_a_period() {
        // Inconsistent totals inside one period: the grouped row keeps the
        // first value rather than summing the category counts.
        let points = vec![
            point(2026, 8, 17, "very_high", 11, 200),
            point(2026, 8, 17, "low", 103, 250),
        ];

        let rows = trend_rows(&points);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total, 200);
    }

    #[test]
    fn unknown_categories_do_not_touch_the_columns() {
        let points = vec![
            point(2026, 8, 17, "critical", 4, 200),
            point(2026, 8, 17, "high", 30, 200),
        ];

        let rows = trend_rows(&points);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].high, 30);
        assert_eq!(rows[0].very_high, 0);
        assert_eq!(rows[0].moderate, 0);
        assert_eq!(rows[0].low, 0);
        assert_eq!(rows[0].total, 200);
    }

    #[test]
    fn short_series_has_no_summaries() {
        let policy = TrendPolicy::default();
        assert!(summarize(&[], &policy).is_empty());
        assert!(summarize(&[row("2026-08-17", 11, 29, 57, 103)], &policy).is_empty());
    }

    #[test]
    fn summaries_compare_the_series_ends() {
        let series = vec![
            row("2026-08-03", 12, 31, 58, 99),
            row("2026-08-10", 40, 31, 58, 99),
            row("2026-08-17", 11, 31, 58, 99),
        ];

        let summaries = summarize(&series, &TrendPolicy::default());
        let very_high = &summaries[0];
        assert_eq!(very_high.category, "very_high");
        assert_eq!(very_high.previous_count, 12);
        assert_eq!(very_high.current_count, 11);
        assert_eq!(very_high.change, -1);
        assert_eq!(very_high.change_percent, -8.3);
        assert_eq!(very_high.trend, Trend::Decreasing);
    }

    #[test]
    fn stability_band_is_strict() {
        let series = vec![
            row("2026-08-10", 20, 20, 1000, 20), // previous
            row("2026-08-17", 21, 19, 1049, 20), // current
        ];

        let summaries = summarize(&series, &TrendPolicy::default());
        assert_eq!(summaries[0].change_percent, 5.0);
        assert_eq!(summaries[0].trend, Trend::Increasing);
        assert_eq!(summaries[1].change_percent, -5.0);
        assert_eq!(summaries[1].trend, Trend::Decreasing);
        assert_eq!(summaries[2].change_percent, 4.9);
        assert_eq!(summaries[2].trend, Trend::Stable);
        assert_eq!(summaries[3].change_percent, 0.0);
        assert_eq!(summaries[3].trend, Trend::Stable);
    }

    #[test]
    fn classification_reads_the_unrounded_percentage() {
        // 4999 / 100000 = 4.999%, which rounds to 5.0 for display but must
        // still classify inside the band.
        let series = vec![
            row("2026-08-10", 100000, 0, 0, 0),
            row("2026-08-17", 104999, 0, 0, 0),
        ];

        let summaries = summarize(&series, &TrendPolicy::default());
        assert_eq!(summaries[0].change_percent, 5.0);
        assert_eq!(summaries[0].trend, Trend::Stable);
    }

    #[test]
    fn growth_from_a_zero_base_reads_as_increasing() {
        let series = vec![
            row("2026-08-10", 0, 0, 10, 10),
            row("2026-08-17", 5, 0, 10, 10),
        ];

        let summaries = summarize(&series, &TrendPolicy::default());
        assert_eq!(summaries[0].previous_count, 0);
        assert_eq!(summaries[0].current_count, 5);
        assert_eq!(summaries[0].change_percent, 0.0);
        assert_eq!(summaries[0].trend, Trend::Increasing);
        // A category flat at zero stays stable.
        assert_eq!(summaries[1].trend, Trend::Stable);
    }

    #[test]
    fn band_follows_the_policy() {
        let policy = TrendPolicy {
            stability_band: 20.0,
            ..TrendPolicy::default()
        };
        let series = vec![
            row("2026-08-10", 100, 100, 100, 100),
            row("2026-08-17", 119, 121, 81, 79),
        ];

        let summaries = summarize(&series, &policy);
        assert_eq!(summaries[0].trend, Trend::Stable);
        assert_eq!(summaries[1].trend, Trend::Increasing);
        assert_eq!(summaries[2].trend, Trend::Stable);
        assert_eq!(summaries[3].trend, Trend::Decreasing);
    }

    #[test]
    fn outlook_combined_branch() {
        let summaries = vec![
            summary("very_high", Trend::Decreasing),
            summary("high", Trend::Stable),
            summary("moderate", Trend::Increasing),
            summary("low", Trend::Increasing),
        ];

        let outlook = outlook(&summaries);
        assert!(outlook.improving);
        assert_eq!(outlook.message, OUTLOOK_COMBINED);
    }

    #[test]
    fn outlook_low_growth_branch() {
        let summaries = vec![
            summary("very_high", Trend::Increasing),
            summary("high", Trend::Stable),
            summary("low", Trend::Increasing),
        ];

        let outlook = outlook(&summaries);
        assert!(outlook.improving);
        assert_eq!(outlook.message, OUTLOOK_LOW_GROWTH);
    }

    #[test]
    fn outlook_high_decline_branch() {
        let summaries = vec![
            summary("very_high", Trend::Stable),
            summary("high", Trend::Decreasing),
            summary("low", Trend::Stable),
        ];

        let outlook = outlook(&summaries);
        assert!(outlook.improving);
        assert_eq!(outlook.message, OUTLOOK_HIGH_DECLINE);
    }

    #[test]
    fn outlook_attention_branch() {
        let summaries = vec![
            summary("very_high", Trend::Increasing),
            summary("high", Trend::Increasing),
            summary("low", Trend::Decreasing),
        ];

        let outlook = outlook(&summaries);
        assert!(!outlook.improving);
        assert_eq!(outlook.message, OUTLOOK_ATTENTION);
    }

    #[test]
    fn missing_categories_fail_containment() {
        // Only moderate present: neither condition can pass.
        let outlook_moderate = outlook(&[summary("moderate", Trend::Decreasing)]);
        assert!(!outlook_moderate.improving);
        assert_eq!(outlook_moderate.message, OUTLOOK_ATTENTION);

        // very_high contained but high absent: containment fails as a whole.
        let outlook_partial = outlook(&[summary("very_high", Trend::Decreasing)]);
        assert!(!outlook_partial.improving);
        assert_eq!(outlook_partial.message, OUTLOOK_ATTENTION);
    }
}
