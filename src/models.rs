use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledAssessment {
    pub patient_id: Uuid,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub completed: usize,
    pub pending: usize,
    pub cancelled: usize,
    pub missed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMetrics {
    pub total_patients: usize,
    pub unique_patients_completed: usize,
    pub total_completed_assessments: usize,
    pub total_pending_assessments: usize,
    pub average_assessments_per_patient: f64,
    pub completion_rate: f64,
    pub trend_data: CompletionTrend,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionTrend {
    pub current: usize,
    pub previous: usize,
    pub change: i64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskDistributionPoint {
    pub period_date: NaiveDate,
    pub risk_category: String,
    pub patient_count: i32,
    pub percentage: f64,
    pub total_patients: i32,
    pub cohort_filter: String,
}

// Field names double as the chart column keys consumed downstream, so this
// row keeps the raw category identifiers instead of camelCase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskTrendRow {
    pub period: String,
    pub very_high: i64,
    pub high: i64,
    pub moderate: i64,
    pub low: i64,
    pub total: i64,
}

impl RiskTrendRow {
    pub fn category_count(&self, category: &str) -> i64 {
        match category {
            "very_high" => self.very_high,
            "high" => self.high,
            "moderate" => self.moderate,
            "low" => self.low,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskTrendSummary {
    pub category: String,
    pub current_count: i64,
    pub previous_count: i64,
    pub change: i64,
    pub change_percent: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendOutlook {
    pub improving: bool,
    pub message: String,
}
