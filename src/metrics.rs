use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::TrendPolicy;
use crate::models::{CompletionTrend, ScheduledAssessment, StatusCounts, StatusMetrics};

pub fn status_counts(records: &[ScheduledAssessment]) -> StatusCounts {
    let mut counts = StatusCounts::default();

    for record in records {
        match record.status.as_str() {
            "completed" => counts.completed += 1,
            "scheduled" => counts.pending += 1,
            "cancelled" => counts.cancelled += 1,
            "missed" => counts.missed += 1,
            // Unrecognized statuses still belong to the workload total.
            _ => {}
        }
        counts.total += 1;
    }

    counts
}

pub fn status_metrics(
    records: &[ScheduledAssessment],
    now: DateTime<Utc>,
    policy: &TrendPolicy,
) -> StatusMetrics {
    let mut patients: HashSet<Uuid> = HashSet::new();
    let mut patients_completed: HashSet<Uuid> = HashSet::new();
    let mut total_completed = 0usize;
    let mut total_pending = 0usize;

    for record in records {
        patients.insert(record.patient_id);
        match record.status.as_str() {
            "completed" => {
                patients_completed.insert(record.patient_id);
                total_completed += 1;
            }
            "scheduled" => total_pending += 1,
            _ => {}
        }
    }

    let total_patients = patients.len();
    let average_assessments_per_patient = if total_patients == 0 {
        0.0
    } else {
        round1(total_completed as f64 / total_patients as f64)
    };
    let completion_rate = if records.is_empty() {
        0.0
    } else {
        round1(100.0 * total_completed as f64 / records.len() as f64)
    };

    StatusMetrics {
        total_patients,
        unique_patients_completed: patients_completed.len(),
        total_completed_assessments: total_completed,
        total_pending_assessments: total_pending,
        average_assessments_per_patient,
        completion_rate,
        trend_data: completion_trend(records, now, policy),
    }
}

pub fn completion_trend(
    records: &[ScheduledAssessment],
    now: DateTime<Utc>,
    policy: &TrendPolicy,
) -> CompletionTrend {
    let current_start = now - Duration::days(policy.current_window_days);
    let previous_start = now - Duration::days(policy.previous_window_days);
    let mut current = 0usize;
    let mut previous = 0usize;

    for record in records {
        if record.status != "completed" {
            continue;
        }
        // A completed row without a timestamp stays in the status tallies
        // but cannot be placed in either window.
        let Some(completed_at) = record.completed_at else {
            continue;
        };
        if completed_at >= current_start {
            current += 1;
        } else if completed_at >= previous_start {
            previous += 1;
        }
    }

    let change = current as i64 - previous as i64;
    let change_percent = if previous == 0 {
        0.0
    } else {
        round1(100.0 * change as f64 / previous as f64)
    };

    CompletionTrend {
        current,
        previous,
        change,
        change_percent,
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
