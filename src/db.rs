use anyhow::Context;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::metrics::round1;
use crate::models::{RiskDistributionPoint, ScheduledAssessment};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let patients = [
        Uuid::parse_str("8d1f2c43-9a21-4f6e-b3a7-2f4f5f0d9e01")?,
        Uuid::parse_str("1f6a9c02-7e54-4b7c-8a19-64f00cf2a9b2")?,
        Uuid::parse_str("5b3d8e71-0c2f-4d98-9f4e-a1d2b3c4d5e6")?,
        Uuid::parse_str("c9e4f8a1-3b6d-42e5-8c7f-90a1b2c3d4e5")?,
        Uuid::parse_str("2a7b4c91-6d3e-48f2-b5a8-c7d9e0f1a2b3")?,
        Uuid::parse_str("e3c5a7d9-1f2b-4061-9e8d-76b5a4c3d2e1")?,
    ];

    let assessments = vec![
        ("seed-asm-001", patients[0], "completed", Some((2026, 8, 21, 9, 30))),
        ("seed-asm-002", patients[1], "completed", Some((2026, 8, 18, 14, 0))),
        ("seed-asm-003", patients[2], "completed", Some((2026, 8, 9, 10, 15))),
        ("seed-asm-004", patients[0], "completed", Some((2026, 8, 2, 11, 45))),
        ("seed-asm-005", patients[3], "completed", Some((2026, 7, 19, 16, 30))),
        ("seed-asm-006", patients[4], "completed", Some((2026, 7, 8, 9, 0))),
        ("seed-asm-007", patients[1], "completed", Some((2026, 6, 22, 13, 20))),
        ("seed-asm-008", patients[5], "completed", None),
        ("seed-asm-009", patients[2], "scheduled", None),
        ("seed-asm-010", patients[3], "scheduled", None),
        ("seed-asm-011", patients[4], "missed", None),
        ("seed-asm-012", patients[5], "cancelled", None),
    ];

    for (source_key, patient_id, status, completed) in assessments {
        let completed_at: Option<DateTime<Utc>> = match completed {
            Some((year, month, day, hour, minute)) => Some(
                Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
                    .single()
                    .context("invalid seed timestamp")?,
            ),
            None => None,
        };

        sqlx::query(
            r#"
            INSERT INTO care_metrics.scheduled_assessments
            (id, patient_id, status, completed_at, source_key)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(patient_id)
        .bind(status)
        .bind(completed_at)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let cohorts: Vec<(&str, i32, Vec<(NaiveDate, i32, i32, i32, i32)>)> = vec![
        (
            "all",
            236,
            vec![
                (NaiveDate::from_ymd_opt(2026, 7, 13).context("invalid date")?, 21, 45, 72, 98),
                (NaiveDate::from_ymd_opt(2026, 7, 20).context("invalid date")?, 20, 44, 73, 99),
                (NaiveDate::from_ymd_opt(2026, 7, 27).context("invalid date")?, 19, 43, 72, 102),
                (NaiveDate::from_ymd_opt(2026, 8, 3).context("invalid date")?, 18, 42, 71, 105),
                (NaiveDate::from_ymd_opt(2026, 8, 10).context("invalid date")?, 17, 40, 72, 107),
                (NaiveDate::from_ymd_opt(2026, 8, 17).context("invalid date")?, 16, 39, 70, 111),
            ],
        ),
        (
            "diabetes-program",
            58,
            vec![
                (NaiveDate::from_ymd_opt(2026, 7, 27).context("invalid date")?, 9, 15, 19, 15),
                (NaiveDate::from_ymd_opt(2026, 8, 3).context("invalid date")?, 9, 14, 19, 16),
                (NaiveDate::from_ymd_opt(2026, 8, 10).context("invalid date")?, 8, 14, 20, 16),
                (NaiveDate::from_ymd_opt(2026, 8, 17).context("invalid date")?, 8, 13, 19, 18),
            ],
        ),
    ];

    for (cohort_filter, total_patients, periods) in cohorts {
        for (period_date, very_high, high, moderate, low) in periods {
            let categories = [
                ("very_high", very_high),
                ("high", high),
                ("moderate", moderate),
                ("low", low),
            ];
            for (risk_category, patient_count) in categories {
                sqlx::query(
                    r#"
                    INSERT INTO care_metrics.risk_distribution_history
                    (id, period_date, risk_category, patient_count, percentage,
                     total_patients, cohort_filter)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    ON CONFLICT (period_date, risk_category, cohort_filter) DO UPDATE
                    SET patient_count = EXCLUDED.patient_count,
                        percentage = EXCLUDED.percentage,
                        total_patients = EXCLUDED.total_patients
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(period_date)
                .bind(risk_category)
                .bind(patient_count)
                .bind(round1(100.0 * f64::from(patient_count) / f64::from(total_patients)))
                .bind(total_patients)
                .bind(cohort_filter)
                .execute(pool)
                .await?;
            }
        }
    }

    Ok(())
}

pub async fn fetch_scheduled_assessments(pool: &PgPool) -> anyhow::Result<Vec<ScheduledAssessment>> {
    let rows = sqlx::query(
        "SELECT patient_id, status, completed_at \
         FROM care_metrics.scheduled_assessments",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::new();
    for row in rows {
        records.push(ScheduledAssessment {
            patient_id: row.get("patient_id"),
            status: row.get("status"),
            completed_at: row.get("completed_at"),
        });
    }

    Ok(records)
}

pub async fn fetch_risk_history(
    pool: &PgPool,
    since: NaiveDate,
    cohort: &str,
) -> anyhow::Result<Vec<RiskDistributionPoint>> {
    let rows = sqlx::query(
        "SELECT period_date, risk_category, patient_count, percentage, \
         total_patients, cohort_filter \
         FROM care_metrics.risk_distribution_history \
         WHERE period_date >= $1 AND cohort_filter = $2 \
         ORDER BY period_date ASC",
    )
    .bind(since)
    .bind(cohort)
    .fetch_all(pool)
    .await?;

    let mut points = Vec::new();
    for row in rows {
        points.push(RiskDistributionPoint {
            period_date: row.get("period_date"),
            risk_category: row.get("risk_category"),
            patient_count: row.get("patient_count"),
            percentage: row.get("percentage"),
            total_patients: row.get("total_patients"),
            cohort_filter: row.get("cohort_filter"),
        });
    }

    Ok(points)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        patient_id: Uuid,
        status: String,
        completed_at: Option<DateTime<Utc>>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO care_metrics.scheduled_assessments
            (id, patient_id, status, completed_at, source_key)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.patient_id)
        .bind(&row.status)
        .bind(row.completed_at)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
