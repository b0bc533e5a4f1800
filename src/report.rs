use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{RiskTrendRow, RiskTrendSummary, StatusCounts, StatusMetrics, TrendOutlook};

pub fn build_report(
    cohort: &str,
    since: NaiveDate,
    counts: &StatusCounts,
    metrics: &StatusMetrics,
    trend: &[RiskTrendRow],
    summaries: &[RiskTrendSummary],
    outlook: &TrendOutlook,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Care Management Metrics Report");
    let _ = writeln!(
        output,
        "Generated for cohort {} (risk history since {})",
        cohort, since
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Assessment Status");
    let _ = writeln!(output, "- completed: {}", counts.completed);
    let _ = writeln!(output, "- pending: {}", counts.pending);
    let _ = writeln!(output, "- cancelled: {}", counts.cancelled);
    let _ = writeln!(output, "- missed: {}", counts.missed);
    let _ = writeln!(output, "- total: {}", counts.total);
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Completion rate {:.1}%: {} assessments completed by {} of {} patients ({:.1} per patient).",
        metrics.completion_rate,
        metrics.total_completed_assessments,
        metrics.unique_patients_completed,
        metrics.total_patients,
        metrics.average_assessments_per_patient
    );
    let trend_data = &metrics.trend_data;
    let _ = writeln!(
        output,
        "Current completion window: {} vs {} in the previous window (change {:+}, {:+.1}%).",
        trend_data.current, trend_data.previous, trend_data.change, trend_data.change_percent
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Distribution Trend");

    if trend.is_empty() {
        let _ = writeln!(output, "No risk distribution history for this window.");
    } else {
        let _ = writeln!(output, "| period | very_high | high | moderate | low | total |");
        let _ = writeln!(output, "| --- | --- | --- | --- | --- | --- |");
        for row in trend {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} |",
                row.period, row.very_high, row.high, row.moderate, row.low, row.total
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Category Movement");

    if summaries.is_empty() {
        let _ = writeln!(output, "Not enough periods to compare.");
    } else {
        for summary in summaries {
            let _ = writeln!(
                output,
                "- {}: {} -> {} (change {:+}, {:+.1}%, {})",
                summary.category,
                summary.previous_count,
                summary.current_count,
                summary.change,
                summary.change_percent,
                summary.trend
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "## Outlook");
        let _ = writeln!(output, "{}", outlook.message);
    }

    output
}
