use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod fallback;
mod metrics;
mod models;
mod report;
mod store;
mod trend;

use store::StoreHandle;

#[derive(Parser)]
#[command(name = "assessment-metrics")]
#[command(about = "Assessment and risk trend metrics for the CarePulse care dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the reporting schema
    InitDb,
    /// Load illustrative seed data
    Seed,
    /// Import scheduled assessments from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Summarize assessment status counts and completion metrics
    Status {
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        policy: config::TrendPolicy,
    },
    /// Show risk distribution movement across periods
    RiskTrends {
        #[arg(long, default_value = "all")]
        cohort: String,
        #[arg(long, default_value_t = 90)]
        since_days: i64,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        policy: config::TrendPolicy,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "all")]
        cohort: String,
        #[arg(long, default_value_t = 90)]
        since_days: i64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[command(flatten)]
        policy: config::TrendPolicy,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let now = Utc::now();

    match cli.command {
        Commands::InitDb => {
            let pool = admin_pool().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = admin_pool().await?;
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let pool = admin_pool().await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} assessments from {}.", csv.display());
        }
        Commands::Status { json, policy } => {
            let source = StoreHandle::open(now).await;
            let records = store::assessments_or_fallback(&source, now).await;
            let counts = metrics::status_counts(&records);
            let summary = metrics::status_metrics(&records, now, &policy);

            if json {
                let payload = serde_json::json!({ "counts": counts, "metrics": summary });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Assessment status:");
                println!("- completed: {}", counts.completed);
                println!("- pending: {}", counts.pending);
                println!("- cancelled: {}", counts.cancelled);
                println!("- missed: {}", counts.missed);
                println!("- total: {}", counts.total);
                println!(
                    "Completion rate {:.1}% ({} of {} assessments, {} of {} patients, {:.1} per patient)",
                    summary.completion_rate,
                    summary.total_completed_assessments,
                    counts.total,
                    summary.unique_patients_completed,
                    summary.total_patients,
                    summary.average_assessments_per_patient
                );
                let trend_data = &summary.trend_data;
                println!(
                    "Completions {} vs {} in the previous window (change {:+}, {:+.1}%)",
                    trend_data.current,
                    trend_data.previous,
                    trend_data.change,
                    trend_data.change_percent
                );
            }
        }
        Commands::RiskTrends {
            cohort,
            since_days,
            json,
            policy,
        } => {
            let source = StoreHandle::open(now).await;
            let since = trend::cutoff_date(now, since_days);
            let points = store::risk_history_or_fallback(&source, since, &cohort, now).await;
            let rows = trend::trend_rows(&points);
            let summaries = trend::summarize(&rows, &policy);
            let outlook = trend::outlook(&summaries);

            if json {
                let payload = serde_json::json!({
                    "trend": rows,
                    "summaries": summaries,
                    "outlook": outlook,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Risk distribution for cohort {cohort} (since {since}):");
                for row in &rows {
                    println!(
                        "- {}: very_high {} | high {} | moderate {} | low {} (total {})",
                        row.period, row.very_high, row.high, row.moderate, row.low, row.total
                    );
                }
                if summaries.is_empty() {
                    println!("Not enough periods to compare trends.");
                } else {
                    println!("Category movement (first vs last period):");
                    for summary in &summaries {
                        println!(
                            "- {}: {} -> {} (change {:+}, {:+.1}%, {})",
                            summary.category,
                            summary.previous_count,
                            summary.current_count,
                            summary.change,
                            summary.change_percent,
                            summary.trend
                        );
                    }
                    println!("Outlook: {}", outlook.message);
                }
            }
        }
        Commands::Report {
            cohort,
            since_days,
            out,
            policy,
        } => {
            let source = StoreHandle::open(now).await;
            let since = trend::cutoff_date(now, since_days);
            let records = store::assessments_or_fallback(&source, now).await;
            let points = store::risk_history_or_fallback(&source, since, &cohort, now).await;

            let counts = metrics::status_counts(&records);
            let summary = metrics::status_metrics(&records, now, &policy);
            let rows = trend::trend_rows(&points);
            let summaries = trend::summarize(&rows, &policy);
            let outlook = trend::outlook(&summaries);

            let report = report::build_report(
                &cohort, since, &counts, &summary, &rows, &summaries, &outlook,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

async fn admin_pool() -> anyhow::Result<sqlx::PgPool> {
    let config = config::StoreConfig::from_env()
        .context("store commands need the reporting store configured")?;
    store::connect(&config).await
}
