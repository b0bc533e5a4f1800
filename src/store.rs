use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::StoreConfig;
use crate::db;
use crate::fallback;
use crate::models::{RiskDistributionPoint, ScheduledAssessment};

/// Read side of the reporting store. Injected into every metrics path so a
/// test double (or the fixed dataset) can stand in for the live store.
pub trait MetricsStore {
    async fn scheduled_assessments(&self) -> anyhow::Result<Vec<ScheduledAssessment>>;
    async fn risk_history(
        &self,
        since: NaiveDate,
        cohort: &str,
    ) -> anyhow::Result<Vec<RiskDistributionPoint>>;
}

pub async fn connect(config: &StoreConfig) -> anyhow::Result<PgPool> {
    let options: PgConnectOptions = config
        .url
        .parse()
        .context("store URL is not a valid Postgres URL")?;
    let options = options.password(&config.access_key);

    PgPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("failed to connect to the reporting store")
}

/// Live strategy: queries the two reporting relations.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

impl MetricsStore for PgStore {
    async fn scheduled_assessments(&self) -> anyhow::Result<Vec<ScheduledAssessment>> {
        db::fetch_scheduled_assessments(&self.pool).await
    }

    async fn risk_history(
        &self,
        since: NaiveDate,
        cohort: &str,
    ) -> anyhow::Result<Vec<RiskDistributionPoint>> {
        db::fetch_risk_history(&self.pool, since, cohort).await
    }
}

/// Fallback strategy: serves the fixed illustrative dataset, anchored to the
/// instant the handle was opened.
pub struct FixedDataset {
    now: DateTime<Utc>,
}

impl FixedDataset {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedDataset { now }
    }
}

impl MetricsStore for FixedDataset {
    async fn scheduled_assessments(&self) -> anyhow::Result<Vec<ScheduledAssessment>> {
        Ok(fallback::scheduled_assessments(self.now))
    }

    async fn risk_history(
        &self,
        _since: NaiveDate,
        _cohort: &str,
    ) -> anyhow::Result<Vec<RiskDistributionPoint>> {
        Ok(fallback::risk_history(self.now))
    }
}

pub enum StoreHandle {
    Live(PgStore),
    Offline(FixedDataset),
}

impl StoreHandle {
    /// Open the live store when it is configured and reachable, otherwise
    /// hand out the fixed dataset. Metrics commands always get a usable
    /// source; the degradation is logged, never raised.
    pub async fn open(now: DateTime<Utc>) -> StoreHandle {
        match StoreConfig::from_env() {
            Ok(config) => match connect(&config).await {
                Ok(pool) => StoreHandle::Live(PgStore::new(pool)),
                Err(error) => {
                    tracing::warn!(error = %error, "store connection failed, serving the fallback dataset");
                    StoreHandle::Offline(FixedDataset::new(now))
                }
            },
            Err(error) => {
                tracing::warn!(error = %error, "store not configured, serving the fallback dataset");
                StoreHandle::Offline(FixedDataset::new(now))
            }
        }
    }
}

impl MetricsStore for StoreHandle {
    async fn scheduled_assessments(&self) -> anyhow::Result<Vec<ScheduledAssessment>> {
        match self {
            StoreHandle::Live(store) => store.scheduled_assessments().await,
            StoreHandle::Offline(fixed) => fixed.scheduled_assessments().await,
        }
    }

    async fn risk_history(
        &self,
        since: NaiveDate,
        cohort: &str,
    ) -> anyhow::Result<Vec<RiskDistributionPoint>> {
        match self {
            StoreHandle::Live(store) => store.risk_history(since, cohort).await,
            StoreHandle::Offline(fixed) => fixed.risk_history(since, cohort).await,
        }
    }
}

/// Fetch scheduled assessments, substituting the fixed dataset when the
/// fetch fails or yields no rows. Zero rows would render as "no activity",
/// which is indistinguishable from an outage on the dashboard.
pub async fn assessments_or_fallback<S: MetricsStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Vec<ScheduledAssessment> {
    match store.scheduled_assessments().await {
        Ok(rows) if !rows.is_empty() => rows,
        Ok(_) => {
            tracing::warn!("store returned no scheduled assessments, serving the fallback dataset");
            fallback::scheduled_assessments(now)
        }
        Err(error) => {
            tracing::warn!(error = %error, "scheduled assessment fetch failed, serving the fallback dataset");
            fallback::scheduled_assessments(now)
        }
    }
}

/// Same substitution policy for the risk distribution history.
pub async fn risk_history_or_fallback<S: MetricsStore>(
    store: &S,
    since: NaiveDate,
    cohort: &str,
    now: DateTime<Utc>,
) -> Vec<RiskDistributionPoint> {
    match store.risk_history(since, cohort).await {
        Ok(rows) if !rows.is_empty() => rows,
        Ok(_) => {
            tracing::warn!(cohort, "no risk distribution history in the window, serving the fallback dataset");
            fallback::risk_history(now)
        }
        Err(error) => {
            tracing::warn!(error = %error, "risk history fetch failed, serving the fallback dataset");
            fallback::risk_history(now)
        }
    }
}
