use anyhow::bail;
use clap::Args;

pub const STORE_URL_VAR: &str = "CAREPULSE_STORE_URL";
pub const STORE_KEY_VAR: &str = "CAREPULSE_STORE_KEY";

pub const DEFAULT_CURRENT_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_PREVIOUS_WINDOW_DAYS: i64 = 60;
pub const DEFAULT_STABILITY_BAND: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub access_key: String,
}

impl StoreConfig {
    pub fn from_env() -> anyhow::Result<StoreConfig> {
        Self::from_vars(
            std::env::var(STORE_URL_VAR).ok(),
            std::env::var(STORE_KEY_VAR).ok(),
        )
    }

    fn from_vars(url: Option<String>, access_key: Option<String>) -> anyhow::Result<StoreConfig> {
        let url = match url {
            Some(value) if !value.trim().is_empty() => value,
            _ => bail!("{STORE_URL_VAR} is not set"),
        };
        let access_key = match access_key {
            Some(value) if !value.trim().is_empty() => value,
            _ => bail!("{STORE_KEY_VAR} is not set"),
        };

        Ok(StoreConfig { url, access_key })
    }
}

/// Reporting thresholds. These are policy numbers, not derived values, so
/// they stay overridable from the command line.
#[derive(Debug, Clone, Args)]
pub struct TrendPolicy {
    /// Days covered by the current completion window
    #[arg(long, default_value_t = DEFAULT_CURRENT_WINDOW_DAYS)]
    pub current_window_days: i64,
    /// Days back to the start of the previous completion window
    #[arg(long, default_value_t = DEFAULT_PREVIOUS_WINDOW_DAYS)]
    pub previous_window_days: i64,
    /// Percent change below which a category reads as stable
    #[arg(long, default_value_t = DEFAULT_STABILITY_BAND)]
    pub stability_band: f64,
}

impl Default for TrendPolicy {
    fn default() -> Self {
        TrendPolicy {
            current_window_days: DEFAULT_CURRENT_WINDOW_DAYS,
            previous_window_days: DEFAULT_PREVIOUS_WINDOW_DAYS,
            stability_band: DEFAULT_STABILITY_BAND,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_requires_both_vars() {
        assert!(StoreConfig::from_vars(None, Some("key".to_string())).is_err());
        assert!(StoreConfig::from_vars(Some("postgres://metrics@db/carepulse".to_string()), None).is_err());
        assert!(StoreConfig::from_vars(Some("  ".to_string()), Some("key".to_string())).is_err());
    }

    #[test]
    fn config_accepts_complete_vars() {
        let config = StoreConfig::from_vars(
            Some("postgres://metrics@db/carepulse".to_string()),
            Some("svc-key".to_string()),
        )
        .unwrap();
        assert_eq!(config.url, "postgres://metrics@db/carepulse");
        assert_eq!(config.access_key, "svc-key");
    }

    #[test]
    fn policy_defaults_match_documented_thresholds() {
        let policy = TrendPolicy::default();
        assert_eq!(policy.current_window_days, 30);
        assert_eq!(policy.previous_window_days, 60);
        assert_eq!(policy.stability_band, 5.0);
    }
}
