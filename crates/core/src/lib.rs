pub mod catalog;
pub mod domain;
pub mod engine;
pub mod error;
pub mod merchant;
pub mod ranker;
pub mod resolver;
pub mod scoring;
pub mod time;

pub mod config {
    use crate::engine::EngineConfig;
    use anyhow::Context;
    use std::fmt::Display;
    use std::str::FromStr;

    const DEFAULT_RECOMMENDATION_LIMIT: usize = 5;
    const DEFAULT_AVERAGE_TRANSACTION: f64 = 50.0;
    const DEFAULT_PORT: u16 = 3000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub catalog_path: Option<String>,
        pub sentry_dsn: Option<String>,
        pub recommendation_limit: usize,
        pub default_average_transaction: f64,
        pub eval_utc_offset_hours: i32,
        pub port: u16,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let recommendation_limit: usize = parse_var(
                &lookup,
                "RECOMMENDATION_LIMIT",
                DEFAULT_RECOMMENDATION_LIMIT,
            )?;
            anyhow::ensure!(
                recommendation_limit >= 1,
                "RECOMMENDATION_LIMIT must be >= 1"
            );

            let default_average_transaction: f64 = parse_var(
                &lookup,
                "DEFAULT_AVERAGE_TRANSACTION",
                DEFAULT_AVERAGE_TRANSACTION,
            )?;
            anyhow::ensure!(
                default_average_transaction.is_finite() && default_average_transaction >= 0.0,
                "DEFAULT_AVERAGE_TRANSACTION must be a non-negative number"
            );

            let eval_utc_offset_hours: i32 = parse_var(&lookup, "EVAL_UTC_OFFSET_HOURS", 0)?;
            anyhow::ensure!(
                (-23..=23).contains(&eval_utc_offset_hours),
                "EVAL_UTC_OFFSET_HOURS must be within -23..=23"
            );

            Ok(Self {
                catalog_path: lookup("CATALOG_PATH").filter(|s| !s.trim().is_empty()),
                sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.trim().is_empty()),
                recommendation_limit,
                default_average_transaction,
                eval_utc_offset_hours,
                port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            })
        }

        pub fn require_catalog_path(&self) -> anyhow::Result<&str> {
            self.catalog_path
                .as_deref()
                .context("CATALOG_PATH is required")
        }

        pub fn engine_config(&self) -> EngineConfig {
            EngineConfig {
                limit: self.recommendation_limit,
                default_average_transaction: self.default_average_transaction,
            }
        }
    }

    fn parse_var<T>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &str,
        default: T,
    ) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        match lookup(key).map(|s| s.trim().to_string()) {
            Some(raw) if !raw.is_empty() => raw
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{key}={raw:?} is invalid: {e}")),
            _ => Ok(default),
        }
    }

}
