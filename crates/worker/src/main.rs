use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swipe_core::catalog::{Catalog, CatalogSource, JsonFileCatalogSource};
use swipe_core::domain::{RecommendationRequest, UserPreferences};
use swipe_core::engine::{EngineConfig, Recommender};

mod batch;

#[derive(Debug, Parser)]
#[command(name = "swipe_worker")]
struct Args {
    /// Catalog JSON file. Defaults to CATALOG_PATH.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Evaluation date (YYYY-MM-DD). Defaults to today at EVAL_UTC_OFFSET_HOURS.
    #[arg(long, global = true)]
    eval_date: Option<String>,

    /// Maximum recommendations per request. Defaults to RECOMMENDATION_LIMIT.
    #[arg(long, global = true)]
    limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank cards for one purchase and print the response as JSON.
    Recommend(RecommendArgs),
    /// Load the catalog and print what was kept and skipped.
    Validate,
    /// Rank every request in a JSON array file.
    Batch {
        /// File holding a JSON array of `{merchant, amount, user_preferences}` objects.
        input: PathBuf,
    },
}

#[derive(Debug, ClapArgs)]
struct RecommendArgs {
    /// Merchant URL, domain or name.
    #[arg(long)]
    merchant: String,

    #[arg(long)]
    amount: f64,

    #[arg(long = "issuer")]
    preferred_issuers: Vec<String>,

    #[arg(long = "network")]
    preferred_networks: Vec<String>,

    #[arg(long)]
    max_annual_fee: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = swipe_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let catalog_path = match args.catalog {
        Some(path) => path,
        None => PathBuf::from(settings.require_catalog_path()?),
    };
    let source = JsonFileCatalogSource::new(catalog_path);

    let eval_date = swipe_core::time::resolve_eval_date(
        args.eval_date.as_deref(),
        chrono::Utc::now(),
        settings.eval_utc_offset_hours,
    )?;

    let mut config = settings.engine_config();
    if let Some(limit) = args.limit {
        anyhow::ensure!(limit >= 1, "--limit must be >= 1");
        config.limit = limit;
    }

    let result = run(args.command, &source, config, eval_date).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "worker run failed");
    }
    result
}

async fn run(
    command: Command,
    source: &JsonFileCatalogSource,
    config: EngineConfig,
    eval_date: chrono::NaiveDate,
) -> anyhow::Result<()> {
    let (catalog, report) = source.load().await?;
    tracing::info!(
        source = source.source_name(),
        path = %source.path().display(),
        ?report,
        "catalog loaded"
    );

    match command {
        Command::Validate => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            anyhow::ensure!(
                report.cards_loaded > 0,
                "catalog {} has no usable cards",
                source.path().display()
            );
        }
        Command::Recommend(args) => {
            let request = args.into_request();
            let response = Recommender::new(&catalog, config).recommend(&request, eval_date)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Batch { input } => {
            let raw = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("read batch input {}", input.display()))?;
            let requests = batch::parse_requests(&raw)
                .with_context(|| format!("parse batch input {}", input.display()))?;

            let catalog: Arc<Catalog> = Arc::new(catalog);
            let outcomes = batch::run(catalog, config, eval_date, requests).await?;
            let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
            tracing::info!(total = outcomes.len(), failed, "batch finished");
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
        }
    }

    Ok(())
}

impl RecommendArgs {
    fn into_request(self) -> RecommendationRequest {
        let preferences = UserPreferences {
            preferred_issuers: self.preferred_issuers,
            preferred_networks: self.preferred_networks,
            max_annual_fee: self.max_annual_fee,
        };
        RecommendationRequest {
            merchant: self.merchant,
            amount: self.amount,
            user_preferences: (!preferences.is_empty()).then_some(preferences),
        }
    }
}

fn init_sentry(settings: &swipe_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
