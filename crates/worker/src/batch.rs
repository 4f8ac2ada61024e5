use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use swipe_core::catalog::Catalog;
use swipe_core::domain::contract::RawRecommendationRequest;
use swipe_core::domain::RecommendationResponse;
use swipe_core::engine::{EngineConfig, Recommender};

#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<RecommendationResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn parse_requests(raw: &str) -> anyhow::Result<Vec<RawRecommendationRequest>> {
    serde_json::from_str(raw).context("batch input must be a JSON array of requests")
}

/// Ranks each request on its own task against one shared catalog snapshot. A request that
/// fails validation yields an outcome with `error` set; the rest of the batch still runs.
pub async fn run(
    catalog: Arc<Catalog>,
    config: EngineConfig,
    eval_date: NaiveDate,
    requests: Vec<RawRecommendationRequest>,
) -> anyhow::Result<Vec<BatchOutcome>> {
    let mut handles = Vec::with_capacity(requests.len());
    for (index, raw) in requests.into_iter().enumerate() {
        let catalog = Arc::clone(&catalog);
        handles.push(tokio::spawn(async move {
            let merchant = raw.merchant.clone();
            match Recommender::new(&catalog, config).recommend_raw(raw, eval_date) {
                Ok(response) => BatchOutcome {
                    index,
                    merchant,
                    response: Some(response),
                    error: None,
                },
                Err(err) => {
                    tracing::warn!(index, error = %err, "batch request rejected");
                    BatchOutcome {
                        index,
                        merchant,
                        response: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await.context("batch task panicked")?);
    }
    Ok(outcomes)
}
