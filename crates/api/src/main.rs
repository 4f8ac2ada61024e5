use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use swipe_core::catalog::{Catalog, CatalogHandle, CatalogSource, JsonFileCatalogSource, LoadReport};
use swipe_core::domain::contract::RawRecommendationRequest;
use swipe_core::domain::{Card, RecommendationResponse};
use swipe_core::engine::{EngineConfig, Recommender};
use swipe_core::error::RecommendError;
use swipe_core::merchant::MerchantClassification;
use swipe_core::scoring::{self, BreakEven};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = swipe_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let source: Option<Arc<dyn CatalogSource>> = match settings.require_catalog_path() {
        Ok(path) => Some(Arc::new(JsonFileCatalogSource::new(path))),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "CATALOG_PATH missing; starting API in degraded mode");
            None
        }
    };

    let catalog = match &source {
        Some(source) => match source.load().await {
            Ok((catalog, report)) => {
                tracing::info!(source = source.source_name(), ?report, "catalog ready");
                catalog
            }
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %format!("{e:#}"), "catalog load failed; starting API in degraded mode");
                Catalog::empty()
            }
        },
        None => Catalog::empty(),
    };

    let state = AppState {
        catalog: Arc::new(CatalogHandle::new(catalog)),
        source,
        engine: settings.engine_config(),
        eval_utc_offset_hours: settings.eval_utc_offset_hours,
    };

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/recommendations", post(recommend))
        .route("/merchants/detect", post(detect_merchant))
        .route("/cards", get(list_cards))
        .route("/cards/:card_id", get(get_card))
        .route("/cards/:card_id/break-even", get(get_break_even))
        .route("/catalog/reload", post(reload_catalog))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    catalog: Arc<CatalogHandle>,
    source: Option<Arc<dyn CatalogSource>>,
    engine: EngineConfig,
    eval_utc_offset_hours: i32,
}

#[derive(Debug)]
enum ApiError {
    Invalid(RecommendError),
    Malformed(String),
    NotFound(String),
    Unavailable(&'static str),
    Internal(anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Invalid(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    kind: err.kind(),
                    field: err.field(),
                    message: err.to_string(),
                },
            ),
            ApiError::Malformed(message) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    kind: "invalid_input",
                    field: None,
                    message,
                },
            ),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    kind: "not_found",
                    field: None,
                    message,
                },
            ),
            ApiError::Unavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail {
                    kind: "unavailable",
                    field: None,
                    message: message.to_string(),
                },
            ),
            ApiError::Internal(err) => {
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %format!("{err:#}"), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorDetail {
                        kind: "internal",
                        field: None,
                        message: "internal error".to_string(),
                    },
                )
            }
        };

        (status, Json(ErrorBody { error: detail })).into_response()
    }
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        ApiError::Invalid(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Malformed(rejection.body_text())
    }
}

#[derive(Debug, Deserialize)]
struct EvalDateQuery {
    eval_date: Option<String>,
}

async fn recommend(
    State(state): State<AppState>,
    Query(query): Query<EvalDateQuery>,
    body: Result<Json<RawRecommendationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("recommendation", %request_id);

    let Json(raw) = body?;
    let eval_date = swipe_core::time::resolve_eval_date(
        query.eval_date.as_deref(),
        chrono::Utc::now(),
        state.eval_utc_offset_hours,
    )
    .map_err(|e| RecommendError::invalid("eval_date", e.to_string()))?;

    let catalog = state.catalog.snapshot();
    let response: RecommendationResponse = span.in_scope(|| {
        Recommender::new(&catalog, state.engine).recommend_raw(raw, eval_date)
    })?;

    Ok(([("x-request-id", request_id.to_string())], Json(response)))
}

#[derive(Debug, Deserialize)]
struct DetectRequest {
    #[serde(alias = "url")]
    merchant: Option<String>,
}

async fn detect_merchant(
    State(state): State<AppState>,
    body: Result<Json<DetectRequest>, JsonRejection>,
) -> Result<Json<MerchantClassification>, ApiError> {
    let Json(req) = body?;
    let merchant = req
        .merchant
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| RecommendError::invalid("merchant", "must be non-empty"))?;

    let catalog = state.catalog.snapshot();
    Ok(Json(Recommender::new(&catalog, state.engine).identify(&merchant)))
}

async fn list_cards(State(state): State<AppState>) -> Json<Vec<Card>> {
    Json(state.catalog.snapshot().cards().to_vec())
}

async fn get_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<Json<Card>, ApiError> {
    let catalog = state.catalog.snapshot();
    let card = catalog
        .card(&card_id)
        .ok_or_else(|| ApiError::NotFound(format!("card {card_id} not found")))?;
    Ok(Json(card.clone()))
}

async fn get_break_even(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<Json<BreakEven>, ApiError> {
    let catalog = state.catalog.snapshot();
    let card = catalog
        .card(&card_id)
        .ok_or_else(|| ApiError::NotFound(format!("card {card_id} not found")))?;
    Ok(Json(scoring::break_even(card)))
}

async fn reload_catalog(State(state): State<AppState>) -> Result<Json<LoadReport>, ApiError> {
    let Some(source) = &state.source else {
        return Err(ApiError::Unavailable("no catalog source configured"));
    };

    let (catalog, report) = source.load().await.map_err(ApiError::Internal)?;
    state.catalog.replace(catalog);
    tracing::info!(source = source.source_name(), ?report, "catalog reloaded");
    Ok(Json(report))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn catalog_json() -> Value {
        json!({
            "cards": [
                {"id": "flat", "name": "Flat Card", "issuer": "Citi", "network": "Mastercard",
                 "rewards": [{"category": "other", "reward_rate": 2}]},
                {"id": "shopper", "name": "Shopper Card", "issuer": "Chase", "network": "Visa",
                 "annual_fee": 95,
                 "rewards": [
                    {"category": "online_retail", "reward_rate": 5},
                    {"category": "other", "reward_rate": 1}
                 ]}
            ],
            "retailers": [
                {"name": "Amazon", "primary_domain_pattern": "amazon.com",
                 "category": "online_retail", "average_transaction": 45}
            ]
        })
    }

    fn state_with(catalog: Catalog, source: Option<Arc<dyn CatalogSource>>) -> AppState {
        AppState {
            catalog: Arc::new(CatalogHandle::new(catalog)),
            source,
            engine: EngineConfig::default(),
            eval_utc_offset_hours: 0,
        }
    }

    fn test_state() -> AppState {
        let (catalog, _) = Catalog::from_json_str(&catalog_json().to_string()).unwrap();
        state_with(catalog, None)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    async fn read_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let response = app(test_state()).oneshot(get("/healthz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn recommends_for_amazon_checkout() {
        let response = app(test_state())
            .oneshot(post_json(
                "/recommendations?eval_date=2026-03-01",
                json!({"merchant": "amazon.com/gp/cart", "amount": 100}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body = read_json(response).await;
        assert_eq!(body["merchant"], "Amazon");
        assert_eq!(body["category"], "online_retail");
        assert_eq!(body["confidence"], "high");
        assert_eq!(body["eval_date"], "2026-03-01");
        assert_eq!(body["is_fallback"], false);
        assert_eq!(body["recommendations"][0]["card_id"], "shopper");
        assert_eq!(body["recommendations"][0]["estimated_reward"], 5.0);
    }

    #[tokio::test]
    async fn missing_amount_is_a_structured_400() {
        let response = app(test_state())
            .oneshot(post_json("/recommendations", json!({"merchant": "amazon.com"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["error"]["kind"], "invalid_input");
        assert_eq!(body["error"]["field"], "amount");
    }

    #[tokio::test]
    async fn bad_eval_date_and_malformed_body_are_400() {
        let response = app(test_state())
            .oneshot(post_json(
                "/recommendations?eval_date=March",
                json!({"merchant": "amazon.com", "amount": 10}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"]["field"], "eval_date");

        let request = Request::post("/recommendations")
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"]["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn degraded_mode_serves_fallback_cards() {
        let state = state_with(Catalog::empty(), None);
        let response = app(state)
            .oneshot(post_json(
                "/recommendations",
                json!({"merchant": "Joe's Pizza", "amount": 20}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["is_fallback"], true);
        assert_eq!(body["recommendations"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn detects_merchants() {
        let response = app(test_state())
            .oneshot(post_json(
                "/merchants/detect",
                json!({"url": "https://www.amazon.com/checkout"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["name"], "Amazon");
        assert_eq!(body["is_checkout"], true);
        assert_eq!(body["average_transaction"], 45.0);
    }

    #[tokio::test]
    async fn card_routes() {
        let response = app(test_state()).oneshot(get("/cards")).await.unwrap();
        assert_eq!(read_json(response).await.as_array().unwrap().len(), 2);

        let response = app(test_state()).oneshot(get("/cards/flat")).await.unwrap();
        assert_eq!(read_json(response).await["name"], "Flat Card");

        let response = app(test_state()).oneshot(get("/cards/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(response).await["error"]["kind"], "not_found");

        let response = app(test_state())
            .oneshot(get("/cards/shopper/break-even"))
            .await
            .unwrap();
        let body = read_json(response).await;
        assert_eq!(body["general_spend_needed"], 9500.0);
        assert_eq!(body["categories"][0]["category"], "online_retail");
        assert_eq!(body["categories"][0]["spend_needed"], 2375.0);
    }

    #[tokio::test]
    async fn reload_needs_a_source() {
        let response = app(test_state())
            .oneshot(post_json("/catalog/reload", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn reload_swaps_catalog() {
        let path = std::env::temp_dir().join(format!("swipe-api-reload-{}.json", std::process::id()));
        tokio::fs::write(&path, catalog_json().to_string()).await.unwrap();

        let source: Arc<dyn CatalogSource> = Arc::new(JsonFileCatalogSource::new(&path));
        let state = state_with(Catalog::empty(), Some(source));

        let response = app(state.clone())
            .oneshot(post_json("/catalog/reload", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["cards_loaded"], 2);
        assert_eq!(state.catalog.snapshot().cards().len(), 2);

        tokio::fs::remove_file(&path).await.ok();
    }
}
