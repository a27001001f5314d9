mod analysis;
mod comments;
mod visualization;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use econsult_analysis::{LexiconClassifier, StopWords, WordCloudGenerator, WordCloudOptions};
use econsult_core::{AppConfig, Classifier};
use econsult_store::{CommentStore, StoreError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};

/// Upper bound on `max_words` for a single word-cloud request.
const MAX_WORDCLOUD_WORDS: usize = 1000;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CommentStore>,
    pub wordcloud: Arc<WordCloudGenerator>,
    pub classifier: Arc<dyn Classifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<CommentStore>, stopwords: StopWords, config: Arc<AppConfig>) -> Self {
        Self {
            store,
            wordcloud: Arc::new(WordCloudGenerator::new(stopwords)),
            classifier: Arc::new(LexiconClassifier),
            config,
        }
    }

    fn wordcloud_options(&self, max_words: Option<usize>) -> WordCloudOptions {
        WordCloudOptions {
            max_words: max_words
                .unwrap_or(self.config.wordcloud_max_words)
                .min(MAX_WORDCLOUD_WORDS),
            min_token_len: self.config.wordcloud_min_token_len,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    comments: Option<u64>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn bad_request(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, "bad_request", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "engine_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> usize {
    let clamped = limit.unwrap_or(50).clamp(1, 200);
    usize::try_from(clamped).unwrap_or(200)
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    match error {
        StoreError::Validation(e) => ApiError::new(request_id, "validation_error", e.to_string()),
        StoreError::Unavailable => {
            tracing::error!(request_id = %request_id, "comment store unavailable");
            ApiError::new(request_id, "engine_unavailable", "comment store is unavailable")
        }
        other => {
            tracing::error!(request_id = %request_id, error = %other, "comment store failure");
            ApiError::new(request_id, "internal_error", "comment store failure")
        }
    }
}

/// Run store work on the blocking pool. Store calls take a `std::sync` lock
/// that an append holds across its journal write.
pub(super) async fn run_blocking<T, F>(request_id: &str, work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "blocking task failed");
            Err(ApiError::new(
                request_id,
                "internal_error",
                "background task failed",
            ))
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
        .expose_headers([HeaderName::from_static("x-request-id")])
}

fn api_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/analysis/summary", get(analysis::summary))
        .route("/api/v1/analysis/timeline", get(analysis::timeline))
        .route("/api/v1/analysis/aspects", get(analysis::aspects))
        .route("/api/v1/comments/list", get(comments::list_comments))
        .route(
            "/api/v1/comments/language-stats",
            get(comments::language_stats),
        )
        .route("/api/v1/comments/ingest", post(comments::ingest_comment))
        .route("/api/v1/comments/analyze", post(comments::analyze_comment))
        .route(
            "/api/v1/comments/analyze/batch",
            post(comments::analyze_batch),
        )
        .route(
            "/api/v1/visualization/wordcloud/sentiment",
            post(visualization::sentiment_wordcloud),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(api_router(rate_limit))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

pub fn rate_limit_state(config: &AppConfig) -> RateLimitState {
    RateLimitState::new(
        config.rate_limit_max_requests,
        Duration::from_secs(config.rate_limit_window_secs),
    )
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.clone();
    let count = tokio::task::spawn_blocking(move || store.count().map_err(|e| e.to_string()))
        .await
        .unwrap_or_else(|e| Err(e.to_string()));

    match count {
        Ok(comments) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                comments: Some(comments),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: comment store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    comments: None,
                }),
            )
        }
    }
}

async fn not_found(Extension(req_id): Extension<RequestId>) -> ApiError {
    ApiError::new(req_id.0, "not_found", "no such endpoint")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app_with(config: AppConfig, max_requests: usize) -> (Router, Arc<CommentStore>) {
        let store = Arc::new(CommentStore::in_memory());
        let state = AppState::new(Arc::clone(&store), StopWords::builtin(), Arc::new(config));
        let app = build_app(
            state,
            RateLimitState::new(max_requests, Duration::from_secs(60)),
        );
        (app, store)
    }

    fn test_app() -> (Router, Arc<CommentStore>) {
        test_app_with(
            AppConfig {
                underrepresented_threshold: 2,
                ..AppConfig::default()
            },
            10_000,
        )
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("json parse")
        };
        (status, json)
    }

    fn comment_json(text: &str, language: &str, sentiment: &str, created_at: &str) -> Value {
        json!({
            "text": text,
            "language": language,
            "sentiment": sentiment,
            "confidence": 0.9,
            "created_at": created_at,
        })
    }

    async fn seed(app: &Router) {
        let comments = [
            json!({
                "text": "Tax relief for small traders is welcome",
                "language": "en",
                "sentiment": "positive",
                "confidence": 0.9,
                "created_at": "2025-09-01T10:00:00Z",
                "highlights": ["welcome"],
                "aspects": [{"aspect_name": "Tax Relief", "sentiment": "positive", "confidence": 0.8}],
            }),
            json!({
                "text": "The filing portal is confusing and slow",
                "language": "en",
                "sentiment": "negative",
                "confidence": 0.8,
                "created_at": "2025-09-03T10:00:00Z",
                "aspects": [
                    {"aspect": "Digital Filing", "sentiment": "negative", "confidence": 0.7},
                    {"aspect": "Tax Relief", "sentiment": "neutral", "confidence": 0.5},
                ],
            }),
            comment_json("यह प्रस्ताव ठीक है", "hi", "neutral", "2025-09-03T12:00:00Z"),
        ];
        for comment in &comments {
            let (status, _) = send(app, post_json("/api/v1/comments/ingest", comment)).await;
            assert_eq!(status, StatusCode::CREATED);
        }
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(-5)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_codes_map_to_statuses() {
        let cases = [
            ("validation_error", StatusCode::BAD_REQUEST),
            ("bad_request", StatusCode::BAD_REQUEST),
            ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
            ("engine_unavailable", StatusCode::SERVICE_UNAVAILABLE),
            ("not_found", StatusCode::NOT_FOUND),
            ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            let response = ApiError::new("req-1", code, "message").into_response();
            assert_eq!(response.status(), status, "code {code}");
        }
    }

    #[test]
    fn store_errors_map_to_api_codes() {
        let unavailable = map_store_error("r".to_string(), &StoreError::Unavailable);
        assert_eq!(unavailable.error.code, "engine_unavailable");

        let validation = map_store_error(
            "r".to_string(),
            &StoreError::Validation(econsult_core::ValidationError::MissingField("text")),
        );
        assert_eq!(validation.error.code, "validation_error");
    }

    #[test]
    fn wordcloud_max_words_is_capped() {
        let state = AppState::new(
            Arc::new(CommentStore::in_memory()),
            StopWords::builtin(),
            Arc::new(AppConfig::default()),
        );
        assert_eq!(state.wordcloud_options(None).max_words, 100);
        assert_eq!(state.wordcloud_options(Some(20)).max_words, 20);
        assert_eq!(state.wordcloud_options(Some(50_000)).max_words, 1000);
    }

    #[tokio::test]
    async fn health_reports_comment_count() {
        let (app, _) = test_app();
        seed(&app).await;
        let response = app
            .clone()
            .oneshot(get_req("/api/v1/health"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let (_, json) = send(&app, get_req("/api/v1/health")).await;
        assert_eq!(json, json!({"status": "ok", "comments": 3}));
    }

    #[tokio::test]
    async fn empty_store_returns_zeroed_views() {
        let (app, _) = test_app();

        let (status, summary) = send(&app, get_req("/api/v1/analysis/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            summary,
            json!({"total": 0, "positive": 0, "neutral": 0, "negative": 0})
        );

        let (_, timeline) = send(&app, get_req("/api/v1/analysis/timeline")).await;
        assert_eq!(timeline, json!([]));

        let (_, aspects) = send(&app, get_req("/api/v1/analysis/aspects")).await;
        assert_eq!(aspects, json!([]));

        let (_, stats) = send(&app, get_req("/api/v1/comments/language-stats")).await;
        assert_eq!(
            stats,
            json!({"language_counts": {}, "underrepresented": []})
        );

        let (status, cloud) = send(
            &app,
            post_json("/api/v1/visualization/wordcloud/sentiment", &json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cloud, json!({"word_data": {}}));
    }

    #[tokio::test]
    async fn analysis_endpoints_reflect_ingested_comments() {
        let (app, _) = test_app();
        seed(&app).await;

        let (_, summary) = send(&app, get_req("/api/v1/analysis/summary")).await;
        assert_eq!(
            summary,
            json!({"total": 3, "positive": 1, "neutral": 1, "negative": 1})
        );

        let (_, timeline) = send(&app, get_req("/api/v1/analysis/timeline")).await;
        assert_eq!(
            timeline,
            json!([
                {"date": "2025-09-01", "positive": 1, "neutral": 0, "negative": 0},
                {"date": "2025-09-02", "positive": 0, "neutral": 0, "negative": 0},
                {"date": "2025-09-03", "positive": 0, "neutral": 1, "negative": 1},
            ])
        );

        let (_, sparse) = send(
            &app,
            get_req("/api/v1/analysis/timeline?skip_empty=true&from=2025-09-02"),
        )
        .await;
        assert_eq!(
            sparse,
            json!([{"date": "2025-09-03", "positive": 0, "neutral": 1, "negative": 1}])
        );

        let (_, aspects) = send(&app, get_req("/api/v1/analysis/aspects")).await;
        assert_eq!(
            aspects,
            json!([
                {"aspect": "Tax Relief", "positive": 1, "neutral": 1, "negative": 0},
                {"aspect": "Digital Filing", "positive": 0, "neutral": 0, "negative": 1},
            ])
        );

        let (_, stats) = send(&app, get_req("/api/v1/comments/language-stats")).await;
        assert_eq!(
            stats,
            json!({"language_counts": {"en": 2, "hi": 1}, "underrepresented": ["hi"]})
        );

        let (_, stats) = send(
            &app,
            get_req("/api/v1/comments/language-stats?threshold=3"),
        )
        .await;
        assert_eq!(stats["underrepresented"], json!(["hi", "en"]));
    }

    #[tokio::test]
    async fn timeline_rejects_bad_ranges() {
        let (app, _) = test_app();

        let (status, json) = send(
            &app,
            get_req("/api/v1/analysis/timeline?from=2025-09-05&to=2025-09-01"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "bad_request");

        let (status, json) = send(&app, get_req("/api/v1/analysis/timeline?from=yesterday")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["meta"]["request_id"].is_string());

        let (status, _) = send(
            &app,
            get_req("/api/v1/analysis/timeline?granularity=hour"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ingest_rejects_invalid_comment_without_storing() {
        let (app, store) = test_app();

        let mut bad = comment_json("Fine", "en", "positive", "2025-09-01T00:00:00Z");
        bad["confidence"] = json!(1.5);
        let (status, json) = send(&app, post_json("/api/v1/comments/ingest", &bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");

        let missing = json!({"text": "No sentiment here", "language": "en", "confidence": 0.5});
        let (status, json) = send(&app, post_json("/api/v1/comments/ingest", &missing)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("sentiment")));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/comments/ingest")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(store.count().expect("count"), 0);
    }

    #[tokio::test]
    async fn ingest_returns_stored_comment() {
        let (app, _) = test_app();
        let (status, json) = send(
            &app,
            post_json(
                "/api/v1/comments/ingest",
                &comment_json("Looks fine", "EN_in", "neutral", "2025-09-01T08:00:00Z"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["id"], 1);
        assert_eq!(json["language"], "en-in");
        assert_eq!(json["sentiment"], "neutral");
        assert_eq!(json["aspects"], json!([]));
    }

    #[tokio::test]
    async fn list_comments_pages_and_filters() {
        let (app, _) = test_app();
        seed(&app).await;

        let (status, json) = send(&app, get_req("/api/v1/comments/list")).await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().expect("array");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["id"], 1);
        assert_eq!(rows[0]["highlights"], json!(["welcome"]));
        assert!(rows[0].get("aspects").is_none());

        let (_, json) = send(&app, get_req("/api/v1/comments/list?limit=1&offset=1")).await;
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(json[0]["id"], 2);

        let (_, json) = send(&app, get_req("/api/v1/comments/list?sentiment=Negative")).await;
        assert_eq!(json.as_array().map(Vec::len), Some(1));
        assert_eq!(json[0]["sentiment"], "negative");

        let (_, json) = send(&app, get_req("/api/v1/comments/list?language=hi")).await;
        assert_eq!(json.as_array().map(Vec::len), Some(1));

        let (status, _) = send(&app, get_req("/api/v1/comments/list?sentiment=angry")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wordcloud_over_whole_store() {
        let (app, _) = test_app();
        seed(&app).await;

        let (status, json) = send(
            &app,
            post_json(
                "/api/v1/visualization/wordcloud/sentiment",
                &json!({"texts": null, "max_words": 100, "width": 800, "height": 400}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let words = &json["word_data"];
        assert_eq!(words["relief"], json!({"count": 1, "sentiment": "positive"}));
        assert_eq!(words["confusing"], json!({"count": 1, "sentiment": "negative"}));
        assert!(words.get("the").is_none());
    }

    #[tokio::test]
    async fn wordcloud_over_empty_texts_is_empty() {
        let (app, _) = test_app();
        seed(&app).await;

        let (status, json) = send(
            &app,
            post_json(
                "/api/v1/visualization/wordcloud/sentiment",
                &json!({"texts": [], "analysis_results": [], "max_words": 100}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"word_data": {}}));
    }

    #[tokio::test]
    async fn wordcloud_over_supplied_texts() {
        let (app, store) = test_app();
        let body = json!({
            "texts": [
                "Digital filing is simple",
                "Digital filing is broken",
                "Digital services improve",
            ],
            "analysis_results": [
                {"sentiment": "positive", "confidence": 0.9},
                {"sentiment_label": "negative", "confidence_score": 0.9},
                {"sentiment": "positive", "confidence": 0.4, "language": "en"},
            ],
            "max_words": 2,
        });
        let (status, json) = send(
            &app,
            post_json("/api/v1/visualization/wordcloud/sentiment", &body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let words = json["word_data"].as_object().expect("object");
        assert_eq!(words.len(), 2);
        assert_eq!(words["digital"], json!({"count": 3, "sentiment": "positive"}));
        assert_eq!(words["filing"], json!({"count": 2, "sentiment": "neutral"}));
        assert_eq!(store.count().expect("count"), 0);
    }

    #[tokio::test]
    async fn wordcloud_rejects_mismatched_results() {
        let (app, _) = test_app();
        let body = json!({
            "texts": ["one comment", "two comments"],
            "analysis_results": [{"sentiment": "positive", "confidence": 0.9}],
        });
        let (status, json) = send(
            &app,
            post_json("/api/v1/visualization/wordcloud/sentiment", &body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "bad_request");

        let body = json!({
            "texts": ["one comment"],
            "analysis_results": [{"sentiment": "elated", "confidence": 0.9}],
        });
        let (status, json) = send(
            &app,
            post_json("/api/v1/visualization/wordcloud/sentiment", &body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn analyze_classifies_and_stores() {
        let (app, store) = test_app();
        let (status, json) = send(
            &app,
            post_json(
                "/api/v1/comments/analyze",
                &json!({"text": "The compliance burden is unfair.", "language": "en"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["sentiment"], "negative");
        assert_eq!(json["aspects"][0]["aspect_name"], "Compliance Burden");
        assert_eq!(store.count().expect("count"), 1);

        let (status, json) = send(
            &app,
            post_json(
                "/api/v1/comments/analyze",
                &json!({"text": "நல்ல திட்டம்", "language": "ta"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "bad_request");

        let (status, json) = send(
            &app,
            post_json("/api/v1/comments/analyze", &json!({"text": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
        assert_eq!(store.count().expect("count"), 1);
    }

    #[tokio::test]
    async fn analyze_batch_stores_every_text_with_summary() {
        let (app, store) = test_app();
        let (status, json) = send(
            &app,
            post_json(
                "/api/v1/comments/analyze/batch",
                &json!({
                    "texts": [
                        "The compliance burden is unfair.",
                        "Digital filing is simple and clear.",
                        "Digital filing is simple and helpful.",
                    ],
                    "language": "en",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let comments = json["comments"].as_array().expect("comments");
        let ids: Vec<u64> = comments.iter().filter_map(|c| c["id"].as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(comments[0]["sentiment"], "negative");

        let summary = &json["summary"];
        assert_eq!(summary["total"], 3);
        assert_eq!(summary["positive"], 2);
        assert_eq!(summary["negative"], 1);
        assert_eq!(summary["neutral"], 0);
        let average = summary["average_confidence"].as_f64().expect("average");
        let expected = comments
            .iter()
            .filter_map(|c| c["confidence"].as_f64())
            .sum::<f64>()
            / 3.0;
        assert!((average - expected).abs() < 1e-9);
        assert_eq!(store.count().expect("count"), 3);
    }

    #[tokio::test]
    async fn analyze_batch_rejects_without_storing() {
        let (app, store) = test_app();

        let (status, json) = send(
            &app,
            post_json("/api/v1/comments/analyze/batch", &json!({"texts": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");

        let (status, json) = send(
            &app,
            post_json(
                "/api/v1/comments/analyze/batch",
                &json!({"texts": ["Good draft", "  "]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("texts[1]")));

        let (status, json) = send(
            &app,
            post_json(
                "/api/v1/comments/analyze/batch",
                &json!({"texts": ["நல்ல திட்டம்"], "language": "ta"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "bad_request");

        assert_eq!(store.count().expect("count"), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reads_interleave_with_ingests() {
        let (app, store) = test_app();
        let mut tasks = Vec::new();
        for _ in 0..20 {
            let app = app.clone();
            tasks.push(tokio::spawn(async move {
                let body = comment_json("Portal is slow", "en", "negative", "2025-09-01T00:00:00Z");
                let (status, _) = send(&app, post_json("/api/v1/comments/ingest", &body)).await;
                assert_eq!(status, StatusCode::CREATED);

                let (status, summary) = send(&app, get_req("/api/v1/analysis/summary")).await;
                assert_eq!(status, StatusCode::OK);
                let total = summary["total"].as_u64().expect("total");
                assert!((1..=20).contains(&total));
                assert_eq!(summary["negative"].as_u64(), Some(total));
            }));
        }
        for task in tasks {
            task.await.expect("task");
        }
        assert_eq!(store.count().expect("count"), 20);
    }

    #[tokio::test]
    async fn api_routes_are_rate_limited_but_health_is_not() {
        let (app, _) = test_app_with(AppConfig::default(), 1);

        let (status, _) = send(&app, get_req("/api/v1/analysis/summary")).await;
        assert_eq!(status, StatusCode::OK);
        let (status, json) = send(&app, get_req("/api/v1/analysis/summary")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"]["code"], "rate_limited");

        let (status, _) = send(&app, get_req("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_uses_error_envelope() {
        let (app, _) = test_app();
        let (status, json) = send(&app, get_req("/api/v1/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }
}
