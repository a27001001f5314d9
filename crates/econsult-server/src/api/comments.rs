use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use econsult_analysis::{rescan, LanguageStats, Summary};
use econsult_core::{
    normalize_language, ClassifierError, Comment, CommentId, NewComment, Sentiment,
};
use econsult_store::CommentFilter;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, normalize_limit, run_blocking, ApiError, AppState};

/// Most texts accepted by one batch analysis request.
const MAX_BATCH_TEXTS: usize = 1000;

#[derive(Debug, Serialize)]
pub(super) struct CommentItem {
    pub id: CommentId,
    pub text: String,
    pub language: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub highlights: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentItem {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            language: comment.language,
            sentiment: comment.sentiment,
            confidence: comment.confidence,
            highlights: comment.highlights,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListCommentsQuery {
    pub limit: Option<i64>,
    pub offset: Option<usize>,
    pub language: Option<String>,
    pub sentiment: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ListCommentsQuery {
    fn filter(&self) -> Result<CommentFilter, String> {
        let mut filter = CommentFilter::default().between(self.from, self.to);
        if let Some(language) = self.language.as_deref() {
            filter = filter.language(normalize_language(language).map_err(|e| e.to_string())?);
        }
        if let Some(sentiment) = self.sentiment.as_deref() {
            filter = filter.sentiment(sentiment.parse::<Sentiment>().map_err(|e| e.to_string())?);
        }
        Ok(filter)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct LanguageStatsQuery {
    pub threshold: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    pub text: Option<String>,
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Batch analysis body. Every text shares `language` and `created_at`.
#[derive(Debug, Deserialize)]
pub(super) struct BatchAnalyzeRequest {
    pub texts: Vec<String>,
    pub language: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(super) struct BatchSummary {
    #[serde(flatten)]
    pub counts: Summary,
    pub average_confidence: f64,
}

impl BatchSummary {
    fn of(comments: &[Arc<Comment>]) -> Self {
        let counts = rescan::summary(comments.iter().map(AsRef::as_ref));
        let average_confidence = if comments.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = comments.len() as f64;
            comments.iter().map(|c| c.confidence).sum::<f64>() / n
        };
        Self {
            counts,
            average_confidence,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct BatchAnalyzeResponse {
    pub comments: Vec<Comment>,
    pub summary: BatchSummary,
}

pub(super) async fn list_comments(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<ListCommentsQuery>, QueryRejection>,
) -> Result<Json<Vec<CommentItem>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(req_id.0.clone(), e.body_text()))?;
    let filter = query
        .filter()
        .map_err(|message| ApiError::bad_request(req_id.0.clone(), message))?;

    let store = state.store.clone();
    let request_id = req_id.0.clone();
    let offset = query.offset.unwrap_or(0);
    let limit = normalize_limit(query.limit);
    let rows = run_blocking(&req_id.0, move || {
        store
            .page(filter, offset, limit)
            .map_err(|e| map_store_error(request_id, &e))
    })
    .await?;

    Ok(Json(rows.into_iter().map(CommentItem::from).collect()))
}

pub(super) async fn language_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<LanguageStatsQuery>, QueryRejection>,
) -> Result<Json<LanguageStats>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(req_id.0.clone(), e.body_text()))?;
    let threshold = query
        .threshold
        .unwrap_or(state.config.underrepresented_threshold);

    let store = state.store.clone();
    let request_id = req_id.0.clone();
    let stats = run_blocking(&req_id.0, move || {
        store
            .language_stats(threshold)
            .map_err(|e| map_store_error(request_id, &e))
    })
    .await?;
    Ok(Json(stats))
}

pub(super) async fn ingest_comment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let Json(new_comment) =
        payload.map_err(|e| ApiError::bad_request(req_id.0.clone(), e.body_text()))?;

    let store = state.store.clone();
    let request_id = req_id.0.clone();
    let stored = run_blocking(&req_id.0, move || {
        store
            .append(new_comment)
            .map_err(|e| map_store_error(request_id, &e))
    })
    .await?;

    tracing::info!(
        request_id = %req_id.0,
        id = stored.id,
        language = %stored.language,
        sentiment = %stored.sentiment,
        "comment ingested"
    );
    Ok((StatusCode::CREATED, Json(Comment::clone(&stored))))
}

pub(super) async fn analyze_comment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(req_id.0.clone(), e.body_text()))?;

    let text = request
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            ApiError::new(req_id.0.clone(), "validation_error", "text must not be blank")
        })?;
    let language = normalize_language(
        request
            .language
            .as_deref()
            .unwrap_or(&state.config.default_language),
    )
    .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let store = state.store.clone();
    let classifier = state.classifier.clone();
    let request_id = req_id.0.clone();
    let created_at = request.created_at;
    let stored = run_blocking(&req_id.0, move || {
        let result = classifier
            .classify(&text, &language)
            .map_err(|e| map_classifier_error(request_id.clone(), &e))?;
        store
            .append(result.into_new_comment(text, language, created_at))
            .map_err(|e| map_store_error(request_id, &e))
    })
    .await?;

    tracing::info!(
        request_id = %req_id.0,
        id = stored.id,
        sentiment = %stored.sentiment,
        confidence = stored.confidence,
        "comment classified and stored"
    );
    Ok((StatusCode::CREATED, Json(Comment::clone(&stored))))
}

/// Classify every text, then append them in order.
///
/// Nothing is stored unless every text is non-blank and classifies.
pub(super) async fn analyze_batch(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<BatchAnalyzeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BatchAnalyzeResponse>), ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(req_id.0.clone(), e.body_text()))?;

    if request.texts.is_empty() {
        return Err(ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "texts must not be empty",
        ));
    }
    if request.texts.len() > MAX_BATCH_TEXTS {
        return Err(ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("at most {MAX_BATCH_TEXTS} texts per request"),
        ));
    }
    if let Some(index) = request.texts.iter().position(|t| t.trim().is_empty()) {
        return Err(ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("texts[{index}] must not be blank"),
        ));
    }
    let language = normalize_language(
        request
            .language
            .as_deref()
            .unwrap_or(&state.config.default_language),
    )
    .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let store = state.store.clone();
    let classifier = state.classifier.clone();
    let request_id = req_id.0.clone();
    let created_at = request.created_at;
    let texts = request.texts;
    let stored = run_blocking(&req_id.0, move || {
        let payloads = texts
            .into_iter()
            .map(|text| {
                classifier
                    .classify(&text, &language)
                    .map(|result| result.into_new_comment(text, language.clone(), created_at))
                    .map_err(|e| map_classifier_error(request_id.clone(), &e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .into_iter()
            .map(|payload| {
                store
                    .append(payload)
                    .map_err(|e| map_store_error(request_id.clone(), &e))
            })
            .collect::<Result<Vec<_>, _>>()
    })
    .await?;

    let summary = BatchSummary::of(&stored);
    tracing::info!(
        request_id = %req_id.0,
        comments = stored.len(),
        positive = summary.counts.positive,
        neutral = summary.counts.neutral,
        negative = summary.counts.negative,
        "batch classified and stored"
    );
    Ok((
        StatusCode::CREATED,
        Json(BatchAnalyzeResponse {
            comments: stored.iter().map(|c| c.as_ref().clone()).collect(),
            summary,
        }),
    ))
}

fn map_classifier_error(request_id: String, error: &ClassifierError) -> ApiError {
    match error {
        ClassifierError::UnsupportedLanguage(_) => {
            ApiError::bad_request(request_id, error.to_string())
        }
        ClassifierError::Failed(reason) => {
            tracing::error!(request_id = %request_id, reason = %reason, "classifier failed");
            ApiError::new(request_id, "classifier_error", "classification failed")
        }
    }
}
