use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use econsult_analysis::{AspectBucket, Granularity, Summary, TimelineBucket, TimelineOptions};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_store_error, run_blocking, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct TimelineQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub granularity: Option<Granularity>,
    pub skip_empty: Option<bool>,
}

impl TimelineQuery {
    fn into_options(self) -> Result<TimelineOptions, String> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(format!("`from` ({from}) must not be after `to` ({to})"));
            }
        }
        Ok(TimelineOptions {
            granularity: self.granularity.unwrap_or_default(),
            from: self.from,
            to: self.to,
            skip_empty: self.skip_empty.unwrap_or(false),
        })
    }
}

pub(super) async fn summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Summary>, ApiError> {
    let store = state.store.clone();
    let request_id = req_id.0.clone();
    let summary = run_blocking(&req_id.0, move || {
        store
            .summary()
            .map_err(|e| map_store_error(request_id, &e))
    })
    .await?;
    Ok(Json(summary))
}

pub(super) async fn timeline(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    query: Result<Query<TimelineQuery>, QueryRejection>,
) -> Result<Json<Vec<TimelineBucket>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(req_id.0.clone(), e.body_text()))?;
    let options = query
        .into_options()
        .map_err(|message| ApiError::bad_request(req_id.0.clone(), message))?;

    let store = state.store.clone();
    let request_id = req_id.0.clone();
    let buckets = run_blocking(&req_id.0, move || {
        store
            .timeline(&options)
            .map_err(|e| map_store_error(request_id, &e))
    })
    .await?;
    Ok(Json(buckets))
}

pub(super) async fn aspects(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<AspectBucket>>, ApiError> {
    let store = state.store.clone();
    let request_id = req_id.0.clone();
    let aspects = run_blocking(&req_id.0, move || {
        store
            .aspects()
            .map_err(|e| map_store_error(request_id, &e))
    })
    .await?;
    Ok(Json(aspects))
}
