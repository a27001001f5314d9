use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use econsult_analysis::{WordCloud, WordCloudSample};
use econsult_core::{normalize_language, Sentiment};
use econsult_store::CommentFilter;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_store_error, run_blocking, ApiError, AppState};

/// Word-cloud request body.
///
/// Without `texts` (absent or `null`) the cloud covers every stored comment.
/// With `texts`, `analysis_results[i]` labels `texts[i]`, and an empty list
/// yields an empty cloud. The `width`/`height` render hints sent by the
/// dashboard are accepted and ignored.
#[derive(Debug, Deserialize)]
pub(super) struct WordCloudRequest {
    pub texts: Option<Vec<String>>,
    pub analysis_results: Option<Vec<AnalysisResult>>,
    pub max_words: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AnalysisResult {
    #[serde(alias = "sentiment_label")]
    pub sentiment: String,
    #[serde(alias = "confidence_score")]
    pub confidence: f64,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct WordCloudResponse {
    pub word_data: WordCloud,
}

/// A caller-supplied text with its validated label.
#[derive(Debug, PartialEq)]
struct LabeledText {
    text: String,
    language: String,
    sentiment: Sentiment,
    confidence: f64,
}

impl LabeledText {
    fn sample(&self) -> WordCloudSample<'_> {
        WordCloudSample {
            text: &self.text,
            language: &self.language,
            sentiment: self.sentiment,
            confidence: self.confidence,
        }
    }
}

#[derive(Debug, PartialEq)]
enum RequestError {
    BadRequest(String),
    Validation(String),
}

/// Pair `texts` with `analysis_results`. `Ok(None)` means "use the store".
fn labeled_texts(
    texts: Option<Vec<String>>,
    results: Option<Vec<AnalysisResult>>,
    default_language: &str,
) -> Result<Option<Vec<LabeledText>>, RequestError> {
    let results = results.unwrap_or_default();
    let Some(texts) = texts else {
        if results.is_empty() {
            return Ok(None);
        }
        return Err(RequestError::BadRequest(
            "analysis_results given without texts".to_string(),
        ));
    };

    if texts.len() != results.len() {
        return Err(RequestError::BadRequest(format!(
            "texts has {} entries but analysis_results has {}",
            texts.len(),
            results.len()
        )));
    }

    texts
        .into_iter()
        .zip(results)
        .enumerate()
        .map(|(i, (text, result))| {
            let sentiment: Sentiment = result
                .sentiment
                .parse()
                .map_err(|e| RequestError::Validation(format!("analysis_results[{i}]: {e}")))?;
            if !(0.0..=1.0).contains(&result.confidence) {
                return Err(RequestError::Validation(format!(
                    "analysis_results[{i}]: confidence {} is outside [0, 1]",
                    result.confidence
                )));
            }
            let language =
                normalize_language(result.language.as_deref().unwrap_or(default_language))
                    .map_err(|e| {
                        RequestError::Validation(format!("analysis_results[{i}]: {e}"))
                    })?;
            Ok(LabeledText {
                text,
                language,
                sentiment,
                confidence: result.confidence,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

pub(super) async fn sentiment_wordcloud(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<WordCloudRequest>, JsonRejection>,
) -> Result<Json<WordCloudResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request(req_id.0.clone(), e.body_text()))?;
    let options = state.wordcloud_options(request.max_words);

    let labeled = labeled_texts(
        request.texts,
        request.analysis_results,
        &state.config.default_language,
    )
    .map_err(|e| match e {
        RequestError::BadRequest(message) => ApiError::bad_request(req_id.0.clone(), message),
        RequestError::Validation(message) => {
            ApiError::new(req_id.0.clone(), "validation_error", message)
        }
    })?;

    let generator = state.wordcloud.clone();
    let store = state.store.clone();
    let request_id = req_id.0.clone();
    let word_data = run_blocking(&req_id.0, move || match labeled {
        Some(texts) => Ok(generator.generate(texts.iter().map(LabeledText::sample), options)),
        None => store
            .word_cloud(&generator, CommentFilter::default(), options)
            .map_err(|e| map_store_error(request_id, &e)),
    })
    .await?;

    tracing::debug!(
        request_id = %req_id.0,
        words = word_data.len(),
        max_words = options.max_words,
        "word cloud generated"
    );
    Ok(Json(WordCloudResponse { word_data }))
}
