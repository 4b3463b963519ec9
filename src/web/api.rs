//! JSON API handlers for the web front end.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content.

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::assessment::{
    AssessmentFlow, FlowState, GENERIC_ERROR, Gender, Metric, MetricSpec, NEXT_STEPS, Prediction,
    ResultSource, RiskLevel, RiskMetrics,
};
use crate::catalog::{
    Catalog, CatalogQuery, DIET_TAG_FILTERS, Level,
    diet::DietSummary,
    exercise::ExerciseSummary,
};
use crate::gateway::{Gateway, Topic};

use super::{AppState, content_type_json, error_response};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DietListResponse<'a> {
    plans: Vec<DietSummary<'a>>,
    tag_filters: &'static [&'static str],
}

#[derive(Serialize)]
struct ExerciseListResponse<'a> {
    plans: Vec<ExerciseSummary<'a>>,
    levels: Vec<&'static str>,
    categories: Vec<&'a str>,
}

#[derive(Serialize)]
struct FormResponse {
    metrics: Vec<MetricSpec>,
    genders: Vec<Gender>,
    defaults: RiskMetrics,
}

/// Assessment plus the text shown around it.
#[derive(Serialize)]
struct PredictResponse {
    prediction: Prediction,
    probability: f64,
    probability_pct: i64,
    risk: RiskLevel,
    source: ResultSource,
    interpretation: &'static str,
    next_steps: &'static [&'static str],
    metrics: RiskMetrics,
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

/// Opening message and failure text of a chat panel.
#[derive(Serialize)]
struct ChatSeedResponse {
    topic: &'static str,
    greeting: &'static str,
    apology: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    endpoint: String,
    model: String,
    credential_env: String,
    credential_present: bool,
    diet_plans: usize,
    exercise_plans: usize,
    request_log: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

/// Decoded `key=value` pairs of the URL's query string.
fn query_pairs(url: &str) -> Vec<(String, String)> {
    let Some((_, query)) = url.split_once('?') else {
        return Vec::new();
    };
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Build a catalog query from `q`, repeated `tag`, `level` and `category`.
fn catalog_query(url: &str) -> CatalogQuery {
    let mut query = CatalogQuery::default();
    for (key, value) in query_pairs(url) {
        match key.as_str() {
            "q" => query.text = value,
            "tag" if !value.is_empty() => query.tags.push(value),
            "level" => query.level = Some(value),
            "category" => query.category = Some(value),
            _ => {}
        }
    }
    query
}

// ---------------------------------------------------------------------------
// Catalog handlers
// ---------------------------------------------------------------------------

/// `GET /api/diet?q=&tag=…`: filtered diet summaries.
pub fn list_diets(catalog: &Catalog, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let query = catalog_query(url);
    let resp = DietListResponse {
        plans: catalog
            .filter_diets(&query)
            .into_iter()
            .map(|plan| plan.summary())
            .collect(),
        tag_filters: &DIET_TAG_FILTERS,
    };
    json_response(&resp)
}

/// `GET /api/exercise?q=&level=&category=`: filtered exercise summaries.
pub fn list_exercises(catalog: &Catalog, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let query = catalog_query(url);
    let resp = ExerciseListResponse {
        plans: catalog
            .filter_exercises(&query)
            .into_iter()
            .map(|plan| plan.summary())
            .collect(),
        levels: Level::ALL.iter().map(|level| level.as_str()).collect(),
        categories: catalog.exercise_categories(),
    };
    json_response(&resp)
}

/// `GET /api/diet/{id}`
pub fn get_diet(catalog: &Catalog, id: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    match catalog.diet(id) {
        Some(plan) => json_response(plan),
        None => Ok(error_response(404, &format!("no diet plan '{id}'"))),
    }
}

/// `GET /api/exercise/{id}`
pub fn get_exercise(catalog: &Catalog, id: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    match catalog.exercise(id) {
        Some(plan) => json_response(plan),
        None => Ok(error_response(404, &format!("no exercise plan '{id}'"))),
    }
}

// ---------------------------------------------------------------------------
// Risk assessment handlers
// ---------------------------------------------------------------------------

/// `GET /api/form`: metric ranges and defaults.
pub fn get_form() -> Result<Response<Cursor<Vec<u8>>>> {
    let resp = FormResponse {
        metrics: Metric::ALL.iter().map(|metric| metric.spec()).collect(),
        genders: Gender::ALL.to_vec(),
        defaults: RiskMetrics::default(),
    };
    json_response(&resp)
}

/// `POST /api/predict`: metrics in, assessment out.
///
/// Missing fields take their defaults and every value is clamped. A gateway
/// failure answers 502 with the generic message.
pub fn post_predict(gateway: &Gateway, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let metrics: RiskMetrics = match serde_json::from_str(body) {
        Ok(metrics) => metrics,
        Err(e) => return Ok(error_response(400, &format!("invalid metrics: {e}"))),
    };

    let mut flow = AssessmentFlow::with_metrics(metrics);
    let metrics = *flow.metrics();
    match flow.submit(gateway) {
        FlowState::Succeeded(assessment) => {
            let result = assessment.result;
            json_response(&PredictResponse {
                prediction: result.prediction,
                probability: result.probability,
                probability_pct: result.probability_pct(),
                risk: result.risk,
                source: assessment.source,
                interpretation: result.interpretation(),
                next_steps: &NEXT_STEPS,
                metrics,
            })
        }
        FlowState::Failed(message) => Ok(error_response(502, message)),
        FlowState::Editing | FlowState::Submitting => Ok(error_response(500, GENERIC_ERROR)),
    }
}

// ---------------------------------------------------------------------------
// Chat handlers
// ---------------------------------------------------------------------------

/// `GET /api/chat/{diet|exercise}`: greeting and apology for a fresh panel.
pub fn get_chat(topic: Topic) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&ChatSeedResponse {
        topic: topic.as_str(),
        greeting: topic.greeting(),
        apology: topic.apology(),
    })
}

/// `POST /api/chat/{diet|exercise}`: `{message}` in, `{reply}` out.
///
/// The reply is the model's text, or the topic apology when the call fails.
pub fn post_chat(gateway: &Gateway, topic: Topic, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let request: ChatRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => return Ok(error_response(400, &format!("invalid chat request: {e}"))),
    };
    if request.message.trim().is_empty() {
        return Ok(error_response(400, "message is empty"));
    }

    let reply = match topic {
        Topic::Diet => gateway.advise_on_diet(&request.message),
        Topic::Exercise => gateway.advise_on_exercise(&request.message),
    };
    json_response(&ChatResponse { reply })
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// `GET /api/health`
pub fn get_health(state: &AppState) -> Result<Response<Cursor<Vec<u8>>>> {
    let config = &state.config;
    let credential_present = std::env::var(&config.gateway.api_key_env)
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);

    let resp = HealthResponse {
        endpoint: config.gateway.endpoint.clone(),
        model: state.gateway.model_name().to_string(),
        credential_env: config.gateway.api_key_env.clone(),
        credential_present,
        diet_plans: state.catalog.diets().len(),
        exercise_plans: state.catalog.exercises().len(),
        request_log: config
            .logging
            .enabled
            .then(|| crate::config::expand_path(&config.logging.path))
            .flatten()
            .map(|path| path.display().to_string()),
    };
    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_decode_percent_and_plus() {
        let pairs = query_pairs("/api/diet?q=low+carb&tag=Heart-Healthy&tag=Weight%20Loss");
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "low carb".to_string()),
                ("tag".to_string(), "Heart-Healthy".to_string()),
                ("tag".to_string(), "Weight Loss".to_string()),
            ]
        );
        assert!(query_pairs("/api/diet").is_empty());
    }

    #[test]
    fn catalog_query_collects_filters() {
        let query = catalog_query("/api/exercise?q=walk&level=Beginner&category=all&tag=");
        assert_eq!(query.text, "walk");
        assert_eq!(query.level.as_deref(), Some("Beginner"));
        assert_eq!(query.category.as_deref(), Some("all"));
        assert!(query.tags.is_empty());
    }

    #[test]
    fn invalid_predict_body_is_400() {
        struct Never;
        impl crate::gateway::CompletionTransport for Never {
            fn complete(
                &self,
                _request: &crate::gateway::CompletionRequest<'_>,
            ) -> Result<String, crate::gateway::GatewayError> {
                panic!("gateway must not be called");
            }
            fn model_name(&self) -> &str {
                "never"
            }
        }

        let gateway = Gateway::new(Never);
        let resp = post_predict(&gateway, "not json").unwrap();
        assert_eq!(resp.status_code().0, 400);
        let resp = post_chat(&gateway, Topic::Diet, r#"{"message": ""}"#).unwrap();
        assert_eq!(resp.status_code().0, 400);
    }
}
