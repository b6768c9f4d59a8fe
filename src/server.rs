//! HTTP control surface for the translation health engine.
//!
//! Reads are public. Everything that changes engine state goes through
//! `require_api_key`, which is a no-op when no admin key is configured.

use crate::error::HealthError;
use crate::health::{
    DetectionConfigPatch, DetectionEvent, HealthEngine, Issue, IssueFilter,
};
use crate::i18n::{LocaleConfig, LocaleRegistry};
use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<HealthEngine>,
    pub registry: Arc<LocaleRegistry>,
    /// Bearer token required for mutating routes; `None` disables the check
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(engine: Arc<HealthEngine>, registry: Arc<LocaleRegistry>, api_key: Option<String>) -> Self {
        Self {
            engine,
            registry,
            api_key,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unauthorized,
    Unavailable(String),
    Internal(String),
}

impl From<HealthError> for ApiError {
    fn from(err: HealthError) -> Self {
        match err {
            HealthError::Import(_) | HealthError::InvalidIssue(_) => {
                ApiError::BadRequest(err.to_string())
            }
            HealthError::EngineDisabled => ApiError::Unavailable(err.to_string()),
            HealthError::Serialization(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid API key".to_string(),
            ),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Protected routes (require the admin key when one is configured)
    let protected = Router::new()
        .route("/api/events", post(post_event))
        .route("/api/events/lookup", post(post_lookup))
        .route("/api/issues/:id/resolve", post(resolve_issue))
        .route("/api/issues/:id/ignore", post(ignore_issue))
        .route("/api/issues/:id/reopen", post(reopen_issue))
        .route("/api/maintenance/clear-resolved", post(clear_resolved))
        .route("/api/maintenance/clear-all", post(clear_all))
        .route("/api/maintenance/reset", post(reset))
        .route("/api/detection/toggle", post(toggle_detection))
        .route("/api/detection/config", patch(update_config))
        .route("/api/import", post(import_data))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    // Public routes
    let public = Router::new()
        .route("/health", get(liveness))
        .route("/api/issues", get(list_issues))
        .route("/api/issues/:id", get(get_issue))
        .route("/api/config", get(get_config))
        .route("/api/health-score", get(get_health))
        .route("/api/metrics", get(get_metrics))
        .route("/api/locales", get(list_locales))
        .route("/api/export", get(export_data));

    Router::new().merge(protected).merge(public).with_state(state)
}

/// Constant-time comparison so key checks do not leak timing
fn api_key_matches(provided: &str, expected: &str) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|key| api_key_matches(key, expected));

    if !authorized {
        warn!("Rejected {} {}: bad API key", request.method(), request.uri().path());
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

// ==================== Responses ====================

#[derive(Debug, Serialize)]
struct LivenessResponse {
    status: &'static str,
    module: &'static str,
    version: &'static str,
    engine_enabled: bool,
}

#[derive(Debug, Serialize)]
struct EventResponse {
    recorded: bool,
    issue: Option<Issue>,
}

#[derive(Debug, Serialize)]
struct IssueResponse {
    found: bool,
    issue: Option<Issue>,
}

#[derive(Debug, Serialize)]
struct RemovedResponse {
    removed: usize,
}

#[derive(Debug, Serialize)]
struct ToggleResponse {
    enabled: bool,
}

// ==================== Requests ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest {
    locale: String,
    full_key: String,
}

#[derive(Debug, Default, Deserialize)]
struct ToggleRequest {
    #[serde(default)]
    enabled: Option<bool>,
}

// ==================== Handlers ====================

async fn liveness(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        engine_enabled: state.engine.is_feature_enabled(),
    })
}

async fn list_issues(
    State(state): State<AppState>,
    Query(filter): Query<IssueFilter>,
) -> Json<Vec<Issue>> {
    Json(state.engine.issues(&filter))
}

async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Issue>, ApiError> {
    state
        .engine
        .issue(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Issue '{}' not found", id)))
}

async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.config())
}

async fn get_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.health())
}

async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.engine.metrics())
}

async fn list_locales(State(state): State<AppState>) -> Json<Vec<LocaleConfig>> {
    Json(state.registry.list_all().into_iter().cloned().collect())
}

async fn post_event(
    State(state): State<AppState>,
    Json(event): Json<DetectionEvent>,
) -> Json<EventResponse> {
    let issue = state.engine.handle_event(event);
    Json(EventResponse {
        recorded: issue.is_some(),
        issue,
    })
}

async fn post_lookup(
    State(state): State<AppState>,
    Json(request): Json<LookupRequest>,
) -> StatusCode {
    state.engine.observe_lookup(&request.locale, &request.full_key);
    StatusCode::NO_CONTENT
}

/// Unknown ids are not an error; the caller may be working from a stale list.
fn issue_response(issue: Option<Issue>) -> Json<IssueResponse> {
    Json(IssueResponse {
        found: issue.is_some(),
        issue,
    })
}

async fn resolve_issue(State(state): State<AppState>, Path(id): Path<String>) -> Json<IssueResponse> {
    issue_response(state.engine.resolve(&id))
}

async fn ignore_issue(State(state): State<AppState>, Path(id): Path<String>) -> Json<IssueResponse> {
    issue_response(state.engine.ignore(&id))
}

async fn reopen_issue(State(state): State<AppState>, Path(id): Path<String>) -> Json<IssueResponse> {
    issue_response(state.engine.reopen(&id))
}

async fn clear_resolved(State(state): State<AppState>) -> Json<RemovedResponse> {
    Json(RemovedResponse {
        removed: state.engine.clear_resolved(),
    })
}

async fn clear_all(State(state): State<AppState>) -> Json<RemovedResponse> {
    Json(RemovedResponse {
        removed: state.engine.clear_all(),
    })
}

async fn reset(State(state): State<AppState>) -> StatusCode {
    state.engine.reset();
    StatusCode::NO_CONTENT
}

async fn toggle_detection(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Json<ToggleResponse> {
    Json(ToggleResponse {
        enabled: state.engine.toggle_detection(request.enabled),
    })
}

async fn update_config(
    State(state): State<AppState>,
    Json(patch): Json<DetectionConfigPatch>,
) -> impl IntoResponse {
    Json(state.engine.update_config(patch))
}

async fn export_data(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state.engine.export_data()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

async fn import_data(State(state): State<AppState>, body: String) -> Result<Response, ApiError> {
    let summary = state.engine.import_data(&body)?;
    Ok(Json(summary).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{EngineSettings, HealthSnapshot};
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    fn state(feature_enabled: bool, api_key: Option<&str>) -> AppState {
        let engine = HealthEngine::new(EngineSettings {
            feature_enabled,
            known_locales: vec!["en".to_string()],
            ..EngineSettings::default()
        });
        AppState::new(
            Arc::new(engine),
            Arc::new(LocaleRegistry::default()),
            api_key.map(str::to_string),
        )
    }

    fn post_json(uri: &str, body: serde_json::Value) -> HttpRequest<Body> {
        HttpRequest::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> HttpRequest<Body> {
        HttpRequest::get(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn missing_event() -> serde_json::Value {
        json!({
            "type": "missing-translation",
            "namespace": "common",
            "key": "save",
            "locale": "en",
            "route": "/dashboard"
        })
    }

    // ==================== Read Tests ====================

    #[tokio::test]
    async fn test_liveness() {
        let app = build_router(state(true, None));
        let response = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["engine_enabled"], true);
    }

    #[tokio::test]
    async fn test_locales_listed() {
        let app = build_router(state(true, None));
        let response = app.oneshot(get("/api/locales")).await.unwrap();

        let body = body_json(response).await;
        assert_eq!(body[0]["code"], "en");
        assert_eq!(body[4]["direction"], "rtl");
    }

    #[tokio::test]
    async fn test_unknown_issue_is_404() {
        let app = build_router(state(true, None));
        let response = app.oneshot(get("/api/issues/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // ==================== Event Flow Tests ====================

    #[tokio::test]
    async fn test_event_then_health() {
        let app = build_router(state(true, None));

        let response = app
            .clone()
            .oneshot(post_json("/api/events", missing_event()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["recorded"], true);
        assert_eq!(body["issue"]["fullKey"], "common.save");

        let response = app.clone().oneshot(get("/api/health-score")).await.unwrap();
        let snapshot: HealthSnapshot =
            serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(snapshot.overall_score, 90);

        let response = app
            .oneshot(get("/api/issues?kind=missing-translation&status=open"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_is_not_an_error() {
        let app = build_router(state(true, None));
        let response = app
            .oneshot(post_json("/api/issues/unknown/resolve", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["found"], false);
    }

    #[tokio::test]
    async fn test_toggle_and_patch_config() {
        let app = build_router(state(true, None));

        let response = app
            .clone()
            .oneshot(post_json("/api/detection/toggle", json!({})))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["enabled"], false);

        let request = HttpRequest::patch("/api/detection/config")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({"detectRTLIssues": false}).to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["detectRTLIssues"], false);
        assert_eq!(body["enabled"], false);
    }

    // ==================== Import Tests ====================

    #[tokio::test]
    async fn test_malformed_import_is_400() {
        let app = build_router(state(true, None));
        let request = HttpRequest::post("/api/import")
            .body(Body::from("{\"issues\": 5}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Import rejected"));
    }

    #[tokio::test]
    async fn test_export_import_over_http() {
        let app = build_router(state(true, None));
        app.clone()
            .oneshot(post_json("/api/events", missing_event()))
            .await
            .unwrap();

        let response = app.clone().oneshot(get("/api/export")).await.unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let other = build_router(state(true, None));
        let request = HttpRequest::post("/api/import").body(Body::from(bytes)).unwrap();
        let response = other.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["issuesImported"], 1);
    }

    // ==================== Auth Tests ====================

    #[tokio::test]
    async fn test_mutation_requires_key_when_configured() {
        let app = build_router(state(true, Some("secret123")));
        let response = app
            .oneshot(post_json("/api/maintenance/clear-all", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_mutation_with_valid_key() {
        let app = build_router(state(true, Some("secret123")));
        let request = HttpRequest::post("/api/maintenance/clear-all")
            .header(header::AUTHORIZATION, "Bearer secret123")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["removed"], 0);
    }

    #[tokio::test]
    async fn test_reads_do_not_require_key() {
        let app = build_router(state(true, Some("secret123")));
        let response = app.oneshot(get("/api/config")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_api_key_matches() {
        assert!(api_key_matches("secret123", "secret123"));
        assert!(!api_key_matches("secret123", "secret124"));
        assert!(!api_key_matches("secret12", "secret123"));
        assert!(!api_key_matches("", "secret"));
    }

    // ==================== Feature Gate Tests ====================

    #[tokio::test]
    async fn test_gated_engine_reports_disabled_state() {
        let app = build_router(state(false, None));

        let response = app
            .clone()
            .oneshot(post_json("/api/events", missing_event()))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["recorded"], false);

        let response = app.clone().oneshot(get("/api/health-score")).await.unwrap();
        assert_eq!(body_json(response).await["disabled"], true);

        let response = app.oneshot(get("/api/config")).await.unwrap();
        assert_eq!(body_json(response).await["enabled"], false);
    }

    #[tokio::test]
    async fn test_gated_engine_import_unavailable() {
        let app = build_router(state(false, None));
        let request = HttpRequest::post("/api/import")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
