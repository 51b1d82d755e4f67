// Ticket Allocation Planner - HTTP API
// JSON endpoints over the calculator plus the single-page slider UI

use crate::allocation::{derive, Allocation};
use crate::breakdown::Report;
use crate::catalog::Catalog;
use crate::error::AllocationError;
use crate::params::{Parameter, Parameters, SliderRange};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Shared application state; the catalog never changes after startup
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Serialize)]
struct RangeResponse {
    parameter: Parameter,
    label: &'static str,
    #[serde(flatten)]
    range: SliderRange,
}

/// Allocation response: the clamped inputs actually used, and the result
#[derive(Serialize)]
struct AllocationResponse {
    params: Parameters,
    display_prices: DisplayPrices,
    allocation: Allocation,
}

#[derive(Serialize)]
struct DisplayPrices {
    altitude: f64,
    royale: f64,
    soiree: f64,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/catalog - Fixed expense and income catalogs
async fn get_catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.catalog.as_ref().clone()))
}

/// GET /api/ranges - Slider bounds for each parameter
async fn get_ranges(State(state): State<AppState>) -> impl IntoResponse {
    let ranges: Vec<RangeResponse> = Parameter::ALL
        .iter()
        .map(|parameter| RangeResponse {
            parameter: *parameter,
            label: parameter.label(),
            range: parameter.range(state.catalog.class_size),
        })
        .collect();

    Json(ApiResponse::ok(ranges))
}

/// GET /api/allocation - Derive prices from query parameters
async fn get_allocation(
    State(state): State<AppState>,
    query: Result<Query<Parameters>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(params)) => allocation_response(&state.catalog, params),
        Err(rejection) => bad_query(rejection),
    }
}

/// POST /api/allocation - Derive prices from a JSON body
async fn post_allocation(
    State(state): State<AppState>,
    Json(params): Json<Parameters>,
) -> Response {
    allocation_response(&state.catalog, params)
}

/// GET /api/report - Full report snapshot
async fn get_report(
    State(state): State<AppState>,
    query: Result<Query<Parameters>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params.clamped(&state.catalog),
        Err(rejection) => return bad_query(rejection),
    };

    match derive(&state.catalog, &params) {
        Ok(allocation) => {
            let report = Report::build(&state.catalog, &params, &allocation);
            (StatusCode::OK, Json(ApiResponse::ok(report))).into_response()
        }
        Err(e) => derivation_failed(e),
    }
}

fn allocation_response(catalog: &Catalog, params: Parameters) -> Response {
    let params = params.clamped(catalog);
    debug!(?params, "deriving allocation");

    match derive(catalog, &params) {
        Ok(allocation) => {
            let prices = allocation.prices;
            let response = AllocationResponse {
                params,
                display_prices: DisplayPrices {
                    altitude: prices.altitude_price.ceil(),
                    royale: prices.royale_price.ceil(),
                    soiree: prices.soiree_price.ceil(),
                },
                allocation,
            };
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => derivation_failed(e),
    }
}

/// Malformed query strings get the same JSON envelope as every other error
fn bad_query(rejection: QueryRejection) -> Response {
    warn!("Rejected query: {}", rejection.body_text());
    (
        rejection.status(),
        Json(ApiResponse::<()>::err(rejection.body_text())),
    )
        .into_response()
}

fn derivation_failed(e: AllocationError) -> Response {
    warn!("Derivation failed: {}", e);
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::<()>::err(e.to_string())),
    )
        .into_response()
}

/// GET / - Serve the planner page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/catalog", get(get_catalog))
        .route("/ranges", get(get_ranges))
        .route("/allocation", get(get_allocation).post(post_allocation))
        .route("/report", get(get_report))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(Catalog::senior_week()))
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_allocation_defaults() {
        let response = app()
            .oneshot(Request::builder().uri("/api/allocation").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["display_prices"]["royale"], 55.0);
        assert_eq!(body["data"]["display_prices"]["soiree"], 60.0);
        assert_eq!(body["data"]["display_prices"]["altitude"], 23.0);
    }

    #[tokio::test]
    async fn test_allocation_query_is_clamped() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/allocation?royale_attendance=0&target_surplus=99999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["params"]["royale_attendance"], 500);
        assert_eq!(body["data"]["params"]["target_surplus"], 15000.0);
    }

    #[tokio::test]
    async fn test_malformed_query_returns_json_error() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/allocation?royale_attendance=-5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("Failed to deserialize query string"));
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_malformed_report_query_returns_json_error() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/report?target_surplus=lots")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_post_allocation() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/allocation")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"royale_attendance": 1500, "soiree_attendance": 1500}"#))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let surplus = body["data"]["allocation"]["prices"]["projected_surplus"].as_f64().unwrap();
        assert!((surplus - 5000.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_ranges_follow_class_size() {
        let response = app()
            .oneshot(Request::builder().uri("/api/ranges").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = json_body(response).await;
        let ranges = body["data"].as_array().unwrap();
        assert_eq!(ranges.len(), 5);
        assert_eq!(ranges[1]["parameter"], "royale_attendance");
        assert_eq!(ranges[1]["max"], 1965.0);
    }

    #[tokio::test]
    async fn test_report_endpoint() {
        let response = app()
            .oneshot(Request::builder().uri("/api/report").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["expense_rows"].as_array().unwrap().len(), 14);
    }

    #[tokio::test]
    async fn test_index_escapes_catalog_text() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains("function escapeHtml"));
        assert!(page.contains("escapeHtml(s.label)"));
        assert!(page.contains("escapeHtml(i[c])"));
        assert!(page.contains("escapeHtml(t.event)"));
        assert!(!page.contains("<td>${i[c]}</td>"));
    }

    #[test]
    fn test_zero_attendance_maps_to_422() {
        let response = derivation_failed(AllocationError::ZeroAttendance { event: "Royale" });
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
