// Event Planner - Web Server
// REST API over the menu record store with Axum

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use event_planner::audit::{suspicious_alerts, AuditAlert, AuditLogEntry};
use event_planner::logging::init_logging;
use event_planner::reference::{
    decorations, image_for_event, staff, DecorationPackage, DecorationProvider, StaffRole,
};
use event_planner::{
    open_store, MenuError, MenuItem, MenuRecordStore, PlannerConfig, PriceHistoryEntry,
    SqliteStore,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<MenuRecordStore<SqliteStore>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response()
    }
}

fn api_error(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
        .into_response()
}

/// Map store failures: bad prices are the caller's fault, the rest is ours
fn store_error(context: &str, e: anyhow::Error) -> Response {
    match e.downcast_ref::<MenuError>() {
        Some(err) if err.is_invalid_price() => api_error(StatusCode::BAD_REQUEST, err.to_string()),
        _ => {
            error!(error = %e, "{}", context);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{}: {}", context, e))
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceUpdateRequest {
    price: f64,
    changed_by: String,
}

#[derive(Serialize)]
struct PriceUpdateResponse {
    item: MenuItem,
    history_entries: usize,
}

#[derive(Serialize)]
struct DecorationsResponse {
    providers: &'static [DecorationProvider],
    packages: &'static [DecorationPackage],
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    ApiResponse::ok("OK")
}

/// GET /api/menu - Current catalog
async fn get_menu(State(state): State<AppState>) -> Response {
    match state.store.get_menu_items() {
        Ok(items) => ApiResponse::ok(items),
        Err(e) => store_error("Error reading menu", e),
    }
}

/// GET /api/menu/:id - One item
async fn get_menu_item(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get_item(&id) {
        Ok(Some(item)) => ApiResponse::ok(item),
        Ok(None) => api_error(StatusCode::NOT_FOUND, format!("No menu item '{}'", id)),
        Err(e) => store_error("Error reading menu item", e),
    }
}

/// GET /api/menu/search/:name - First item whose name contains :name
///
/// `Path` has already percent-decoded the segment.
async fn search_menu(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.store.get_item_by_name(&name) {
        Ok(Some(item)) => ApiResponse::ok(item),
        Ok(None) => api_error(
            StatusCode::NOT_FOUND,
            format!("No menu item matches '{}'", name),
        ),
        Err(e) => store_error("Error searching menu", e),
    }
}

/// PUT /api/menu/:id/price - Change a price, body {"price": 55, "changedBy": "chef1"}
async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PriceUpdateRequest>,
) -> Response {
    match state.store.update_price(&id, req.price, &req.changed_by) {
        Ok(true) => {
            let item = state.store.get_item(&id);
            let history = state.store.history_for_item(&id);
            match (item, history) {
                (Ok(Some(item)), Ok(history)) => ApiResponse::ok(PriceUpdateResponse {
                    item,
                    history_entries: history.len(),
                }),
                (Err(e), _) | (_, Err(e)) => store_error("Error reading updated item", e),
                (Ok(None), _) => api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Item '{}' vanished after update", id),
                ),
            }
        }
        Ok(false) => api_error(StatusCode::NOT_FOUND, format!("No menu item '{}'", id)),
        Err(e) => store_error("Error updating price", e),
    }
}

/// GET /api/menu/history - All price changes, oldest first
async fn get_history(State(state): State<AppState>) -> Response {
    match state.store.get_price_history() {
        Ok(history) => ApiResponse::ok(history),
        Err(e) => store_error("Error reading price history", e),
    }
}

/// GET /api/menu/:id/history - Price changes for one item
async fn get_item_history(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.history_for_item(&id) {
        Ok(history) => ApiResponse::<Vec<PriceHistoryEntry>>::ok(history),
        Err(e) => store_error("Error reading item history", e),
    }
}

/// GET /api/staff - Staff roles
async fn get_staff() -> Response {
    ApiResponse::<&'static [StaffRole]>::ok(staff::ROLES)
}

/// GET /api/decorations - Providers and packages
async fn get_decorations() -> Response {
    ApiResponse::ok(DecorationsResponse {
        providers: decorations::PROVIDERS,
        packages: decorations::PACKAGES,
    })
}

/// GET /api/events/:event_type/image - Image for an event type (generic fallback)
async fn get_event_image(Path(event_type): Path<String>) -> Response {
    ApiResponse::ok(serde_json::json!({
        "eventType": event_type,
        "image": image_for_event(&event_type),
    }))
}

/// GET /api/alerts - Suspicious price activity
async fn get_alerts(State(state): State<AppState>) -> Response {
    match state.store.get_price_history() {
        Ok(history) => {
            let entries: Vec<AuditLogEntry> =
                history.iter().map(AuditLogEntry::from_price_change).collect();
            ApiResponse::<Vec<AuditAlert>>::ok(suspicious_alerts(&entries))
        }
        Err(e) => store_error("Error reading price history", e),
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/menu", get(get_menu))
        .route("/menu/history", get(get_history))
        .route("/menu/search/:name", get(search_menu))
        .route("/menu/:id", get(get_menu_item))
        .route("/menu/:id/price", put(update_price))
        .route("/menu/:id/history", get(get_item_history))
        .route("/staff", get(get_staff))
        .route("/decorations", get(get_decorations))
        .route("/events/:event_type/image", get(get_event_image))
        .route("/alerts", get(get_alerts))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("info,tower_http=info");

    let config = PlannerConfig::from_env()?;
    let store = open_store(&config)?;
    info!(db = %config.db_path.display(), "Database opened");

    let state = AppState {
        store: Arc::new(store),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Server running, API under /api");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use event_planner::MemoryStore;
    use tower::ServiceExt;

    // Route tests run against an in-memory SQLite store
    fn test_router() -> Router {
        let store = MenuRecordStore::new(SqliteStore::open_in_memory().unwrap());
        router(AppState {
            store: Arc::new(store),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_get_menu() {
        let response = test_router()
            .oneshot(Request::get("/api/menu").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][0]["id"], "pollo-parrilla");
    }

    #[tokio::test]
    async fn test_update_price_flow() {
        let app = test_router();

        let request = Request::put("/api/menu/pollo-parrilla/price")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"price":55,"changedBy":"chef1"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["item"]["price"], 55.0);
        assert_eq!(json["data"]["history_entries"], 1);

        let request = Request::put("/api/menu/does-not-exist/price")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"price":10,"changedBy":"chef1"}"#))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(Request::get("/api/menu/history").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"][0]["oldPrice"], 50.0);
    }

    #[tokio::test]
    async fn test_negative_price_is_bad_request() {
        let request = Request::put("/api/menu/tequenos/price")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"price":-3,"changedBy":"chef1"}"#))
            .unwrap();
        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_decodes_name() {
        let response = test_router()
            .oneshot(
                Request::get("/api/menu/search/lomo%20salt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["id"], "lomo-saltado");
    }

    #[tokio::test]
    async fn test_search_decodes_name_only_once() {
        // %2541 is "%41" once decoded, not "A"
        let response = test_router()
            .oneshot(
                Request::get("/api/menu/search/%2541")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "No menu item matches '%41'");
    }

    #[tokio::test]
    async fn test_event_image_fallback() {
        let response = test_router()
            .oneshot(
                Request::get("/api/events/graduacion/image")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["data"]["image"], "/images/events/generic.jpg");
    }

    #[test]
    fn test_memory_store_satisfies_state_bounds() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MenuRecordStore<MemoryStore>>();
        assert_send_sync::<MenuRecordStore<SqliteStore>>();
    }
}
