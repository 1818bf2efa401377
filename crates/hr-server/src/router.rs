//! Axum router construction.

use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(title = "homerows", description = "Home-page rows for a media library"),
    paths(
        routes::rows::list_rows,
        routes::rows::row_items,
        routes::config::get_rows_config,
        routes::config::reload_config,
        routes::health::health_check,
    ),
    components(schemas(
        crate::dto::ItemDto,
        crate::dto::UserDataDto,
        crate::dto::RowDto,
        crate::dto::RowItemsResponse,
        routes::config::RowsConfigResponse,
    ))
)]
pub struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/rows", get(routes::rows::list_rows))
        .route("/rowItems", get(routes::rows::row_items))
        .route("/config/rows", get(routes::config::get_rows_config))
        .route("/config/reload", post(routes::config::reload_config))
        .route("/health", get(routes::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
