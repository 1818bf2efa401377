//! Liveness endpoint.

use axum::extract::State;
use axum::Json;

use crate::context::AppContext;

/// GET /health
///
/// Reports `ok` when a database connection can be checked out.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service status", body = serde_json::Value))
)]
pub async fn health_check(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    let database = match hr_db::get_conn(&ctx.db) {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {e}");
            "unavailable"
        }
    };

    Json(serde_json::json!({
        "status": if database == "ok" { "ok" } else { "degraded" },
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
