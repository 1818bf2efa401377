//! Configuration route handlers.

use axum::extract::State;
use axum::Json;
use hr_core::config::RowsConfig;
use serde::Serialize;

use crate::context::AppContext;
use crate::error::AppError;

/// Current rows configuration plus any validation warnings.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RowsConfigResponse {
    #[schema(value_type = Object)]
    pub rows: RowsConfig,
    pub warnings: Vec<String>,
}

/// GET /config/rows
#[utoipa::path(
    get,
    path = "/config/rows",
    responses(
        (status = 200, description = "Active rows configuration", body = RowsConfigResponse)
    )
)]
pub async fn get_rows_config(State(ctx): State<AppContext>) -> Json<RowsConfigResponse> {
    let rows = ctx.config_store.snapshot();
    let warnings = rows.validate();
    Json(RowsConfigResponse { rows, warnings })
}

/// POST /config/reload
#[utoipa::path(
    post,
    path = "/config/reload",
    responses(
        (status = 200, description = "Configuration reloaded", body = serde_json::Value),
        (status = 400, description = "Config file is not valid JSON"),
        (status = 500, description = "Config file could not be read")
    )
)]
pub async fn reload_config(
    State(ctx): State<AppContext>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reloaded = ctx.config_store.reload()?;
    let status = if reloaded { "reloaded" } else { "no config file" };
    Ok(Json(serde_json::json!({ "status": status })))
}
