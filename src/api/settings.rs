//! Circulation policy endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::policy::{CirculationPolicy, UpdatePolicy},
};

use super::AuthenticatedUser;

/// Get the current circulation policy
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current policy", body = CirculationPolicy)
    )
)]
pub async fn get_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<CirculationPolicy>> {
    claims.require_read_settings()?;

    let policy = state.services.policy.get().await?;
    Ok(Json(policy))
}

/// Update the circulation policy
#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = UpdatePolicy,
    responses(
        (status = 200, description = "Policy updated", body = CirculationPolicy),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn update_settings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdatePolicy>,
) -> AppResult<Json<CirculationPolicy>> {
    claims.require_write_settings()?;

    let policy = state.services.policy.update(request).await?;
    Ok(Json(policy))
}
