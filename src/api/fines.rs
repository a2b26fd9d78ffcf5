//! Fine endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    circulation::FineAssessment,
    error::AppResult,
    models::fine::{AssessFineRequest, CreateFine, Fine, PayFine},
};

use super::AuthenticatedUser;

/// Get fines for a reader
#[utoipa::path(
    get,
    path = "/readers/{id}/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reader ID")),
    responses(
        (status = 200, description = "Reader's fines, newest first", body = Vec<Fine>),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn get_reader_fines(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(reader_id): Path<i32>,
) -> AppResult<Json<Vec<Fine>>> {
    claims.require_read_fines_for(reader_id)?;

    let fines = state.services.fines.get_reader_fines(reader_id).await?;
    Ok(Json(fines))
}

/// Record a fine by hand, outside the return flow
#[utoipa::path(
    post,
    path = "/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    request_body = CreateFine,
    responses(
        (status = 201, description = "Fine recorded", body = Fine),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Reader or book not found")
    )
)]
pub async fn create_fine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateFine>,
) -> AppResult<(StatusCode, Json<Fine>)> {
    claims.require_write_fines()?;

    let fine = state.services.fines.create(request).await?;
    Ok((StatusCode::CREATED, Json(fine)))
}

/// Settle a fine
#[utoipa::path(
    put,
    path = "/fines/{id}/pay",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine ID")),
    request_body = PayFine,
    responses(
        (status = 200, description = "Fine paid", body = Fine),
        (status = 404, description = "Fine not found"),
        (status = 409, description = "Fine already paid")
    )
)]
pub async fn pay_fine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<PayFine>,
) -> AppResult<Json<Fine>> {
    claims.require_write_fines()?;

    let fine = state.services.fines.pay(id, request).await?;
    Ok(Json(fine))
}

/// Preview the fine a return would incur, without touching any record
#[utoipa::path(
    post,
    path = "/fines/assess",
    tag = "fines",
    security(("bearer_auth" = [])),
    request_body = AssessFineRequest,
    responses(
        (status = 200, description = "Fine assessment", body = FineAssessment)
    )
)]
pub async fn assess_fine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<AssessFineRequest>,
) -> AppResult<Json<FineAssessment>> {
    claims.require_staff()?;

    let assessment = state.services.fines.assess(request).await?;
    Ok(Json(assessment))
}
