//! Reader account endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::reader::{CreateReader, Reader, ReaderQuery, UpdateReader},
};

use super::AuthenticatedUser;

/// Paginated reader listing
#[derive(Serialize, ToSchema)]
pub struct ReaderPage {
    pub items: Vec<Reader>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// List readers
#[utoipa::path(
    get,
    path = "/readers",
    tag = "readers",
    security(("bearer_auth" = [])),
    params(ReaderQuery),
    responses(
        (status = 200, description = "Paginated reader list", body = ReaderPage)
    )
)]
pub async fn list_readers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ReaderQuery>,
) -> AppResult<Json<ReaderPage>> {
    claims.require_read_readers()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
    let (items, total) = state.services.readers.list(&query).await?;

    Ok(Json(ReaderPage {
        items,
        total,
        page,
        per_page,
    }))
}

/// Get a reader; readers may fetch their own account
#[utoipa::path(
    get,
    path = "/readers/{id}",
    tag = "readers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reader ID")),
    responses(
        (status = 200, description = "Reader", body = Reader),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn get_reader(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Reader>> {
    if claims.reader_id != id {
        claims.require_read_readers()?;
    }

    let reader = state.services.readers.get(id).await?;
    Ok(Json(reader))
}

/// Register a reader account
#[utoipa::path(
    post,
    path = "/readers",
    tag = "readers",
    security(("bearer_auth" = [])),
    request_body = CreateReader,
    responses(
        (status = 201, description = "Reader created", body = Reader),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Login already taken")
    )
)]
pub async fn create_reader(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateReader>,
) -> AppResult<(StatusCode, Json<Reader>)> {
    claims.require_write_readers()?;

    // Only admins may hand out staff roles
    if request.role.map(|r| r.is_staff()).unwrap_or(false) {
        claims.require_admin()?;
    }

    let reader = state.services.readers.create(request).await?;
    Ok((StatusCode::CREATED, Json(reader)))
}

/// Update a reader account
#[utoipa::path(
    put,
    path = "/readers/{id}",
    tag = "readers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reader ID")),
    request_body = UpdateReader,
    responses(
        (status = 200, description = "Reader updated", body = Reader),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn update_reader(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateReader>,
) -> AppResult<Json<Reader>> {
    claims.require_write_readers()?;

    if request.role.map(|r| r.is_staff()).unwrap_or(false) {
        claims.require_admin()?;
    }

    let reader = state.services.readers.update(id, request).await?;
    Ok(Json(reader))
}

/// Delete a reader account
#[utoipa::path(
    delete,
    path = "/readers/{id}",
    tag = "readers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reader ID")),
    responses(
        (status = 204, description = "Reader deleted"),
        (status = 404, description = "Reader not found"),
        (status = 422, description = "Reader still has books on loan")
    )
)]
pub async fn delete_reader(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_write_readers()?;

    state.services.readers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
