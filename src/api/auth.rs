//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::reader::{Reader, Role},
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Login response with bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub account: AccountInfo,
}

/// Public view of the authenticated account
#[derive(Serialize, ToSchema)]
pub struct AccountInfo {
    pub id: i32,
    pub login: String,
    pub full_name: String,
    pub role: Role,
}

impl From<Reader> for AccountInfo {
    fn from(reader: Reader) -> Self {
        AccountInfo {
            id: reader.id,
            login: reader.login,
            full_name: reader.full_name,
            role: reader.role,
        }
    }
}

/// Log in with login and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, reader) = state
        .services
        .auth
        .login(&request.login, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        account: reader.into(),
    }))
}

/// The account behind the presented token
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = AccountInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<AccountInfo>> {
    let reader = state.services.auth.me(claims.reader_id).await?;
    Ok(Json(reader.into()))
}
