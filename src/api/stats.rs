//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Loan counters
#[derive(Serialize, ToSchema)]
pub struct BorrowStats {
    pub active: i64,
    pub overdue: i64,
}

/// Fine counters
#[derive(Serialize, ToSchema)]
pub struct FineStats {
    pub unpaid: i64,
    /// Total outstanding amount, VND
    pub unpaid_amount: i64,
}

/// Reservation queue counters
#[derive(Serialize, ToSchema)]
pub struct ReservationStats {
    pub pending: i64,
    pub notified: i64,
}

/// Summary statistics response
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub books: i64,
    pub readers: i64,
    pub borrows: BorrowStats,
    pub fines: FineStats,
    pub reservations: ReservationStats,
}

/// Current counters across the circulation workflow
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Summary statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    claims.require_staff()?;

    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
