//! Circulation endpoints: borrow, return, renew

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    circulation::{PaymentDetails, ReturnSlip},
    error::AppResult,
    models::{
        borrow::{Borrow, BorrowDetails, CreateBorrow, RenewalRecord},
        enums::{BookCondition, PaymentMethod},
        fine::Fine,
    },
};

use super::AuthenticatedUser;

/// Return form submission
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    /// Defaults to now
    pub returned_date: Option<DateTime<Utc>>,
    pub condition: Option<BookCondition>,
    pub notes: Option<String>,
    /// Settles the assessed fine on the spot; omit to leave it unpaid
    pub payment: Option<PaymentRequest>,
}

/// Payment captured with the return
#[derive(Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub payment_method: PaymentMethod,
    pub transaction_code: Option<String>,
}

impl From<PaymentRequest> for PaymentDetails {
    fn from(request: PaymentRequest) -> Self {
        PaymentDetails {
            method: request.payment_method,
            transaction_code: request.transaction_code,
        }
    }
}

/// Return response with the slip and any fine recorded
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub status: String,
    pub slip: ReturnSlip,
    pub fine: Option<Fine>,
}

/// Renewal request
#[derive(Deserialize, ToSchema)]
pub struct RenewRequest {
    pub new_due_date: DateTime<Utc>,
}

/// Get a borrow record
#[utoipa::path(
    get,
    path = "/borrows/{id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow ID")),
    responses(
        (status = 200, description = "Borrow record", body = Borrow),
        (status = 404, description = "Borrow not found")
    )
)]
pub async fn get_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Borrow>> {
    let borrow = state.services.circulation.get_borrow(id).await?;
    claims.require_read_circulation_for(borrow.reader_id)?;

    Ok(Json(borrow))
}

/// Get active borrows for a reader
#[utoipa::path(
    get,
    path = "/readers/{id}/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reader ID")),
    responses(
        (status = 200, description = "Reader's active borrows", body = Vec<BorrowDetails>),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn get_reader_borrows(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(reader_id): Path<i32>,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    claims.require_read_circulation_for(reader_id)?;

    let borrows = state.services.circulation.get_reader_borrows(reader_id).await?;
    Ok(Json(borrows))
}

/// Issue a loan
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Loan issued", body = Borrow),
        (status = 404, description = "Reader or book not found"),
        (status = 422, description = "No copy available, borrow limit reached, or reader blocked")
    )
)]
pub async fn create_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBorrow>,
) -> AppResult<(StatusCode, Json<Borrow>)> {
    claims.require_write_circulation()?;

    let borrow = state.services.circulation.borrow(request).await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Return a borrowed book
///
/// Runs the return workflow: the book's condition and the lateness against
/// policy decide the fine; a payment in the request settles it, otherwise it
/// stays on the reader's account.
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow ID")),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 400, description = "Missing condition"),
        (status = 404, description = "Borrow not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<ReturnResponse>> {
    claims.require_write_circulation()?;

    let (slip, fine) = state
        .services
        .circulation
        .return_borrow(
            id,
            request.returned_date,
            request.condition,
            request.notes,
            request.payment.map(PaymentDetails::from),
        )
        .await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        slip,
        fine,
    }))
}

/// Renew a loan to a new due date
#[utoipa::path(
    post,
    path = "/borrows/{id}/renew",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow ID")),
    request_body = RenewRequest,
    responses(
        (status = 200, description = "Loan renewed", body = RenewalRecord),
        (status = 404, description = "Borrow not found"),
        (status = 409, description = "Already returned or renewed concurrently"),
        (status = 422, description = "Renewal limits exceeded")
    )
)]
pub async fn renew_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<RenewRequest>,
) -> AppResult<Json<RenewalRecord>> {
    claims.require_write_circulation()?;

    let record = state
        .services
        .circulation
        .renew(id, request.new_due_date)
        .await?;

    Ok(Json(record))
}
