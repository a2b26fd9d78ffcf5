//! Reservation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        borrow::Borrow,
        reservation::{
            CreateReservation, Reservation, ReservationCheck, ReservationCheckQuery,
            ReservationDetails, ReservationQuery,
        },
    },
};

use super::AuthenticatedUser;

/// Paginated reservation listing
#[derive(Serialize, ToSchema)]
pub struct ReservationPage {
    pub items: Vec<ReservationDetails>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Pickup confirmation: the reservation closes and a loan opens
#[derive(Serialize, ToSchema)]
pub struct ReceivedResponse {
    pub reservation: Reservation,
    pub borrow: Borrow,
}

/// Expired-reservation sweep result
#[derive(Serialize, ToSchema)]
pub struct AutoCancelResponse {
    pub cancelled: u64,
    /// Reservations promoted onto the copies the sweep released
    pub promoted: u64,
}

/// List reservations
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(ReservationQuery),
    responses(
        (status = 200, description = "Paginated reservation list", body = ReservationPage)
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<ReservationPage>> {
    claims.require_staff()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
    let (items, total) = state.services.reservations.list(&query).await?;

    Ok(Json(ReservationPage {
        items,
        total,
        page,
        per_page,
    }))
}

/// The live queue for a title, oldest claim first
#[utoipa::path(
    get,
    path = "/books/{id}/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Reservation queue", body = Vec<ReservationDetails>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_queue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Vec<ReservationDetails>>> {
    claims.require_staff()?;

    let queue = state.services.reservations.queue(book_id).await?;
    Ok(Json(queue))
}

/// Get reservations for a reader
#[utoipa::path(
    get,
    path = "/readers/{id}/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reader ID")),
    responses(
        (status = 200, description = "Reader's reservations", body = Vec<ReservationDetails>)
    )
)]
pub async fn get_reader_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(reader_id): Path<i32>,
) -> AppResult<Json<Vec<ReservationDetails>>> {
    claims.require_read_reservations_for(reader_id)?;

    let query = ReservationQuery {
        status: None,
        reader_id: Some(reader_id),
        book_id: None,
        page: None,
        per_page: Some(100),
    };
    let (items, _) = state.services.reservations.list(&query).await?;
    Ok(Json(items))
}

/// Would a reservation be accepted?
#[utoipa::path(
    get,
    path = "/reservations/check",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(ReservationCheckQuery),
    responses(
        (status = 200, description = "Eligibility verdict with reasons", body = ReservationCheck)
    )
)]
pub async fn check_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ReservationCheckQuery>,
) -> AppResult<Json<ReservationCheck>> {
    claims.require_reserve_for(query.reader_id)?;

    let check = state
        .services
        .reservations
        .check(query.reader_id, query.book_id)
        .await?;
    Ok(Json(check))
}

/// Queue a claim on an unavailable title
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation queued", body = Reservation),
        (status = 422, description = "Reservation not allowed")
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    claims.require_reserve_for(request.reader_id)?;

    let reservation = state.services.reservations.create(request).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Notify a pending reservation that its book is ready
#[utoipa::path(
    post,
    path = "/reservations/{id}/notify",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reader notified, copy held", body = Reservation),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Wrong status or no copy to hold")
    )
)]
pub async fn notify_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Reservation>> {
    claims.require_write_reservations()?;

    let reservation = state.services.reservations.notify(id).await?;
    Ok(Json(reservation))
}

/// Confirm pickup of a notified reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/received",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Pickup confirmed, loan issued", body = ReceivedResponse),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Reservation is not in the notified state")
    )
)]
pub async fn confirm_received(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReceivedResponse>> {
    claims.require_write_reservations()?;

    let (reservation, borrow) = state.services.reservations.confirm_received(id).await?;
    Ok(Json(ReceivedResponse { reservation, borrow }))
}

/// Cancel a live reservation
#[utoipa::path(
    post,
    path = "/reservations/{id}/cancel",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = Reservation),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Reservation already terminal")
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.services.reservations.get(id).await?;
    claims.require_reserve_for(reservation.reader_id)?;

    let reservation = state.services.reservations.cancel(id).await?;
    Ok(Json(reservation))
}

/// Cancel every notified reservation past its pickup deadline
#[utoipa::path(
    post,
    path = "/reservations/auto-cancel",
    tag = "reservations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweep finished", body = AutoCancelResponse)
    )
)]
pub async fn auto_cancel(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<AutoCancelResponse>> {
    claims.require_write_reservations()?;

    let (cancelled, promoted) = state.services.reservations.auto_cancel().await?;
    Ok(Json(AutoCancelResponse { cancelled, promoted }))
}

/// Offer a freed copy to the oldest pending reservation
#[utoipa::path(
    post,
    path = "/books/{id}/process-availability",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Promoted reservation, or null when the queue is empty")
    )
)]
pub async fn process_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Option<Reservation>>> {
    claims.require_write_reservations()?;

    let promoted = state.services.reservations.process_availability(book_id).await?;
    Ok(Json(promoted))
}
