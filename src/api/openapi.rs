//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, fines, health, readers, reservations, settings, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Folium API",
        version = "0.2.0",
        description = "Library Circulation Server REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Folium Team", email = "contact@folium.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Readers
        readers::list_readers,
        readers::get_reader,
        readers::create_reader,
        readers::update_reader,
        readers::delete_reader,
        // Borrows
        borrows::get_borrow,
        borrows::get_reader_borrows,
        borrows::create_borrow,
        borrows::return_borrow,
        borrows::renew_borrow,
        // Fines
        fines::get_reader_fines,
        fines::create_fine,
        fines::pay_fine,
        fines::assess_fine,
        // Reservations
        reservations::list_reservations,
        reservations::get_reader_reservations,
        reservations::book_queue,
        reservations::check_reservation,
        reservations::create_reservation,
        reservations::notify_reservation,
        reservations::confirm_received,
        reservations::cancel_reservation,
        reservations::auto_cancel,
        reservations::process_availability,
        // Settings
        settings::get_settings,
        settings::update_settings,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::AccountInfo,
            // Books
            crate::models::book::Book,
            crate::models::book::BookQuery,
            crate::models::book::BookPage,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Readers
            crate::models::reader::Reader,
            crate::models::reader::ReaderQuery,
            crate::models::reader::CreateReader,
            crate::models::reader::UpdateReader,
            crate::models::reader::Role,
            crate::models::reader::ReaderStatus,
            readers::ReaderPage,
            // Borrows
            crate::models::borrow::Borrow,
            crate::models::borrow::BorrowDetails,
            crate::models::borrow::CreateBorrow,
            crate::models::borrow::RenewalRecord,
            borrows::ReturnRequest,
            borrows::PaymentRequest,
            borrows::ReturnResponse,
            borrows::RenewRequest,
            // Circulation core
            crate::circulation::fine::FineAssessment,
            crate::circulation::return_flow::PaymentDetails,
            crate::circulation::return_flow::ReturnSlip,
            // Fines
            crate::models::fine::Fine,
            crate::models::fine::CreateFine,
            crate::models::fine::PayFine,
            crate::models::fine::AssessFineRequest,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::CreateReservation,
            crate::models::reservation::ReservationQuery,
            crate::models::reservation::ReservationCheckQuery,
            crate::models::reservation::ReservationCheck,
            reservations::ReservationPage,
            reservations::ReceivedResponse,
            reservations::AutoCancelResponse,
            // Enums
            crate::models::enums::BookCondition,
            crate::models::enums::BorrowStatus,
            crate::models::enums::FineReason,
            crate::models::enums::FineStatus,
            crate::models::enums::PaymentMethod,
            crate::models::enums::ReservationStatus,
            // Settings
            crate::models::policy::CirculationPolicy,
            crate::models::policy::UpdatePolicy,
            // Stats
            stats::BorrowStats,
            stats::FineStats,
            stats::ReservationStats,
            stats::StatsResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "readers", description = "Reader account management"),
        (name = "borrows", description = "Borrow, return and renew"),
        (name = "fines", description = "Fine assessment and payment"),
        (name = "reservations", description = "Reservation queue"),
        (name = "settings", description = "Circulation policy"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
