//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, reservations, reviews, tools};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ToolShare API",
        version = "1.0.0",
        description = "Peer-to-peer tool lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Tools
        tools::list_tools,
        tools::get_categories,
        tools::get_tool,
        tools::create_tool,
        tools::update_tool,
        tools::delete_tool,
        tools::get_blocked_dates,
        tools::check_availability,
        // Reservations
        reservations::create_reservation,
        reservations::get_reservation,
        reservations::get_user_reservations,
        reservations::update_status,
        reservations::complete_reservation,
        // Reviews
        reviews::get_review,
        reviews::can_review,
        reviews::create_review,
    ),
    components(
        schemas(
            // Tools
            crate::models::tool::ToolDetails,
            crate::models::tool::ToolCondition,
            crate::models::tool::CreateTool,
            crate::models::tool::UpdateTool,
            tools::AvailabilityResponse,
            // Reservations
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::ReservationStatus,
            reservations::CreateReservationRequest,
            reservations::UpdateStatusRequest,
            reservations::CompleteResponse,
            // Reviews
            crate::models::review::Review,
            crate::models::review::CreateReview,
            reviews::CanReviewResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "tools", description = "Tool listing management"),
        (name = "reservations", description = "Reservation lifecycle"),
        (name = "reviews", description = "Post-loan reviews")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
