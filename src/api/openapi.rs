//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{ebooks, health, loans, payments};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "E-Book Lending API",
        version = "1.0.0",
        description = "E-book rental storefront REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Loans
        loans::rent_ebook,
        loans::terminate_loan,
        loans::list_loans,
        // Payments
        payments::submit_payment,
        payments::list_payments,
        // Catalog
        ebooks::list_ebooks,
        ebooks::recommended_ebooks,
        ebooks::get_ebook,
    ),
    components(
        schemas(
            crate::models::EBook,
            crate::models::Loan,
            crate::models::LoanStatus,
            crate::models::Payment,
            crate::models::User,
            loans::RentQuery,
            loans::UserQuery,
            payments::SubmitPaymentRequest,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "loans", description = "Loan lifecycle"),
        (name = "payments", description = "Payments verified by the external gateway"),
        (name = "ebooks", description = "Catalog browsing")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
