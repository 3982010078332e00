//! Loan management endpoints

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{error::AppResult, models::Loan, AppState};

/// Query for renting a title
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RentQuery {
    /// Borrowing user
    pub user_id: Uuid,
    /// Title to borrow
    pub ebook_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// Rent an e-book
#[utoipa::path(
    post,
    path = "/api/loan/rent",
    tag = "loans",
    params(RentQuery),
    responses(
        (status = 200, description = "Loan created", body = Loan),
        (status = 400, description = "Missing or malformed parameters", body = crate::error::ErrorResponse),
        (status = 401, description = "User not logged in", body = crate::error::ErrorResponse),
        (status = 404, description = "User or e-book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "No copies available", body = crate::error::ErrorResponse),
        (status = 422, description = "Maximum loans reached", body = crate::error::ErrorResponse)
    )
)]
pub async fn rent_ebook(
    State(state): State<AppState>,
    query: Result<Query<RentQuery>, QueryRejection>,
) -> AppResult<Json<Loan>> {
    let Query(query) = query?;

    let loan = state
        .services
        .loans
        .create_loan(query.user_id, query.ebook_id)
        .await?;
    Ok(Json(loan))
}

/// End a loan and return its copy to stock
#[utoipa::path(
    patch,
    path = "/api/loan/{loan_id}",
    tag = "loans",
    params(
        ("loan_id" = Uuid, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan ended", body = Loan),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Loan already ended", body = crate::error::ErrorResponse)
    )
)]
pub async fn terminate_loan(
    State(state): State<AppState>,
    loan_id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Loan>> {
    let Path(loan_id) = loan_id?;

    let loan = state.services.loans.terminate_loan(loan_id).await?;
    Ok(Json(loan))
}

/// List every loan of a user, active and ended
#[utoipa::path(
    get,
    path = "/api/loan/list",
    tag = "loans",
    params(UserQuery),
    responses(
        (status = 200, description = "User's loans", body = Vec<Loan>),
        (status = 400, description = "Missing or malformed user id", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    query: Result<Query<UserQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Loan>>> {
    let Query(query) = query?;

    let loans = state.services.loans.list_loans_for_user(query.user_id).await?;
    Ok(Json(loans))
}
