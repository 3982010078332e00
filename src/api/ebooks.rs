//! Catalog endpoints

use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use rand::{rngs::StdRng, SeedableRng};
use uuid::Uuid;

use crate::{error::AppResult, models::EBook, services::catalog::RECOMMENDATION_COUNT, AppState};

/// List all titles
#[utoipa::path(
    get,
    path = "/api/ebooks",
    tag = "ebooks",
    responses(
        (status = 200, description = "Catalog", body = Vec<EBook>)
    )
)]
pub async fn list_ebooks(State(state): State<AppState>) -> AppResult<Json<Vec<EBook>>> {
    let ebooks = state.services.catalog.list_ebooks().await?;
    Ok(Json(ebooks))
}

/// A random selection of titles
#[utoipa::path(
    get,
    path = "/api/ebooks/recommended",
    tag = "ebooks",
    responses(
        (status = 200, description = "Recommended titles", body = Vec<EBook>)
    )
)]
pub async fn recommended_ebooks(State(state): State<AppState>) -> AppResult<Json<Vec<EBook>>> {
    let mut rng = StdRng::from_entropy();
    let ebooks = state
        .services
        .catalog
        .recommend(&mut rng, RECOMMENDATION_COUNT)
        .await?;
    Ok(Json(ebooks))
}

/// Get a title by ID
#[utoipa::path(
    get,
    path = "/api/ebooks/{id}",
    tag = "ebooks",
    params(
        ("id" = Uuid, Path, description = "E-book ID")
    ),
    responses(
        (status = 200, description = "E-book details", body = EBook),
        (status = 404, description = "E-book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_ebook(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<EBook>> {
    let Path(id) = id?;

    let ebook = state.services.catalog.get_ebook(id).await?;
    Ok(Json(ebook))
}
