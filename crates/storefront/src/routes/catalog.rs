//! Catalog and gallery route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use galeria_core::{CatalogEntry, CatalogQuery, Category, SortKey};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Raw `/api/catalog` query string.
///
/// Parsed by hand so unknown values answer with a readable 400 instead of the
/// query extractor's rejection text.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub category: Option<String>,
    pub q: Option<String>,
    pub tag: Option<String>,
    pub sort: Option<String>,
}

impl TryFrom<CatalogParams> for CatalogQuery {
    type Error = AppError;

    fn try_from(params: CatalogParams) -> Result<Self> {
        let category = match params.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(c) if c.eq_ignore_ascii_case("all") => None,
            Some(c) => Some(
                c.parse::<Category>()
                    .map_err(|e| AppError::BadRequest(e.to_string()))?,
            ),
        };

        let sort = match params.sort.as_deref().map(str::trim) {
            None | Some("") => SortKey::default(),
            Some(s) => s
                .parse::<SortKey>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?,
        };

        Ok(Self {
            category,
            search: params.q,
            tag: params.tag.filter(|t| !t.trim().is_empty()),
            sort,
        })
    }
}

/// Browse the catalog.
///
/// GET /api/catalog?category=&q=&tag=&sort=
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<Vec<CatalogEntry>>> {
    let query = CatalogQuery::try_from(params)?;
    Ok(Json(state.catalog().query(&query)))
}

/// A single catalog entry.
///
/// GET /api/catalog/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CatalogEntry>> {
    state
        .catalog()
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("catalog entry {id}")))
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryParams {
    pub technique: Option<String>,
}

/// Gallery artworks.
///
/// GET /api/gallery?technique=
#[instrument(skip(state))]
pub async fn gallery(
    State(state): State<AppState>,
    Query(params): Query<GalleryParams>,
) -> Json<Vec<CatalogEntry>> {
    Json(state.catalog().gallery(params.technique.as_deref()))
}
