use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Serialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::forms::{FormPayload, PageQuery, parse_id};
use super::types::{ArtistResource, PageView, Paginated};
use super::{ApiError, AppState, flash};
use crate::domain::ArtistId;

const INDEX_PATH: &str = "/artist";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexProps {
    pub paginated_artists: Paginated<ArtistResource>,
}

#[derive(Serialize)]
pub struct FormProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<ArtistResource>,
}

fn artist_id(raw: &str) -> Result<ArtistId, ApiError> {
    parse_id(raw, "Artist").map(ArtistId::new)
}

/// GET /artist
pub async fn index(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageView<IndexProps>>, ApiError> {
    let page = state.artist_service().list(query.page()).await?;
    let props = IndexProps {
        paginated_artists: Paginated::new(page.map(|a| ArtistResource::from(&a)), INDEX_PATH),
    };

    Ok(Json(
        PageView::new("artist/Index", INDEX_PATH, props).with_flash(flash::take(&session).await),
    ))
}

/// GET /artists/create
pub async fn create() -> Json<PageView<FormProps>> {
    Json(PageView::new(
        "artist/Form",
        "/artists/create",
        FormProps { artist: None },
    ))
}

/// POST /artists
pub async fn store(
    State(state): State<Arc<AppState>>,
    session: Session,
    FormPayload(input): FormPayload,
) -> Result<Redirect, ApiError> {
    state.artist_service().create(&input).await?;
    Ok(flash::redirect_with(&session, INDEX_PATH, "Artist created successfully.").await)
}

/// GET /artists/{id}/edit
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PageView<FormProps>>, ApiError> {
    let id = artist_id(&id)?;
    let artist = state.artist_service().get(id).await?;

    Ok(Json(PageView::new(
        "artist/Form",
        format!("/artists/{id}/edit"),
        FormProps {
            artist: Some(ArtistResource::from(&artist)),
        },
    )))
}

/// PATCH /artists/{id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    FormPayload(input): FormPayload,
) -> Result<Redirect, ApiError> {
    let id = artist_id(&id)?;
    state.artist_service().update(id, &input).await?;
    Ok(flash::redirect_with(&session, INDEX_PATH, "Artist updated successfully.").await)
}

/// DELETE /artists/{id}
/// Removes the artist, its works and their images.
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    let id = artist_id(&id)?;
    state.artist_service().destroy(id).await?;
    Ok(flash::redirect_with(&session, INDEX_PATH, "Artist deleted successfully.").await)
}
