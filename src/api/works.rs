use axum::{
    Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Serialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::forms::{FormPayload, PageQuery, parse_id};
use super::types::{ArtistResource, PageView, Paginated, WorkResource};
use super::{ApiError, AppState, flash};
use crate::domain::WorkId;
use crate::services::{WorkError, WorkForm};

const INDEX_PATH: &str = "/work";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexProps {
    pub paginated_works: Paginated<WorkResource>,
}

#[derive(Serialize)]
pub struct FormProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<WorkResource>,
    pub artists: Vec<ArtistResource>,
}

#[derive(Serialize)]
pub struct ShowProps {
    pub work: WorkResource,
}

fn work_id(raw: &str) -> Result<WorkId, ApiError> {
    parse_id(raw, "Work").map(WorkId::new)
}

fn form_props(form: &WorkForm, public_path: &str) -> FormProps {
    FormProps {
        work: form
            .work
            .as_ref()
            .map(|work| WorkResource::new(work, public_path)),
        artists: form.artists.iter().map(ArtistResource::from).collect(),
    }
}

/// Converts a service error, attaching the form's reference data to
/// validation failures.
async fn form_error(state: &AppState, id: Option<WorkId>, err: WorkError) -> ApiError {
    let WorkError::Validation(errors) = err else {
        return err.into();
    };

    let form = match id {
        Some(id) => state.work_service().edit_form(id).await,
        None => state.work_service().new_form().await,
    };

    let error = ApiError::validation(errors);
    match form.map(|form| serde_json::to_value(form_props(&form, state.public_path()))) {
        Ok(Ok(props)) => error.with_props(props),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Failed to serialize work form");
            error
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load work form");
            error
        }
    }
}

/// GET /work
pub async fn index(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageView<IndexProps>>, ApiError> {
    let page = state.work_service().list(query.page()).await?;
    let public_path = state.public_path();
    let props = IndexProps {
        paginated_works: Paginated::new(
            page.map(|w| WorkResource::new(&w, public_path)),
            INDEX_PATH,
        ),
    };

    Ok(Json(
        PageView::new("work/Index", INDEX_PATH, props).with_flash(flash::take(&session).await),
    ))
}

/// GET /works/{id}
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PageView<ShowProps>>, ApiError> {
    let id = work_id(&id)?;
    let work = state.work_service().show(id).await?;

    Ok(Json(PageView::new(
        "work/Show",
        format!("/works/{id}"),
        ShowProps {
            work: WorkResource::new(&work, state.public_path()),
        },
    )))
}

/// GET /works/create
pub async fn create(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PageView<FormProps>>, ApiError> {
    let form = state.work_service().new_form().await?;

    Ok(Json(PageView::new(
        "work/Form",
        "/works/create",
        form_props(&form, state.public_path()),
    )))
}

/// POST /works
/// Creates the work and stores any uploaded images.
pub async fn store(
    State(state): State<Arc<AppState>>,
    session: Session,
    FormPayload(input): FormPayload,
) -> Result<Redirect, ApiError> {
    match state.work_service().create(&input).await {
        Ok(_) => Ok(flash::redirect_with(&session, INDEX_PATH, "Work created successfully.").await),
        Err(e) => Err(form_error(&state, None, e).await),
    }
}

/// GET /works/{id}/edit
pub async fn edit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PageView<FormProps>>, ApiError> {
    let id = work_id(&id)?;
    let form = state.work_service().edit_form(id).await?;

    Ok(Json(PageView::new(
        "work/Form",
        format!("/works/{id}/edit"),
        form_props(&form, state.public_path()),
    )))
}

/// PATCH /works/{id}
/// Updates fields, removes `deleted_media_ids` and appends new images.
pub async fn update(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    FormPayload(input): FormPayload,
) -> Result<Redirect, ApiError> {
    let id = work_id(&id)?;

    match state.work_service().update(id, &input).await {
        Ok(()) => Ok(flash::redirect_with(&session, INDEX_PATH, "Work updated successfully.").await),
        Err(e) => Err(form_error(&state, Some(id), e).await),
    }
}

/// DELETE /works/{id}
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    let id = work_id(&id)?;
    state.work_service().destroy(id).await?;
    Ok(flash::redirect_with(&session, INDEX_PATH, "Work deleted successfully.").await)
}
