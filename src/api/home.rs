use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::forms::PageQuery;
use super::types::{PageView, Paginated, WorkResource};
use super::{ApiError, AppState, flash};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeProps {
    pub paginated_works: Paginated<WorkResource>,
}

/// GET /
/// Public landing page listing works.
pub async fn index(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageView<HomeProps>>, ApiError> {
    let page = state.work_service().list(query.page()).await?;
    let public_path = state.public_path();
    let props = HomeProps {
        paginated_works: Paginated::new(page.map(|w| WorkResource::new(&w, public_path)), "/"),
    };

    Ok(Json(
        PageView::new("Welcome", "/", props).with_flash(flash::take(&session).await),
    ))
}
