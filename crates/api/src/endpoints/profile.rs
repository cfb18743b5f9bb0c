//! Profile endpoint.

use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use votings_common::AppResult;
use votings_core::ProfileView;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

async fn show(
    AuthUser(viewer): AuthUser,
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> AppResult<ApiResponse<ProfileView>> {
    let profile = state.profile_service.profile(&owner_id, &viewer.id).await?;
    Ok(ApiResponse::ok(profile))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/", get(show))
}
