//! Complaint endpoints: filing and staff moderation.

use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
    Router,
};
use axum_extra::extract::Form;
use serde::Deserialize;
use votings_common::AppResult;
use votings_core::{CreateComplaintInput, Resolution};
use votings_db::entities::complaint;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Moderation form. `result=skip` closes the complaint, anything else blocks.
#[derive(Debug, Default, Deserialize)]
pub struct ResolveForm {
    #[serde(default)]
    pub result: String,
}

async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<complaint::Model>>> {
    let complaints = state.complaint_service.list_open(&user.id).await?;
    Ok(ApiResponse::ok(complaints))
}

async fn detail(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<complaint::Model>> {
    let complaint = state.complaint_service.get(&user.id, &id).await?;
    Ok(ApiResponse::ok(complaint))
}

async fn resolve(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ResolveForm>,
) -> AppResult<Redirect> {
    state
        .complaint_service
        .resolve(&user.id, &id, Resolution::from_form(&form.result))
        .await?;
    Ok(Redirect::to("/complains/list/"))
}

/// `{id}` is the voting complained about.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(voting_id): Path<String>,
    Form(input): Form<CreateComplaintInput>,
) -> AppResult<Redirect> {
    let complaint = state
        .complaint_service
        .create(&user.id, &voting_id, input)
        .await?;
    Ok(Redirect::to(&format!("/votings/{}/", complaint.voting_id)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list/", get(list))
        .route("/create/{id}/", post(create))
        .route("/{id}/", get(detail).post(resolve))
}
