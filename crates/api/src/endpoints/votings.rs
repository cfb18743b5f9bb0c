//! Voting endpoints: authoring, browsing, ballots and likes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::Form;
use serde::Deserialize;
use serde_json::json;
use votings_common::{AppError, AppResult};
use votings_core::{
    CreateQuestionInput, CreateVariantInput, CreateVotingInput, QuestionWithVariants,
    VotingDetail,
};
use votings_db::entities::voting;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Ballot form. `variant_id` repeats once per picked variant.
#[derive(Debug, Default, Deserialize)]
pub struct BallotForm {
    #[serde(default)]
    pub variant_id: Vec<String>,
}

fn voting_url(id: &str) -> String {
    format!("/votings/{id}/")
}

/// Published, unblocked votings.
async fn list(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<voting::Model>>> {
    let votings = state.voting_service.list_active().await?;
    Ok(ApiResponse::ok(votings))
}

async fn create_voting(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Form(input): Form<CreateVotingInput>,
) -> AppResult<Redirect> {
    let voting = state.voting_service.create(&user.id, input).await?;
    Ok(Redirect::to(&voting_url(&voting.id)))
}

async fn create_question(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(voting_id): Path<String>,
    Form(input): Form<CreateQuestionInput>,
) -> AppResult<Redirect> {
    let question = state
        .question_service
        .create_question(&user.id, &voting_id, input)
        .await?;
    Ok(Redirect::to(&voting_url(&question.voting_id)))
}

/// `{id}` here is the question id.
async fn create_variant(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<String>,
    Form(input): Form<CreateVariantInput>,
) -> AppResult<Redirect> {
    let variant = state
        .question_service
        .create_variant(&user.id, &question_id, input)
        .await?;
    Ok(Redirect::to(&format!(
        "/votings/question/{}/",
        variant.question_id
    )))
}

async fn detail(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(voting_id): Path<String>,
) -> AppResult<ApiResponse<VotingDetail>> {
    let detail = state.voting_service.detail(&voting_id, &user.id).await?;
    Ok(ApiResponse::ok(detail))
}

/// Cast a ballot. Repeated ballots are silently ignored.
async fn vote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(voting_id): Path<String>,
    Form(form): Form<BallotForm>,
) -> AppResult<Redirect> {
    state
        .ballot_service
        .cast(&user.id, &voting_id, &form.variant_id)
        .await?;
    Ok(Redirect::to(&voting_url(&voting_id)))
}

async fn publish(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(voting_id): Path<String>,
) -> AppResult<Redirect> {
    let voting = state.voting_service.publish(&user.id, &voting_id).await?;
    Ok(Redirect::to(&voting_url(&voting.id)))
}

async fn question(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> AppResult<ApiResponse<QuestionWithVariants>> {
    let question = state
        .question_service
        .get_question(&user.id, &question_id)
        .await?;
    Ok(ApiResponse::ok(question))
}

/// Toggle a like. Answers with the bare like count rather than the usual envelope.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(voting_id): Path<String>,
) -> Response {
    match state.voting_service.like(&user.id, &voting_id).await {
        Ok(outcome) => Json(json!({ "count likes": outcome.likes_count })).into_response(),
        Err(AppError::VotingNotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Invalid id" })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list/", get(list))
        .route("/create_voting/", post(create_voting))
        .route("/question/{id}/", get(question))
        .route("/{id}/", get(detail).post(vote))
        .route("/{id}/create_questions/", post(create_question))
        .route("/{id}/create_variants/", post(create_variant))
        .route("/{id}/publish/", get(publish))
        .route("/{id}/like/", get(like))
}
