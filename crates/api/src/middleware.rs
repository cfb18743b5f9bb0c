//! API middleware and shared state.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;
use votings_common::config::AuthConfig;
use votings_core::{
    BallotService, ComplaintService, ProfileService, QuestionService, UserService, VotingService,
};
use votings_db::repositories::{
    ComplaintRepository, QuestionRepository, UserRepository, VoteFactRepository,
    VotingLikeRepository, VotingRepository,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub voting_service: VotingService,
    pub question_service: QuestionService,
    pub ballot_service: BallotService,
    pub complaint_service: ComplaintService,
    pub profile_service: ProfileService,
}

impl AppState {
    /// Wire every repository and service onto one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, auth_config: AuthConfig) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let voting_repo = VotingRepository::new(Arc::clone(&db));
        let question_repo = QuestionRepository::new(Arc::clone(&db));
        let fact_repo = VoteFactRepository::new(Arc::clone(&db));
        let like_repo = VotingLikeRepository::new(Arc::clone(&db));
        let complaint_repo = ComplaintRepository::new(db);

        Self {
            user_service: UserService::new(user_repo.clone(), auth_config),
            voting_service: VotingService::new(
                voting_repo.clone(),
                question_repo.clone(),
                fact_repo.clone(),
                like_repo,
            ),
            question_service: QuestionService::new(voting_repo.clone(), question_repo.clone()),
            ballot_service: BallotService::new(voting_repo.clone(), question_repo, fact_repo),
            complaint_service: ComplaintService::new(
                complaint_repo,
                voting_repo.clone(),
                user_repo.clone(),
            ),
            profile_service: ProfileService::new(user_repo, voting_repo),
        }
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to a user and stores it in the
/// request extensions. Unknown tokens are treated as anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Bearer token rejected"),
        }
    }

    next.run(req).await
}
