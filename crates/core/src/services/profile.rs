//! Profile service.

use votings_common::AppResult;
use votings_db::{
    entities::{user, voting},
    repositories::{UserRepository, VotingRepository},
};
use serde::Serialize;

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    user_repo: UserRepository,
    voting_repo: VotingRepository,
}

/// A user's profile page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user: user::Model,
    pub votings: Vec<voting::Model>,
    pub liked_votings: Vec<voting::Model>,
    pub voted_votings: Vec<voting::Model>,
    pub is_owner: bool,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, voting_repo: VotingRepository) -> Self {
        Self {
            user_repo,
            voting_repo,
        }
    }

    /// Build the profile of `owner_id` as seen by `viewer_id`.
    pub async fn profile(&self, owner_id: &str, viewer_id: &str) -> AppResult<ProfileView> {
        let user = self.user_repo.get_by_id(owner_id).await?;

        let votings = self.voting_repo.find_by_author(&user.id).await?;
        let liked_votings = self.voting_repo.find_liked_by_user(&user.id).await?;
        let voted_votings = self.voting_repo.find_voted_by_user(&user.id).await?;
        let is_owner = user.id == viewer_id;

        Ok(ProfileView {
            user,
            votings,
            liked_votings,
            voted_votings,
            is_owner,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use votings_common::AppError;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            username_lower: id.to_string(),
            password_hash: "hash".to_string(),
            token: None,
            is_staff: false,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_voting(id: &str, author_id: &str) -> voting::Model {
        voting::Model {
            id: id.to_string(),
            title: id.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().into(),
            blocked: false,
            published: true,
        }
    }

    fn create_test_service(user_db: MockDatabase, voting_db: MockDatabase) -> ProfileService {
        ProfileService::new(
            UserRepository::new(Arc::new(user_db.into_connection())),
            VotingRepository::new(Arc::new(voting_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_profile_of_other_user() {
        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("bob")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<voting::Model>::new()])
                .append_query_results([[create_test_voting("colors", "alice")]])
                .append_query_results([[
                    create_test_voting("colors", "alice"),
                    create_test_voting("pets", "carol"),
                ]]),
        );

        let profile = service.profile("bob", "alice").await.unwrap();
        assert!(!profile.is_owner);
        assert!(profile.votings.is_empty());
        assert_eq!(profile.liked_votings.len(), 1);
        assert_eq!(profile.voted_votings.len(), 2);
    }

    #[tokio::test]
    async fn test_own_profile() {
        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("alice")]]),
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_voting("colors", "alice")]])
                .append_query_results([Vec::<voting::Model>::new()])
                .append_query_results([Vec::<voting::Model>::new()]),
        );

        let profile = service.profile("alice", "alice").await.unwrap();
        assert!(profile.is_owner);
        assert_eq!(profile.votings.len(), 1);
    }

    #[tokio::test]
    async fn test_profile_of_missing_user() {
        let service = create_test_service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let result = service.profile("ghost", "alice").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
