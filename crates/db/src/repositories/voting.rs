//! Voting repository.

use std::sync::Arc;

use crate::entities::{Voting, question, variant, vote_fact, voting, voting_like};
use votings_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait,
};

/// Voting repository for database operations.
#[derive(Clone)]
pub struct VotingRepository {
    db: Arc<DatabaseConnection>,
}

impl VotingRepository {
    /// Create a new voting repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a voting by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<voting::Model>> {
        Voting::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a voting by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<voting::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::VotingNotFound(id.to_string()))
    }

    /// Published votings that have not been blocked, newest first.
    pub async fn find_active(&self) -> AppResult<Vec<voting::Model>> {
        Voting::find()
            .filter(voting::Column::Published.eq(true))
            .filter(voting::Column::Blocked.eq(false))
            .order_by_desc(voting::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Votings authored by a user.
    pub async fn find_by_author(&self, author_id: &str) -> AppResult<Vec<voting::Model>> {
        Voting::find()
            .filter(voting::Column::AuthorId.eq(author_id))
            .order_by_desc(voting::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Votings the user currently likes.
    pub async fn find_liked_by_user(&self, user_id: &str) -> AppResult<Vec<voting::Model>> {
        Voting::find()
            .join(JoinType::InnerJoin, voting::Relation::Like.def())
            .filter(voting_like::Column::UserId.eq(user_id))
            .filter(voting_like::Column::Active.eq(true))
            .order_by_desc(voting::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Distinct votings reachable through the user's vote facts.
    pub async fn find_voted_by_user(&self, user_id: &str) -> AppResult<Vec<voting::Model>> {
        Voting::find()
            .join(JoinType::InnerJoin, voting::Relation::Question.def())
            .join(JoinType::InnerJoin, question::Relation::Variant.def())
            .join(JoinType::InnerJoin, variant::Relation::VoteFact.def())
            .filter(vote_fact::Column::UserId.eq(user_id))
            .distinct()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new voting.
    pub async fn create(&self, model: voting::ActiveModel) -> AppResult<voting::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a voting.
    pub async fn update(&self, model: voting::ActiveModel) -> AppResult<voting::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
