//! Voting like repository.

use std::sync::Arc;

use crate::entities::{VotingLike, voting_like};
use votings_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// Voting like repository for database operations.
#[derive(Clone)]
pub struct VotingLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl VotingLikeRepository {
    /// Create a new voting like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the like row for (voting, user), active or not.
    pub async fn find(
        &self,
        voting_id: &str,
        user_id: &str,
    ) -> AppResult<Option<voting_like::Model>> {
        VotingLike::find()
            .filter(voting_like::Column::VotingId.eq(voting_id))
            .filter(voting_like::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count active likes of a voting.
    pub async fn count_active(&self, voting_id: &str) -> AppResult<u64> {
        VotingLike::find()
            .filter(voting_like::Column::VotingId.eq(voting_id))
            .filter(voting_like::Column::Active.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new like row.
    pub async fn create(&self, model: voting_like::ActiveModel) -> AppResult<voting_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a like row.
    pub async fn update(&self, model: voting_like::ActiveModel) -> AppResult<voting_like::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_returns_inactive_rows_too() {
        let like = voting_like::Model {
            id: "like1".to_string(),
            voting_id: "v1".to_string(),
            user_id: "bob".to_string(),
            active: false,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like]])
                .into_connection(),
        );

        let repo = VotingLikeRepository::new(db);
        let found = repo.find("v1", "bob").await.unwrap().unwrap();

        assert!(!found.active);
    }

    #[tokio::test]
    async fn test_count_active() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );

        let repo = VotingLikeRepository::new(db);
        assert_eq!(repo.count_active("v1").await.unwrap(), 3);
    }
}
