//! Vote fact repository.

use std::collections::HashMap;
use std::sync::Arc;

use super::write_err;
use crate::entities::{VoteFact, question, variant, vote_fact};
use votings_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QuerySelect, RelationTrait,
    sea_query::{Expr, OnConflict},
};

#[derive(Debug, FromQueryResult)]
struct VariantVotes {
    variant_id: String,
    votes: i64,
}

/// Vote fact repository for database operations.
#[derive(Clone)]
pub struct VoteFactRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteFactRepository {
    /// Create a new vote fact repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check whether the user has a vote fact anywhere in the voting.
    pub async fn has_voted_in_voting(&self, user_id: &str, voting_id: &str) -> AppResult<bool> {
        let count = VoteFact::find()
            .join(JoinType::InnerJoin, vote_fact::Relation::Variant.def())
            .join(JoinType::InnerJoin, variant::Relation::Question.def())
            .filter(vote_fact::Column::UserId.eq(user_id))
            .filter(question::Column::VotingId.eq(voting_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Vote facts the user cast in a voting.
    pub async fn find_by_user_in_voting(
        &self,
        user_id: &str,
        voting_id: &str,
    ) -> AppResult<Vec<vote_fact::Model>> {
        VoteFact::find()
            .join(JoinType::InnerJoin, vote_fact::Relation::Variant.def())
            .join(JoinType::InnerJoin, variant::Relation::Question.def())
            .filter(vote_fact::Column::UserId.eq(user_id))
            .filter(question::Column::VotingId.eq(voting_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Vote counts keyed by variant ID, for every listed variant that has votes.
    pub async fn count_by_variants(&self, variant_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if variant_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = VoteFact::find()
            .select_only()
            .column(vote_fact::Column::VariantId)
            .column_as(Expr::col(vote_fact::Column::Id).count(), "votes")
            .filter(vote_fact::Column::VariantId.is_in(variant_ids.to_vec()))
            .group_by(vote_fact::Column::VariantId)
            .into_model::<VariantVotes>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| (row.variant_id, u64::try_from(row.votes).unwrap_or(0)))
            .collect())
    }

    /// Insert several vote facts in one statement.
    ///
    /// A fact that already exists for the same (user, variant) is skipped.
    pub async fn create_many(&self, models: Vec<vote_fact::ActiveModel>) -> AppResult<u64> {
        if models.is_empty() {
            return Ok(0);
        }

        VoteFact::insert_many(models)
            .on_conflict(
                OnConflict::columns([vote_fact::Column::UserId, vote_fact::Column::VariantId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(write_err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, Set, Value};

    fn logged_sql(db: Arc<DatabaseConnection>) -> Vec<String> {
        Arc::try_unwrap(db)
            .ok()
            .unwrap()
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_has_voted_in_voting() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0))
                }]])
                .into_connection(),
        );

        let repo = VoteFactRepository::new(db);
        assert!(repo.has_voted_in_voting("bob", "v1").await.unwrap());
        assert!(!repo.has_voted_in_voting("carol", "v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_count_by_variants_groups_in_sql() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    maplit::btreemap! {
                        "variant_id" => Value::String(Some(Box::new("red".to_string()))),
                        "votes" => Value::BigInt(Some(2)),
                    },
                    maplit::btreemap! {
                        "variant_id" => Value::String(Some(Box::new("blue".to_string()))),
                        "votes" => Value::BigInt(Some(1)),
                    },
                ]])
                .into_connection(),
        );

        let repo = VoteFactRepository::new(db.clone());
        let counts = repo
            .count_by_variants(&["red".to_string(), "blue".to_string(), "green".to_string()])
            .await
            .unwrap();

        assert_eq!(counts.get("red"), Some(&2));
        assert_eq!(counts.get("blue"), Some(&1));
        assert_eq!(counts.get("green"), None);

        drop(repo);
        let sql = logged_sql(db);
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("COUNT("));
        assert!(sql[0].contains("GROUP BY"));
        assert!(sql[0].contains(r#""variant_id""#));
    }

    #[tokio::test]
    async fn test_create_many() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = VoteFactRepository::new(db.clone());
        let models = ["red", "blue"]
            .iter()
            .enumerate()
            .map(|(i, variant_id)| vote_fact::ActiveModel {
                id: Set(format!("f{i}")),
                user_id: Set(Some("bob".to_string())),
                variant_id: Set((*variant_id).to_string()),
                created_at: Set(Utc::now().into()),
            })
            .collect();

        assert_eq!(repo.create_many(models).await.unwrap(), 2);

        drop(repo);
        let sql = logged_sql(db);
        assert!(sql[0].starts_with(r#"INSERT INTO "vote_fact""#));
        assert!(sql[0].contains(r#"ON CONFLICT ("user_id", "variant_id") DO NOTHING"#));
    }

    #[tokio::test]
    async fn test_create_many_reports_duplicate_as_conflict() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_errors([DbErr::RecordNotInserted])
                .into_connection(),
        );

        let repo = VoteFactRepository::new(db);
        let model = vote_fact::ActiveModel {
            id: Set("f1".to_string()),
            user_id: Set(Some("bob".to_string())),
            variant_id: Set("red".to_string()),
            created_at: Set(Utc::now().into()),
        };

        let result = repo.create_many(vec![model]).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_many_empty_is_noop() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = VoteFactRepository::new(db);
        assert_eq!(repo.create_many(vec![]).await.unwrap(), 0);
    }
}
