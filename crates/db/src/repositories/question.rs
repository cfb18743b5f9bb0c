//! Question and variant repository.

use std::sync::Arc;

use super::write_err;
use crate::entities::{Question, Variant, question, variant};
use votings_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, sea_query::OnConflict,
};

/// Repository for a voting's question and its answer variants.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ========== Questions ==========

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a question by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<question::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question {id} not found")))
    }

    /// Questions of a voting.
    pub async fn find_by_voting(&self, voting_id: &str) -> AppResult<Vec<question::Model>> {
        Question::find()
            .filter(question::Column::VotingId.eq(voting_id))
            .order_by_asc(question::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether the voting already has a question.
    pub async fn exists_for_voting(&self, voting_id: &str) -> AppResult<bool> {
        let count = Question::find()
            .filter(question::Column::VotingId.eq(voting_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a new question.
    ///
    /// Fails with `AppError::Conflict` when the voting already has one.
    pub async fn create(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        Question::insert(model)
            .on_conflict(
                OnConflict::column(question::Column::VotingId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_with_returning(self.db.as_ref())
            .await
            .map_err(write_err)
    }

    // ========== Variants ==========

    /// Variants of a question, in creation order.
    pub async fn find_variants(&self, question_id: &str) -> AppResult<Vec<variant::Model>> {
        Variant::find()
            .filter(variant::Column::QuestionId.eq(question_id))
            .order_by_asc(variant::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Variants of several questions at once.
    pub async fn find_variants_for_questions(
        &self,
        question_ids: &[String],
    ) -> AppResult<Vec<variant::Model>> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }

        Variant::find()
            .filter(variant::Column::QuestionId.is_in(question_ids.to_vec()))
            .order_by_asc(variant::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new variant.
    pub async fn create_variant(&self, model: variant::ActiveModel) -> AppResult<variant::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
