//! Complaint repository.

use std::sync::Arc;

use crate::entities::{Complaint, Voting, complaint, voting};
use votings_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::Expr,
};

/// Complaint repository for database operations.
#[derive(Clone)]
pub struct ComplaintRepository {
    db: Arc<DatabaseConnection>,
}

impl ComplaintRepository {
    /// Create a new complaint repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new complaint.
    pub async fn create(&self, model: complaint::ActiveModel) -> AppResult<complaint::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a complaint by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<complaint::Model> {
        Complaint::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Complaint {id} not found")))
    }

    /// Complaints still awaiting moderation, oldest first.
    pub async fn find_open(&self) -> AppResult<Vec<complaint::Model>> {
        Complaint::find()
            .filter(complaint::Column::IsActive.eq(true))
            .order_by_asc(complaint::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Close a complaint without touching the voting.
    pub async fn deactivate(&self, complaint: complaint::Model) -> AppResult<complaint::Model> {
        let mut active: complaint::ActiveModel = complaint.into();
        active.is_active = Set(false);

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Close a complaint and block its voting in one transaction.
    pub async fn deactivate_and_block(
        &self,
        complaint: complaint::Model,
    ) -> AppResult<complaint::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let voting_id = complaint.voting_id.clone();
        let mut active: complaint::ActiveModel = complaint.into();
        active.is_active = Set(false);

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Voting::update_many()
            .col_expr(voting::Column::Blocked, Expr::value(true))
            .filter(voting::Column::Id.eq(voting_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }
}
