//! Complaint service: filing complaints and staff moderation.

use chrono::Utc;
use votings_common::{AppError, AppResult, IdGenerator};
use votings_db::{
    entities::{complaint, user},
    repositories::{ComplaintRepository, UserRepository, VotingRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for filing a complaint against a voting.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateComplaintInput {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}

/// What a moderator decided about a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Close the complaint, leave the voting alone.
    Skip,
    /// Close the complaint and block the voting.
    Block,
}

impl Resolution {
    /// Parse the submitted `result` field. Anything but `skip` blocks.
    #[must_use]
    pub fn from_form(value: &str) -> Self {
        if value == "skip" {
            Self::Skip
        } else {
            Self::Block
        }
    }
}

/// Complaint service for business logic.
#[derive(Clone)]
pub struct ComplaintService {
    complaint_repo: ComplaintRepository,
    voting_repo: VotingRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl ComplaintService {
    /// Create a new complaint service.
    #[must_use]
    pub const fn new(
        complaint_repo: ComplaintRepository,
        voting_repo: VotingRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            complaint_repo,
            voting_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// File a complaint about a voting.
    pub async fn create(
        &self,
        user_id: &str,
        voting_id: &str,
        input: CreateComplaintInput,
    ) -> AppResult<complaint::Model> {
        input.validate()?;

        let voting = self.voting_repo.get_by_id(voting_id).await?;

        let model = complaint::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            voting_id: Set(voting.id.clone()),
            text: Set(input.text),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        let complaint = self.complaint_repo.create(model).await?;
        tracing::info!(complaint_id = %complaint.id, voting_id = %voting.id, "Complaint filed");

        Ok(complaint)
    }

    /// Complaints awaiting moderation. Staff only.
    pub async fn list_open(&self, moderator_id: &str) -> AppResult<Vec<complaint::Model>> {
        self.ensure_staff(moderator_id).await?;
        self.complaint_repo.find_open().await
    }

    /// A single complaint. Staff only.
    pub async fn get(&self, moderator_id: &str, id: &str) -> AppResult<complaint::Model> {
        self.ensure_staff(moderator_id).await?;
        self.complaint_repo.get_by_id(id).await
    }

    /// Close a complaint, blocking its voting when asked to.
    ///
    /// A closed complaint may be resolved again, so a skipped one can still block.
    pub async fn resolve(
        &self,
        moderator_id: &str,
        id: &str,
        resolution: Resolution,
    ) -> AppResult<complaint::Model> {
        self.ensure_staff(moderator_id).await?;

        let complaint = self.complaint_repo.get_by_id(id).await?;

        let closed = match resolution {
            Resolution::Skip => self.complaint_repo.deactivate(complaint).await?,
            Resolution::Block => self.complaint_repo.deactivate_and_block(complaint).await?,
        };

        tracing::info!(
            complaint_id = %closed.id,
            voting_id = %closed.voting_id,
            moderator_id = %moderator_id,
            ?resolution,
            "Complaint resolved"
        );

        Ok(closed)
    }

    async fn ensure_staff(&self, user_id: &str) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(user_id).await?;
        if !user.is_staff {
            return Err(AppError::Forbidden("Staff only".to_string()));
        }
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use votings_db::entities::voting;

    fn create_test_user(id: &str, is_staff: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            username_lower: id.to_string(),
            password_hash: "hash".to_string(),
            token: None,
            is_staff,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_complaint(is_active: bool) -> complaint::Model {
        complaint::Model {
            id: "c1".to_string(),
            user_id: "bob".to_string(),
            voting_id: "colors".to_string(),
            text: "spam".to_string(),
            is_active,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_service(
        complaint_db: MockDatabase,
        voting_db: MockDatabase,
        user_db: MockDatabase,
    ) -> ComplaintService {
        create_logged_service(
            Arc::new(complaint_db.into_connection()),
            voting_db,
            user_db,
        )
    }

    /// Service whose complaint connection the caller keeps, to read its statement log.
    fn create_logged_service(
        complaint_db: Arc<DatabaseConnection>,
        voting_db: MockDatabase,
        user_db: MockDatabase,
    ) -> ComplaintService {
        ComplaintService::new(
            ComplaintRepository::new(complaint_db),
            VotingRepository::new(Arc::new(voting_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
        )
    }

    fn logged_sql(db: Arc<DatabaseConnection>) -> Vec<String> {
        Arc::try_unwrap(db)
            .ok()
            .unwrap()
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    fn empty() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    #[test]
    fn test_resolution_from_form() {
        assert_eq!(Resolution::from_form("skip"), Resolution::Skip);
        assert_eq!(Resolution::from_form("block"), Resolution::Block);
        assert_eq!(Resolution::from_form(""), Resolution::Block);
    }

    #[tokio::test]
    async fn test_create_complaint_on_missing_voting() {
        let service = create_test_service(
            empty(),
            empty().append_query_results([Vec::<voting::Model>::new()]),
            empty(),
        );

        let result = service
            .create(
                "bob",
                "missing",
                CreateComplaintInput {
                    text: "spam".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::VotingNotFound(_))));
    }

    #[tokio::test]
    async fn test_create_complaint() {
        let service = create_test_service(
            empty().append_query_results([[create_test_complaint(true)]]),
            empty().append_query_results([[voting::Model {
                id: "colors".to_string(),
                title: "Colors".to_string(),
                author_id: "alice".to_string(),
                created_at: Utc::now().into(),
                blocked: false,
                published: true,
            }]]),
            empty(),
        );

        let complaint = service
            .create(
                "bob",
                "colors",
                CreateComplaintInput {
                    text: "spam".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(complaint.is_active);
    }

    #[tokio::test]
    async fn test_list_requires_staff() {
        let service = create_test_service(
            empty(),
            empty(),
            empty().append_query_results([[create_test_user("bob", false)]]),
        );

        let result = service.list_open("bob").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_open_for_staff() {
        let service = create_test_service(
            empty().append_query_results([[create_test_complaint(true)]]),
            empty(),
            empty().append_query_results([[create_test_user("mod", true)]]),
        );

        let open = service.list_open("mod").await.unwrap();
        assert_eq!(open.len(), 1);
    }

    #[tokio::test]
    async fn test_skip_closes_complaint_only() {
        let complaint_db = Arc::new(
            empty()
                .append_query_results([[create_test_complaint(true)]])
                .append_query_results([[create_test_complaint(false)]])
                .into_connection(),
        );
        let service = create_logged_service(
            complaint_db.clone(),
            empty(),
            empty().append_query_results([[create_test_user("mod", true)]]),
        );

        let closed = service
            .resolve("mod", "c1", Resolution::Skip)
            .await
            .unwrap();
        assert!(!closed.is_active);

        drop(service);
        let sql = logged_sql(complaint_db);
        assert!(sql.iter().any(|s| s.starts_with(r#"UPDATE "complaint""#)));
        assert!(!sql.iter().any(|s| s.contains(r#"UPDATE "voting""#)));
    }

    #[tokio::test]
    async fn test_block_closes_complaint_and_blocks_voting() {
        let complaint_db = Arc::new(
            empty()
                .append_query_results([[create_test_complaint(true)]])
                .append_query_results([[create_test_complaint(false)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = create_logged_service(
            complaint_db.clone(),
            empty(),
            empty().append_query_results([[create_test_user("mod", true)]]),
        );

        let closed = service
            .resolve("mod", "c1", Resolution::Block)
            .await
            .unwrap();
        assert!(!closed.is_active);
        assert_eq!(closed.voting_id, "colors");

        drop(service);
        let sql = logged_sql(complaint_db);
        assert!(sql.iter().any(|s| s.starts_with(r#"UPDATE "complaint""#)));
        assert!(
            sql.iter()
                .any(|s| s.starts_with(r#"UPDATE "voting""#) && s.contains(r#""blocked""#))
        );
    }

    #[tokio::test]
    async fn test_skipped_complaint_can_still_block() {
        let complaint_db = Arc::new(
            empty()
                .append_query_results([[create_test_complaint(false)]])
                .append_query_results([[create_test_complaint(false)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = create_logged_service(
            complaint_db.clone(),
            empty(),
            empty().append_query_results([[create_test_user("mod", true)]]),
        );

        let closed = service
            .resolve("mod", "c1", Resolution::Block)
            .await
            .unwrap();
        assert!(!closed.is_active);

        drop(service);
        let sql = logged_sql(complaint_db);
        assert!(sql.iter().any(|s| s.starts_with(r#"UPDATE "voting""#)));
    }
}
