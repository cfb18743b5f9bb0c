//! Question and variant authoring.

use votings_common::{AppError, AppResult, IdGenerator};
use votings_db::{
    entities::{
        question::{self, QuestionType},
        variant, voting,
    },
    repositories::{QuestionRepository, VotingRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Question service for business logic.
#[derive(Clone)]
pub struct QuestionService {
    voting_repo: VotingRepository,
    question_repo: QuestionRepository,
    id_gen: IdGenerator,
}

/// Input for adding the question of a voting.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
}

/// Input for adding an answer variant.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVariantInput {
    #[validate(length(min = 1, max = 100))]
    pub text: String,
}

/// A question together with its variants, as seen by the author.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWithVariants {
    #[serde(flatten)]
    pub question: question::Model,
    pub variants: Vec<variant::Model>,
}

impl QuestionService {
    /// Create a new question service.
    #[must_use]
    pub const fn new(voting_repo: VotingRepository, question_repo: QuestionRepository) -> Self {
        Self {
            voting_repo,
            question_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add the question to a voting. Only the author may, and only once.
    pub async fn create_question(
        &self,
        user_id: &str,
        voting_id: &str,
        input: CreateQuestionInput,
    ) -> AppResult<question::Model> {
        let voting = self.voting_repo.get_by_id(voting_id).await?;
        ensure_author(&voting, user_id)?;

        if self.question_repo.exists_for_voting(&voting.id).await? {
            return Err(already_has_question());
        }

        input.validate()?;

        let model = question::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            description: Set(input.description),
            voting_id: Set(voting.id.clone()),
            question_type: Set(input.question_type),
        };

        let question = match self.question_repo.create(model).await {
            Err(AppError::Conflict(_)) => return Err(already_has_question()),
            other => other?,
        };
        tracing::info!(question_id = %question.id, voting_id = %voting.id, "Question created");

        Ok(question)
    }

    /// Add a variant to a question of a voting the user authored.
    pub async fn create_variant(
        &self,
        user_id: &str,
        question_id: &str,
        input: CreateVariantInput,
    ) -> AppResult<variant::Model> {
        let question = self.question_repo.get_by_id(question_id).await?;
        let voting = self.voting_repo.get_by_id(&question.voting_id).await?;
        ensure_author(&voting, user_id)?;

        input.validate()?;

        let model = variant::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(input.text),
            question_id: Set(question.id.clone()),
        };

        let variant = self.question_repo.create_variant(model).await?;
        tracing::info!(variant_id = %variant.id, question_id = %question.id, "Variant created");

        Ok(variant)
    }

    /// The author's view of a question.
    pub async fn get_question(
        &self,
        user_id: &str,
        question_id: &str,
    ) -> AppResult<QuestionWithVariants> {
        let question = self.question_repo.get_by_id(question_id).await?;
        let voting = self.voting_repo.get_by_id(&question.voting_id).await?;
        ensure_author(&voting, user_id)?;

        let variants = self.question_repo.find_variants(&question.id).await?;

        Ok(QuestionWithVariants { question, variants })
    }
}

fn already_has_question() -> AppError {
    AppError::Forbidden("This voting already has a question".to_string())
}

fn ensure_author(voting: &voting::Model, user_id: &str) -> AppResult<()> {
    if voting.is_authored_by(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author can edit this voting".to_string(),
        ))
    }
}
