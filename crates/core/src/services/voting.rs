//! Voting service.

use std::collections::HashSet;

use chrono::Utc;
use votings_common::{AppError, AppResult, IdGenerator};
use votings_db::{
    entities::{question, voting, voting_like},
    repositories::{QuestionRepository, VoteFactRepository, VotingLikeRepository, VotingRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::ballot::tally_percent;

/// Voting service for business logic.
#[derive(Clone)]
pub struct VotingService {
    voting_repo: VotingRepository,
    question_repo: QuestionRepository,
    fact_repo: VoteFactRepository,
    like_repo: VotingLikeRepository,
    id_gen: IdGenerator,
}

/// Input for creating a voting.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVotingInput {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
}

/// A variant as shown on the voting page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantView {
    pub id: String,
    pub text: String,
    pub votes: u64,
    pub percent: u32,
    pub is_voted: bool,
}

/// A question with its variants and tallies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    #[serde(flatten)]
    pub question: question::Model,
    pub total_votes: u64,
    pub variants: Vec<VariantView>,
}

/// Everything the voting page shows to one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingDetail {
    pub voting: voting::Model,
    pub likes_count: u64,
    pub has_voted: bool,
    pub questions: Vec<QuestionView>,
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes_count: u64,
}

impl VotingService {
    /// Create a new voting service.
    #[must_use]
    pub const fn new(
        voting_repo: VotingRepository,
        question_repo: QuestionRepository,
        fact_repo: VoteFactRepository,
        like_repo: VotingLikeRepository,
    ) -> Self {
        Self {
            voting_repo,
            question_repo,
            fact_repo,
            like_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an unpublished voting authored by `author_id`.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreateVotingInput,
    ) -> AppResult<voting::Model> {
        input.validate()?;

        let model = voting::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            author_id: Set(author_id.to_string()),
            created_at: Set(Utc::now().into()),
            blocked: Set(false),
            published: Set(false),
        };

        let voting = self.voting_repo.create(model).await?;
        tracing::info!(voting_id = %voting.id, author_id = %author_id, "Voting created");

        Ok(voting)
    }

    /// Get a voting by ID.
    pub async fn get(&self, id: &str) -> AppResult<voting::Model> {
        self.voting_repo.get_by_id(id).await
    }

    /// Published, unblocked votings, newest first.
    pub async fn list_active(&self) -> AppResult<Vec<voting::Model>> {
        self.voting_repo.find_active().await
    }

    /// Publish a voting. Only its author may do this.
    pub async fn publish(&self, user_id: &str, voting_id: &str) -> AppResult<voting::Model> {
        let voting = self.voting_repo.get_by_id(voting_id).await?;

        if !voting.is_authored_by(user_id) {
            return Err(AppError::Forbidden(
                "Only the author can publish this voting".to_string(),
            ));
        }

        if voting.published {
            return Ok(voting);
        }

        let mut active: voting::ActiveModel = voting.into();
        active.published = Set(true);

        let voting = self.voting_repo.update(active).await?;
        tracing::info!(voting_id = %voting.id, "Voting published");

        Ok(voting)
    }

    /// Assemble the voting page for `user_id`.
    pub async fn detail(&self, voting_id: &str, user_id: &str) -> AppResult<VotingDetail> {
        let voting = self.voting_repo.get_by_id(voting_id).await?;
        let likes_count = self.like_repo.count_active(&voting.id).await?;
        let has_voted = self.fact_repo.has_voted_in_voting(user_id, &voting.id).await?;

        let questions = self.question_repo.find_by_voting(&voting.id).await?;
        let question_ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let variants = self
            .question_repo
            .find_variants_for_questions(&question_ids)
            .await?;

        let variant_ids: Vec<String> = variants.iter().map(|v| v.id.clone()).collect();
        let counts = self.fact_repo.count_by_variants(&variant_ids).await?;

        let picked: HashSet<String> = if has_voted {
            self.fact_repo
                .find_by_user_in_voting(user_id, &voting.id)
                .await?
                .into_iter()
                .map(|f| f.variant_id)
                .collect()
        } else {
            HashSet::new()
        };

        let questions = questions
            .into_iter()
            .map(|question| {
                let own: Vec<_> = variants
                    .iter()
                    .filter(|v| v.question_id == question.id)
                    .collect();
                let total_votes: u64 = own
                    .iter()
                    .map(|v| counts.get(&v.id).copied().unwrap_or(0))
                    .sum();

                let variants = own
                    .into_iter()
                    .map(|v| {
                        let votes = counts.get(&v.id).copied().unwrap_or(0);
                        VariantView {
                            id: v.id.clone(),
                            text: v.text.clone(),
                            votes,
                            percent: tally_percent(votes, total_votes),
                            is_voted: picked.contains(&v.id),
                        }
                    })
                    .collect();

                QuestionView {
                    question,
                    total_votes,
                    variants,
                }
            })
            .collect();

        Ok(VotingDetail {
            voting,
            likes_count,
            has_voted,
            questions,
        })
    }

    /// Toggle the user's like on a voting.
    ///
    /// The first call creates an active like; later calls flip it.
    pub async fn like(&self, user_id: &str, voting_id: &str) -> AppResult<LikeOutcome> {
        let voting = self
            .voting_repo
            .find_by_id(voting_id)
            .await?
            .ok_or_else(|| AppError::VotingNotFound(voting_id.to_string()))?;

        let liked = match self.like_repo.find(&voting.id, user_id).await? {
            Some(existing) => {
                let liked = !existing.active;
                let mut active: voting_like::ActiveModel = existing.into();
                active.active = Set(liked);
                self.like_repo.update(active).await?;
                liked
            }
            None => {
                let model = voting_like::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    voting_id: Set(voting.id.clone()),
                    user_id: Set(user_id.to_string()),
                    active: Set(true),
                    created_at: Set(Utc::now().into()),
                };
                self.like_repo.create(model).await?;
                true
            }
        };

        let likes_count = self.like_repo.count_active(&voting.id).await?;
        tracing::debug!(voting_id = %voting.id, user_id = %user_id, liked, likes_count, "Like toggled");

        Ok(LikeOutcome { liked, likes_count })
    }
}
