//! Ballot service: casting votes and computing tallies.

use std::collections::HashSet;

use chrono::Utc;
use votings_common::{AppError, AppResult, IdGenerator};
use votings_db::{
    entities::{question::QuestionType, vote_fact},
    repositories::{QuestionRepository, VoteFactRepository, VotingRepository},
};
use sea_orm::Set;

/// Ballot service for business logic.
#[derive(Clone)]
pub struct BallotService {
    voting_repo: VotingRepository,
    question_repo: QuestionRepository,
    fact_repo: VoteFactRepository,
    id_gen: IdGenerator,
}

/// Share of a question's votes that went to one variant, truncated to a whole percent.
///
/// Returns 0 when the question has no votes yet.
#[must_use]
pub const fn tally_percent(variant_votes: u64, question_votes: u64) -> u32 {
    if question_votes == 0 {
        return 0;
    }
    // variant_votes <= question_votes, so the quotient fits in 0..=100
    (variant_votes * 100 / question_votes) as u32
}

impl BallotService {
    /// Create a new ballot service.
    #[must_use]
    pub const fn new(
        voting_repo: VotingRepository,
        question_repo: QuestionRepository,
        fact_repo: VoteFactRepository,
    ) -> Self {
        Self {
            voting_repo,
            question_repo,
            fact_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record the user's ballot for a voting.
    ///
    /// A user gets one ballot per voting; a second submission is ignored.
    /// Variant ids that don't belong to the voting are dropped, and a
    /// single-choice question keeps only the first submitted variant.
    /// Returns the number of vote facts written.
    pub async fn cast(
        &self,
        user_id: &str,
        voting_id: &str,
        variant_ids: &[String],
    ) -> AppResult<u64> {
        let voting = self.voting_repo.get_by_id(voting_id).await?;

        if self.fact_repo.has_voted_in_voting(user_id, &voting.id).await? {
            tracing::debug!(user_id = %user_id, voting_id = %voting.id, "Repeated ballot ignored");
            return Ok(0);
        }

        let questions = self.question_repo.find_by_voting(&voting.id).await?;
        let question_ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let variants = self
            .question_repo
            .find_variants_for_questions(&question_ids)
            .await?;

        let mut seen = HashSet::new();
        let mut answered_single = HashSet::new();
        let mut chosen = Vec::new();

        for variant_id in variant_ids {
            let Some(variant) = variants.iter().find(|v| &v.id == variant_id) else {
                continue;
            };
            if !seen.insert(variant.id.clone()) {
                continue;
            }
            let single = questions.iter().any(|q| {
                q.id == variant.question_id && q.question_type == QuestionType::Single
            });
            if single && !answered_single.insert(variant.question_id.clone()) {
                continue;
            }
            chosen.push(vote_fact::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(Some(user_id.to_string())),
                variant_id: Set(variant.id.clone()),
                created_at: Set(Utc::now().into()),
            });
        }

        let written = match self.fact_repo.create_many(chosen).await {
            Err(AppError::Conflict(_)) => {
                tracing::debug!(user_id = %user_id, voting_id = %voting.id, "Concurrent ballot ignored");
                return Ok(0);
            }
            other => other?,
        };
        if written > 0 {
            tracing::info!(user_id = %user_id, voting_id = %voting.id, facts = written, "Ballot cast");
        }

        Ok(written)
    }
}
