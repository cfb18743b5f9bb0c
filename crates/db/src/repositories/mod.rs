//! Repositories wrapping the sea-orm query builder, one per aggregate.

mod complaint;
mod question;
mod user;
mod vote_fact;
mod voting;
mod voting_like;

pub use complaint::ComplaintRepository;
pub use question::QuestionRepository;
pub use user::UserRepository;
pub use vote_fact::VoteFactRepository;
pub use voting::VotingRepository;
pub use voting_like::VotingLikeRepository;

use sea_orm::{DbErr, SqlErr};
use votings_common::AppError;

/// Map a failed insert, turning unique-index hits into `AppError::Conflict`.
///
/// An `ON CONFLICT DO NOTHING` insert that skipped its row comes back as
/// `RecordNotInserted` or, with `RETURNING`, as `RecordNotFound`.
pub(crate) fn write_err(e: DbErr) -> AppError {
    match e {
        DbErr::RecordNotInserted | DbErr::RecordNotFound(_) => {
            AppError::Conflict("Record already exists".to_string())
        }
        e => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
            _ => AppError::Database(e.to_string()),
        },
    }
}
