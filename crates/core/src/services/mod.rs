//! Business logic services.

#![allow(missing_docs)]

pub mod ballot;
pub mod complaint;
pub mod profile;
pub mod question;
pub mod user;
pub mod voting;

pub use ballot::{BallotService, tally_percent};
pub use complaint::{ComplaintService, CreateComplaintInput, Resolution};
pub use profile::{ProfileService, ProfileView};
pub use question::{CreateQuestionInput, CreateVariantInput, QuestionService, QuestionWithVariants};
pub use user::{CreateUserInput, UserService};
pub use voting::{
    CreateVotingInput, LikeOutcome, QuestionView, VariantView, VotingDetail, VotingService,
};
