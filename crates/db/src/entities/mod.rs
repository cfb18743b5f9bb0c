//! Database entities.

#![allow(missing_docs)]

pub mod complaint;
pub mod question;
pub mod user;
pub mod variant;
pub mod vote_fact;
pub mod voting;
pub mod voting_like;

pub use complaint::Entity as Complaint;
pub use question::Entity as Question;
pub use user::Entity as User;
pub use variant::Entity as Variant;
pub use vote_fact::Entity as VoteFact;
pub use voting::Entity as Voting;
pub use voting_like::Entity as VotingLike;
