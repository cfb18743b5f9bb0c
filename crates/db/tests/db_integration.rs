//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `votings_test`)
//!   `TEST_DB_PASSWORD` (default: `votings_test`)
//!   `TEST_DB_NAME` (default: `votings_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::Set;
use votings_db::{
    entities::{complaint, question, user, variant, vote_fact, voting, voting_like},
    repositories::{
        ComplaintRepository, QuestionRepository, UserRepository, VoteFactRepository,
        VotingLikeRepository, VotingRepository,
    },
    test_utils::{TestDatabase, TestDbConfig},
};

fn new_user(id: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(id.to_string()),
        username_lower: Set(id.to_lowercase()),
        password_hash: Set("$argon2id$test".to_string()),
        token: Set(Some(format!("token-{id}"))),
        is_staff: Set(false),
        created_at: Set(Utc::now().into()),
    }
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(config.database_url().starts_with("postgres://"));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection_runs_migrations() {
    let db = TestDatabase::create_unique().await.expect("Failed to connect");
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_voting_lifecycle() {
    let test_db = TestDatabase::create_unique().await.expect("Failed to connect");
    let conn = Arc::new(
        sea_orm::Database::connect(&test_db.config.database_url())
            .await
            .expect("Failed to connect"),
    );

    let users = UserRepository::new(conn.clone());
    let votings = VotingRepository::new(conn.clone());
    let questions = QuestionRepository::new(conn.clone());
    let facts = VoteFactRepository::new(conn.clone());
    let likes = VotingLikeRepository::new(conn.clone());
    let complaints = ComplaintRepository::new(conn.clone());

    users.create(new_user("alice")).await.unwrap();
    users.create(new_user("bob")).await.unwrap();

    let colors = votings
        .create(voting::ActiveModel {
            id: Set("colors".to_string()),
            title: Set("Colors".to_string()),
            author_id: Set("alice".to_string()),
            created_at: Set(Utc::now().into()),
            blocked: Set(false),
            published: Set(false),
        })
        .await
        .unwrap();
    assert!(votings.find_active().await.unwrap().is_empty());

    questions
        .create(question::ActiveModel {
            id: Set("q1".to_string()),
            title: Set("Favorite?".to_string()),
            description: Set(String::new()),
            voting_id: Set(colors.id.clone()),
            question_type: Set(question::QuestionType::Single),
        })
        .await
        .unwrap();
    assert!(questions.exists_for_voting(&colors.id).await.unwrap());

    for (id, text) in [("red", "Red"), ("blue", "Blue")] {
        questions
            .create_variant(variant::ActiveModel {
                id: Set(id.to_string()),
                text: Set(text.to_string()),
                question_id: Set("q1".to_string()),
            })
            .await
            .unwrap();
    }

    let mut publish: voting::ActiveModel = colors.clone().into();
    publish.published = Set(true);
    votings.update(publish).await.unwrap();
    assert_eq!(votings.find_active().await.unwrap().len(), 1);

    facts
        .create_many(vec![vote_fact::ActiveModel {
            id: Set("f1".to_string()),
            user_id: Set(Some("bob".to_string())),
            variant_id: Set("red".to_string()),
            created_at: Set(Utc::now().into()),
        }])
        .await
        .unwrap();
    assert!(facts.has_voted_in_voting("bob", "colors").await.unwrap());
    assert!(!facts.has_voted_in_voting("alice", "colors").await.unwrap());
    let counts = facts
        .count_by_variants(&["red".to_string(), "blue".to_string()])
        .await
        .unwrap();
    assert_eq!(counts.get("red"), Some(&1));
    assert!(!counts.contains_key("blue"));
    assert_eq!(votings.find_voted_by_user("bob").await.unwrap().len(), 1);

    likes
        .create(voting_like::ActiveModel {
            id: Set("l1".to_string()),
            voting_id: Set("colors".to_string()),
            user_id: Set("bob".to_string()),
            active: Set(true),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();
    assert_eq!(likes.count_active("colors").await.unwrap(), 1);
    assert_eq!(votings.find_liked_by_user("bob").await.unwrap().len(), 1);

    let filed = complaints
        .create(complaint::ActiveModel {
            id: Set("c1".to_string()),
            user_id: Set("bob".to_string()),
            voting_id: Set("colors".to_string()),
            text: Set("spam".to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();
    assert_eq!(complaints.find_open().await.unwrap().len(), 1);

    let closed = complaints.deactivate_and_block(filed).await.unwrap();
    assert!(!closed.is_active);
    assert!(votings.get_by_id("colors").await.unwrap().blocked);
    assert!(votings.find_active().await.unwrap().is_empty());
    assert!(complaints.find_open().await.unwrap().is_empty());

    drop(conn);
    test_db.drop_database().await.unwrap();
}
