//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `polls_test`)
//!   `TEST_DB_PASSWORD` (default: `polls_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use polls_common::AppError;
use polls_db::{
    entities::{Choice, Voter, choice, question, user},
    repositories::{ChoiceRepository, QuestionRepository, VoterRepository},
    test_utils::{TestDatabase, TestDbConfig},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, Database, EntityTrait, QueryFilter, Set};

async fn seed_user(db: &TestDatabase, id: &str) -> user::Model {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(id.to_string()),
        username_lower: Set(id.to_lowercase()),
        password: Set("unused".to_string()),
        token: Set(None),
        is_admin: Set(false),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
    .insert(db.connection())
    .await
    .expect("insert user")
}

async fn seed_question(db: &TestDatabase, text: &str, days: i64, choices: usize) -> i32 {
    let question = QuestionRepository::create_in(
        db.connection(),
        question::ActiveModel {
            question_text: Set(text.to_string()),
            pub_date: Set((Utc::now() + Duration::days(days)).into()),
            ..Default::default()
        },
    )
    .await
    .expect("insert question");

    let models = (0..choices)
        .map(|i| choice::ActiveModel {
            question_id: Set(question.id),
            choice_text: Set(format!("choice {i}")),
            votes: Set(0),
            percentage: Set(0),
            ..Default::default()
        })
        .collect();
    ChoiceRepository::create_many_in(db.connection(), models)
        .await
        .expect("insert choices");

    question.id
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_receipt_is_unique_per_user_and_question() {
    let db = TestDatabase::create_unique().await.expect("create database");
    seed_user(&db, "voter1").await;
    let question_id = seed_question(&db, "Unique?", -1, 2).await;

    VoterRepository::insert_in(db.connection(), "voter1", question_id)
        .await
        .unwrap();
    let second = VoterRepository::insert_in(db.connection(), "voter1", question_id).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    db.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_increment_votes_accumulates() {
    let db = TestDatabase::create_unique().await.expect("create database");
    let question_id = seed_question(&db, "Count?", -1, 2).await;
    let choices = ChoiceRepository::find_by_question_in(db.connection(), question_id)
        .await
        .unwrap();

    for _ in 0..3 {
        ChoiceRepository::increment_votes_in(db.connection(), choices[0].id)
            .await
            .unwrap();
    }

    let refreshed = ChoiceRepository::find_by_question_in(db.connection(), question_id)
        .await
        .unwrap();
    assert_eq!(refreshed[0].votes, 3);
    assert_eq!(refreshed[1].votes, 0);

    db.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_find_presentable_filters_and_orders() {
    let db = TestDatabase::create_unique().await.expect("create database");
    let older = seed_question(&db, "Older", -30, 2).await;
    let newer = seed_question(&db, "Newer", -5, 3).await;
    seed_question(&db, "Future", 30, 2).await;
    seed_question(&db, "Single choice", -2, 1).await;
    seed_question(&db, "No choices", -3, 0).await;

    let repo = QuestionRepository::new(Arc::new(
        Database::connect(&db.config.database_url())
            .await
            .expect("connect to test database"),
    ));
    let ids: Vec<i32> = repo
        .find_presentable(Utc::now(), 2, 5)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.id)
        .collect();
    assert_eq!(ids, vec![newer, older]);

    db.teardown().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_question_cascades() {
    let db = TestDatabase::create_unique().await.expect("create database");
    seed_user(&db, "voter1").await;
    let question_id = seed_question(&db, "Cascade?", -1, 2).await;
    VoterRepository::insert_in(db.connection(), "voter1", question_id)
        .await
        .unwrap();

    let repo = QuestionRepository::new(Arc::new(
        Database::connect(&db.config.database_url())
            .await
            .expect("connect to test database"),
    ));
    repo.delete(question_id).await.unwrap();

    let choices = Choice::find()
        .filter(choice::Column::QuestionId.eq(question_id))
        .all(db.connection())
        .await
        .unwrap();
    assert!(choices.is_empty());

    let receipts = Voter::find().all(db.connection()).await.unwrap();
    assert!(receipts.is_empty());

    db.teardown().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.ends_with("/postgres"));
}
