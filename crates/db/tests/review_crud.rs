//! Integration tests for the `reviews` repository against a real database.

use reviewglobe_core::review::{ReviewDraft, ValidatedReview};
use reviewglobe_db::models::user::{CreateUser, User};
use reviewglobe_db::repositories::{ReviewRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, email: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        display_name: None,
    };
    UserRepo::create(pool, &input).await.unwrap()
}

fn review(text: &str, rating: i32, tags: &[&str]) -> ValidatedReview {
    ReviewDraft {
        text: text.to_string(),
        rating,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        location: Some("Austin".to_string()),
        ..Default::default()
    }
    .validate()
    .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_stamps_owner_and_timestamps(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;

    let created = ReviewRepo::create(&pool, Some(owner.id), &review("Great tacos", 5, &["Food"]))
        .await
        .unwrap();

    assert_eq!(created.text, "Great tacos");
    assert_eq!(created.rating, 5);
    assert_eq!(created.tags, vec!["food"]);
    assert_eq!(created.location.as_deref(), Some("Austin"));
    assert_eq!(created.owner_id, Some(owner.id));
    assert_eq!(created.created_at, created.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_returns_newest_first(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let first = ReviewRepo::create(&pool, Some(owner.id), &review("First", 3, &[]))
        .await
        .unwrap();
    let second = ReviewRepo::create(&pool, Some(owner.id), &review("Second", 4, &[]))
        .await
        .unwrap();

    let ids: Vec<i64> = ReviewRepo::list(&pool)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();

    assert_eq!(ids, vec![second.id, first.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_by_owner_refreshes_updated_at(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let created = ReviewRepo::create(&pool, Some(owner.id), &review("Okay", 2, &["meh"]))
        .await
        .unwrap();

    let updated = ReviewRepo::update(&pool, created.id, owner.id, &review("Better", 4, &["nice"]))
        .await
        .unwrap()
        .expect("owner update should match the row");

    assert_eq!(updated.text, "Better");
    assert_eq!(updated.rating, 4);
    assert_eq!(updated.tags, vec!["nice"]);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_by_other_user_matches_nothing(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let other = create_user(&pool, "other@test.com").await;
    let created = ReviewRepo::create(&pool, Some(owner.id), &review("Mine", 5, &[]))
        .await
        .unwrap();

    let result = ReviewRepo::update(&pool, created.id, other.id, &review("Stolen", 1, &[]))
        .await
        .unwrap();
    assert!(result.is_none());

    let unchanged = ReviewRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(unchanged.text, "Mine");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_is_owner_scoped(pool: PgPool) {
    let owner = create_user(&pool, "owner@test.com").await;
    let other = create_user(&pool, "other@test.com").await;
    let created = ReviewRepo::create(&pool, Some(owner.id), &review("Mine", 5, &[]))
        .await
        .unwrap();

    assert!(!ReviewRepo::delete(&pool, created.id, other.id).await.unwrap());
    assert!(ReviewRepo::delete(&pool, created.id, owner.id).await.unwrap());
    assert!(ReviewRepo::find_by_id(&pool, created.id).await.unwrap().is_none());

    let remaining = ReviewRepo::list(&pool).await.unwrap();
    assert!(remaining.iter().all(|r| r.id != created.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rating_out_of_range_violates_check_constraint(pool: PgPool) {
    let result = sqlx::query("INSERT INTO reviews (text, rating) VALUES ('x', 0)")
        .execute(&pool)
        .await;
    assert!(result.is_err(), "rating 0 must be rejected by the database");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_violates_unique_constraint(pool: PgPool) {
    create_user(&pool, "dup@test.com").await;
    let input = CreateUser {
        email: "dup@test.com".to_string(),
        password_hash: "x".to_string(),
        display_name: None,
    };
    let err = UserRepo::create(&pool, &input).await.unwrap_err();
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_users_email"));
        }
        other => panic!("expected a database error, got {other:?}"),
    }
}
