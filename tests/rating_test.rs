//! Integration tests for the rating engine
//!
//! Run with: cargo test --test rating_test

mod common;

use common::{make_event, make_user, now, test_db};
use pretty_assertions::assert_eq;
use yasami::config;
use yasami::core::rating::{list_unrated_co_participants, submit_rating};
use yasami::core::types::{Gender, TargetAudience};
use yasami::storage::db::get_connection;
use yasami::storage::events::insert_participant_guarded;
use yasami::storage::users::{adjust_rating, get_user_by_id};
use yasami::DomainError;

/// Прошедшее мероприятие с тремя участниками: оценщик и два со-участника.
fn seed_past_event(db: &common::TestDb) -> (i64, i64, i64, i64) {
    let creator = make_user(db, 1, 30, Gender::Male);
    let rater = make_user(db, 2, 25, Gender::Female);
    let peer_a = make_user(db, 3, 25, Gender::Male);
    let peer_b = make_user(db, 4, 25, Gender::Male);

    let event = make_event(
        db,
        creator.id,
        now() - chrono::Duration::days(1),
        None,
        TargetAudience::All,
        None,
        None,
    );

    let conn = get_connection(&db.pool).unwrap();
    for uid in [rater.id, peer_a.id, peer_b.id] {
        insert_participant_guarded(&conn, uid, event.id, now() - chrono::Duration::days(2))
            .unwrap();
    }

    (event.id, rater.id, peer_a.id, peer_b.id)
}

#[test]
fn test_invalid_score_writes_nothing() {
    let db = test_db();
    let (event_id, rater_id, peer_a, _) = seed_past_event(&db);

    let mut conn = get_connection(&db.pool).unwrap();
    for score in [0u8, 6] {
        let err = submit_rating(&mut conn, event_id, rater_id, peer_a, score, None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidScore(s) if s == score));
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM ratings", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);

    let rated = get_user_by_id(&conn, peer_a).unwrap().unwrap();
    assert_eq!(rated.rating, config::rating::DEFAULT_RATING);
}

#[test]
fn test_first_rating_applies_impact() {
    let db = test_db();
    let (event_id, rater_id, peer_a, _) = seed_past_event(&db);

    let mut conn = get_connection(&db.pool).unwrap();
    submit_rating(&mut conn, event_id, rater_id, peer_a, 5, None).unwrap();

    let rated = get_user_by_id(&conn, peer_a).unwrap().unwrap();
    assert_eq!(rated.rating, config::rating::DEFAULT_RATING + 10);
}

#[test]
fn test_resubmission_overwrites_and_nets_to_last_score() {
    let db = test_db();
    let (event_id, rater_id, peer_a, _) = seed_past_event(&db);

    let mut conn = get_connection(&db.pool).unwrap();
    submit_rating(&mut conn, event_id, rater_id, peer_a, 2, None).unwrap();
    submit_rating(&mut conn, event_id, rater_id, peer_a, 5, Some("передумал")).unwrap();

    // Одна строка с последним баллом
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM ratings", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);

    // Итог репутации как будто оценка сразу была 5
    let rated = get_user_by_id(&conn, peer_a).unwrap().unwrap();
    assert_eq!(rated.rating, config::rating::DEFAULT_RATING + 10);
}

#[test]
fn test_reputation_floors_at_zero() {
    let db = test_db();
    let (event_id, rater_id, peer_a, _) = seed_past_event(&db);

    let mut conn = get_connection(&db.pool).unwrap();
    // Опускаем репутацию почти до нуля, единица должна упереться в пол
    adjust_rating(&conn, peer_a, -(config::rating::DEFAULT_RATING - 3)).unwrap();
    submit_rating(&mut conn, event_id, rater_id, peer_a, 1, None).unwrap();

    let rated = get_user_by_id(&conn, peer_a).unwrap().unwrap();
    assert_eq!(rated.rating, 0);
}

#[test]
fn test_worklist_excludes_rater_and_shrinks_to_empty() {
    let db = test_db();
    let (event_id, rater_id, peer_a, peer_b) = seed_past_event(&db);

    let mut conn = get_connection(&db.pool).unwrap();

    let ids: Vec<i64> = list_unrated_co_participants(&conn, event_id, rater_id)
        .unwrap()
        .iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(ids, vec![peer_a, peer_b]);

    submit_rating(&mut conn, event_id, rater_id, peer_a, 4, None).unwrap();
    submit_rating(&mut conn, event_id, rater_id, peer_b, 3, None).unwrap();

    assert!(list_unrated_co_participants(&conn, event_id, rater_id)
        .unwrap()
        .is_empty());
}

#[test]
fn test_rating_unknown_user_fails() {
    let db = test_db();
    let (event_id, rater_id, _, _) = seed_past_event(&db);

    let mut conn = get_connection(&db.pool).unwrap();
    let err = submit_rating(&mut conn, event_id, rater_id, 999, 4, None).unwrap_err();
    assert!(matches!(err, DomainError::NotFound));
}
