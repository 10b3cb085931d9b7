//! Integration tests for the registration ledger
//!
//! Run with: cargo test --test registration_test

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use common::{make_event, make_user, now, open_event, test_db};
use pretty_assertions::assert_eq;
use yasami::core::registration::{list_events_by_city, register_for_event, unregister_from_event};
use yasami::core::types::{Gender, TargetAudience};
use yasami::storage::db::get_connection;
use yasami::storage::events::participant_count;
use yasami::DomainError;

#[test]
fn test_register_and_unregister_cycle() {
    let db = test_db();
    let creator = make_user(&db, 1, 30, Gender::Male);
    let user = make_user(&db, 2, 25, Gender::Female);
    let event = open_event(&db, creator.id, Some(5));

    let mut conn = get_connection(&db.pool).unwrap();
    register_for_event(&mut conn, user.id, event.id, now()).unwrap();

    // Повторная регистрация отклоняется
    let err = register_for_event(&mut conn, user.id, event.id, now()).unwrap_err();
    assert!(matches!(err, DomainError::AlreadyRegistered));

    unregister_from_event(&mut conn, user.id, event.id).unwrap();

    // Отмена без регистрации отклоняется
    let err = unregister_from_event(&mut conn, user.id, event.id).unwrap_err();
    assert!(matches!(err, DomainError::NotRegistered));

    // Освободившееся место можно занять снова
    register_for_event(&mut conn, user.id, event.id, now()).unwrap();
    assert_eq!(participant_count(&conn, event.id).unwrap(), 1);
}

#[test]
fn test_unknown_event_and_user() {
    let db = test_db();
    let user = make_user(&db, 1, 25, Gender::Male);

    let mut conn = get_connection(&db.pool).unwrap();
    let err = register_for_event(&mut conn, user.id, 999, now()).unwrap_err();
    assert!(matches!(err, DomainError::NotFound));

    let creator = make_user(&db, 2, 30, Gender::Male);
    let event = open_event(&db, creator.id, None);
    let err = register_for_event(&mut conn, 999, event.id, now()).unwrap_err();
    assert!(matches!(err, DomainError::NotFound));
}

#[test]
fn test_creator_cannot_register_for_own_event() {
    let db = test_db();
    let creator = make_user(&db, 1, 30, Gender::Male);
    let event = open_event(&db, creator.id, None);

    let mut conn = get_connection(&db.pool).unwrap();
    let err = register_for_event(&mut conn, creator.id, event.id, now()).unwrap_err();
    assert!(matches!(err, DomainError::OwnEvent));
    assert_eq!(participant_count(&conn, event.id).unwrap(), 0);
}

#[test]
fn test_age_and_gender_eligibility() {
    let db = test_db();
    let creator = make_user(&db, 1, 30, Gender::Male);
    let event = make_event(
        &db,
        creator.id,
        now() + chrono::Duration::days(3),
        None,
        TargetAudience::Female,
        Some(18),
        Some(30),
    );

    let mut conn = get_connection(&db.pool).unwrap();

    let young = make_user(&db, 2, 16, Gender::Female);
    assert!(matches!(
        register_for_event(&mut conn, young.id, event.id, now()).unwrap_err(),
        DomainError::IneligibleAge {
            min_age: Some(18),
            max_age: None
        }
    ));

    let old = make_user(&db, 3, 45, Gender::Female);
    assert!(matches!(
        register_for_event(&mut conn, old.id, event.id, now()).unwrap_err(),
        DomainError::IneligibleAge {
            min_age: None,
            max_age: Some(30)
        }
    ));

    let man = make_user(&db, 4, 25, Gender::Male);
    assert!(matches!(
        register_for_event(&mut conn, man.id, event.id, now()).unwrap_err(),
        DomainError::IneligibleGender
    ));

    let woman = make_user(&db, 5, 25, Gender::Female);
    register_for_event(&mut conn, woman.id, event.id, now()).unwrap();
}

#[test]
fn test_capacity_is_enforced() {
    let db = test_db();
    let creator = make_user(&db, 1, 30, Gender::Male);
    let event = open_event(&db, creator.id, Some(2));

    let mut conn = get_connection(&db.pool).unwrap();
    let a = make_user(&db, 2, 25, Gender::Male);
    let b = make_user(&db, 3, 25, Gender::Female);
    let c = make_user(&db, 4, 25, Gender::Male);

    register_for_event(&mut conn, a.id, event.id, now()).unwrap();
    register_for_event(&mut conn, b.id, event.id, now()).unwrap();

    let err = register_for_event(&mut conn, c.id, event.id, now()).unwrap_err();
    assert!(matches!(err, DomainError::Full));
    assert_eq!(participant_count(&conn, event.id).unwrap(), 2);
}

#[test]
fn test_concurrent_race_for_last_slot_admits_exactly_one() {
    let db = test_db();
    let creator = make_user(&db, 1, 30, Gender::Male);
    let event = open_event(&db, creator.id, Some(1));

    let candidates: Vec<i64> = (0..4)
        .map(|i| make_user(&db, 100 + i, 25, Gender::Male).id)
        .collect();

    let successes = Arc::new(AtomicU32::new(0));
    let mut handles = Vec::new();

    for user_id in candidates {
        let pool = Arc::clone(&db.pool);
        let successes = Arc::clone(&successes);
        let event_id = event.id;
        handles.push(std::thread::spawn(move || {
            let mut conn = pool.get().unwrap();
            match register_for_event(&mut conn, user_id, event_id, now()) {
                Ok(()) => {
                    successes.fetch_add(1, Ordering::SeqCst);
                }
                Err(DomainError::Full) => {}
                Err(e) => panic!("unexpected error in race: {e}"),
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(successes.load(Ordering::SeqCst), 1);
    let conn = get_connection(&db.pool).unwrap();
    assert_eq!(participant_count(&conn, event.id).unwrap(), 1);
}

#[test]
fn test_city_catalog_filters_and_orders() {
    let db = test_db();
    let creator = make_user(&db, 1, 30, Gender::Male);

    let later = make_event(
        &db,
        creator.id,
        now() + chrono::Duration::days(5),
        None,
        TargetAudience::All,
        None,
        None,
    );
    let sooner = make_event(
        &db,
        creator.id,
        now() + chrono::Duration::days(1),
        None,
        TargetAudience::All,
        None,
        None,
    );
    // Прошедшее мероприятие не попадает в каталог
    make_event(
        &db,
        creator.id,
        now() - chrono::Duration::days(1),
        None,
        TargetAudience::All,
        None,
        None,
    );

    let conn = get_connection(&db.pool).unwrap();
    let catalog = list_events_by_city(&conn, "Москва", now()).unwrap();
    let ids: Vec<i64> = catalog.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);

    assert!(list_events_by_city(&conn, "Казань", now()).unwrap().is_empty());
}
