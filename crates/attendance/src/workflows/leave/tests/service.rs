use std::sync::Arc;

use chrono::{Duration, Local};

use super::common::*;
use crate::workflows::leave::domain::{LeaveKind, RecordDraft, RecordId, Role};
use crate::workflows::leave::service::{LeaveRecordService, RecordServiceError, ValidationError};
use crate::workflows::leave::store::{MemoryRecordStore, RecordStore, StorageError};

#[test]
fn create_trims_fields_and_persists_the_collection() {
    let mut session = session(Role::Employee);
    let input = draft(
        "  Ana Pérez ",
        LeaveKind::Incapacity,
        date(2024, 1, 10),
        "\tGripe  ",
    );

    let record = session
        .service
        .create_at(&input, entry_instant())
        .expect("valid draft");

    assert_eq!(record.employee_name(), "Ana Pérez");
    assert_eq!(record.justification(), "Gripe");
    assert_eq!(record.kind(), LeaveKind::Incapacity);
    assert_eq!(record.date(), date(2024, 1, 10));
    assert_eq!(record.created_at(), entry_instant());
    assert_eq!(record.id(), RecordId(entry_instant().timestamp_millis() as u64));

    assert_eq!(session.service.list(), std::slice::from_ref(&record));
    assert_eq!(session.store.load(), vec![record]);
    assert_eq!(input.employee_name, "  Ana Pérez ", "caller keeps its input");
}

#[test]
fn ids_stay_unique_within_the_same_millisecond() {
    let mut session = session(Role::Employee);
    let first = session
        .service
        .create_at(&ana(), entry_instant())
        .expect("first");
    let second = session
        .service
        .create_at(&luis(), entry_instant())
        .expect("second");
    let earlier = session
        .service
        .create_at(&ana(), entry_instant() - Duration::seconds(5))
        .expect("clock went backwards");

    assert_eq!(second.id(), RecordId(first.id().0 + 1));
    assert_eq!(earlier.id(), RecordId(second.id().0 + 1));
}

#[test]
fn validation_runs_in_field_order() {
    let mut session = session(Role::Employee);
    let blank = RecordDraft {
        employee_name: "   ".to_string(),
        kind: LeaveKind::Permission,
        date: None,
        justification: String::new(),
    };

    let cases = [
        (blank.clone(), ValidationError::MissingEmployeeName),
        (
            RecordDraft {
                employee_name: "Ana".to_string(),
                ..blank.clone()
            },
            ValidationError::MissingDate,
        ),
        (
            RecordDraft {
                employee_name: "Ana".to_string(),
                date: Some(date(2024, 1, 10)),
                justification: " \n ".to_string(),
                ..blank
            },
            ValidationError::MissingJustification,
        ),
    ];

    for (input, expected) in cases {
        match session.service.create_at(&input, entry_instant()) {
            Err(RecordServiceError::Validation(err)) => assert_eq!(err, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }
    assert!(session.service.list().is_empty());
    assert_eq!(session.store.writes(), 0);
}

#[test]
fn future_dates_are_rejected() {
    let mut session = session(Role::Employee);
    let input = draft("Ana Pérez", LeaveKind::Incapacity, date(2024, 1, 20), "Gripe");

    match session.service.create_at(&input, entry_instant()) {
        Err(RecordServiceError::Validation(ValidationError::FutureDate { date: rejected, .. })) => {
            assert_eq!(rejected, date(2024, 1, 20));
        }
        other => panic!("expected future date rejection, got {other:?}"),
    }
    assert!(session.service.list().is_empty());
}

#[test]
fn entry_day_itself_is_accepted() {
    let mut session = session(Role::Employee);
    let today = entry_instant().with_timezone(&Local).date_naive();

    let same_day = draft("Ana Pérez", LeaveKind::Incapacity, today, "Gripe");
    let created = session
        .service
        .create_at(&same_day, entry_instant())
        .expect("today is not in the future");
    assert_eq!(created.date(), today);

    let tomorrow = today + Duration::days(1);
    let next_day = draft("Ana Pérez", LeaveKind::Incapacity, tomorrow, "Gripe");
    match session.service.create_at(&next_day, entry_instant()) {
        Err(RecordServiceError::Validation(ValidationError::FutureDate { date: rejected, .. })) => {
            assert_eq!(rejected, tomorrow);
        }
        other => panic!("expected future date rejection, got {other:?}"),
    }
    assert_eq!(session.service.list(), std::slice::from_ref(&created));
}

#[test]
fn failed_save_leaves_no_ghost_record() {
    let mut session = session(Role::Admin);
    let kept = session
        .service
        .create_at(&ana(), entry_instant())
        .expect("first save succeeds");

    session.store.reject_writes(true);
    match session.service.create_at(&luis(), entry_instant()) {
        Err(RecordServiceError::Persistence(StorageError::Unavailable(_))) => {}
        other => panic!("expected persistence error, got {other:?}"),
    }

    assert_eq!(session.service.list(), std::slice::from_ref(&kept));
    assert_eq!(session.store.load(), vec![kept]);
}

#[test]
fn failed_save_rolls_back_delete() {
    let mut session = session(Role::Admin);
    let record = session
        .service
        .create_at(&ana(), entry_instant())
        .expect("created");

    session.store.reject_writes(true);
    assert!(matches!(
        session.service.delete(record.id()),
        Err(RecordServiceError::Persistence(_))
    ));
    assert_eq!(session.service.list(), std::slice::from_ref(&record));

    session.store.reject_writes(false);
    let removed = session.service.delete(record.id()).expect("retry succeeds");
    assert_eq!(removed, record);
    assert!(session.service.list().is_empty());
    assert!(session.store.load().is_empty());
}

#[test]
fn employees_cannot_delete() {
    let mut session = session(Role::Employee);
    let record = session
        .service
        .create_at(&ana(), entry_instant())
        .expect("created");
    let writes = session.store.writes();

    match session.service.delete(record.id()) {
        Err(RecordServiceError::Unauthorized { role }) => assert_eq!(role, Role::Employee),
        other => panic!("expected authorization error, got {other:?}"),
    }
    assert_eq!(session.service.list().len(), 1);
    assert_eq!(session.store.writes(), writes);
}

#[test]
fn role_is_checked_on_every_delete() {
    let mut session = session(Role::Admin);
    let first = session
        .service
        .create_at(&ana(), entry_instant())
        .expect("created");
    let second = session
        .service
        .create_at(&luis(), entry_instant())
        .expect("created");

    session.service.delete(first.id()).expect("admin deletes");

    session.roles.switch_to(Role::Employee);
    assert!(matches!(
        session.service.delete(second.id()),
        Err(RecordServiceError::Unauthorized { .. })
    ));
    assert_eq!(session.service.list(), std::slice::from_ref(&second));
}

#[test]
fn delete_of_unknown_id_is_not_found() {
    let mut session = session(Role::Admin);
    session
        .service
        .create_at(&ana(), entry_instant())
        .expect("created");

    match session.service.delete(RecordId(42)) {
        Err(RecordServiceError::NotFound(id)) => assert_eq!(id, RecordId(42)),
        other => panic!("expected not found, got {other:?}"),
    }
    assert_eq!(session.service.list().len(), 1);
}

#[test]
fn removal_keeps_survivor_order() {
    let mut session = session(Role::Admin);
    let ids: Vec<_> = (0..4)
        .map(|offset| {
            session
                .service
                .create_at(&ana(), entry_instant() + Duration::milliseconds(offset))
                .expect("created")
                .id()
        })
        .collect();

    session.service.delete(ids[1]).expect("deleted");

    let remaining: Vec<_> = session.service.list().iter().map(|r| r.id()).collect();
    assert_eq!(remaining, vec![ids[0], ids[2], ids[3]]);
}

#[test]
fn new_session_sees_persisted_records_and_list_is_stable() {
    let store = Arc::new(MemoryRecordStore::default());
    let mut first = session_with_store(store.clone(), Role::Employee);
    let a = first
        .service
        .create_at(&ana(), entry_instant())
        .expect("created");
    let b = first
        .service
        .create_at(&luis(), entry_instant())
        .expect("created");

    let second = session_with_store(store, Role::Employee);
    assert_eq!(second.service.list(), [a, b].as_slice());
    assert_eq!(second.service.list(), second.service.list());
    assert_eq!(second.service.current_role(), Role::Employee);
}

#[test]
fn duplicate_ids_in_slot_keep_the_first_entry() {
    let raw = r#"[
        {"id":7,"nombreEmpleado":"Ana","tipo":"incapacidad","fecha":"2024-01-10","justificacion":"Gripe","fechaRegistro":"2024-01-10T15:00:00.000Z"},
        {"id":7,"nombreEmpleado":"Luis","tipo":"permiso","fecha":"2024-01-11","justificacion":"Cita","fechaRegistro":"2024-01-11T15:00:00.000Z"}
    ]"#;
    let store = Arc::new(MemoryRecordStore::with_raw(raw));
    let roles = Arc::new(crate::workflows::leave::role::SessionRole::new(Role::Admin));
    let service = LeaveRecordService::new(store, roles);

    assert_eq!(service.list().len(), 1);
    assert_eq!(service.list()[0].employee_name(), "Ana");
    assert!(service.get(RecordId(7)).is_some());
}
