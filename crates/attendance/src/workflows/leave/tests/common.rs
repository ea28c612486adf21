use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::workflows::leave::domain::{LeaveKind, RecordDraft, Role};
use crate::workflows::leave::role::SessionRole;
use crate::workflows::leave::service::LeaveRecordService;
use crate::workflows::leave::store::MemoryRecordStore;

pub(super) type MemoryService = LeaveRecordService<MemoryRecordStore, SessionRole>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Mid-month, mid-day so local-date conversion stays on the same day.
pub(super) fn entry_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn draft(name: &str, kind: LeaveKind, on: NaiveDate, justification: &str) -> RecordDraft {
    RecordDraft {
        employee_name: name.to_string(),
        kind,
        date: Some(on),
        justification: justification.to_string(),
    }
}

pub(super) fn ana() -> RecordDraft {
    draft("Ana Pérez", LeaveKind::Incapacity, date(2024, 1, 10), "Gripe")
}

pub(super) fn luis() -> RecordDraft {
    draft("Luis Gómez", LeaveKind::Permission, date(2024, 1, 12), "Cita médica")
}

pub(super) struct Session {
    pub(super) store: Arc<MemoryRecordStore>,
    pub(super) roles: Arc<SessionRole>,
    pub(super) service: MemoryService,
}

pub(super) fn session(role: Role) -> Session {
    session_with_store(Arc::new(MemoryRecordStore::default()), role)
}

pub(super) fn session_with_store(store: Arc<MemoryRecordStore>, role: Role) -> Session {
    let roles = Arc::new(SessionRole::new(role));
    let service = LeaveRecordService::new(store.clone(), roles.clone());
    Session {
        store,
        roles,
        service,
    }
}
