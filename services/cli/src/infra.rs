use attendance::config::StorageConfig;
use attendance::workflows::leave::{
    JsonFileRecordStore, LeaveKind, LeaveRecordService, RoleSlotWriter, SlotRoleContext,
};
use chrono::NaiveDate;
use std::sync::Arc;

pub(crate) type FileRecordService = LeaveRecordService<JsonFileRecordStore, SlotRoleContext>;

pub(crate) fn open_service(storage: &StorageConfig) -> FileRecordService {
    let store = Arc::new(JsonFileRecordStore::new(storage.records_slot()));
    let roles = Arc::new(role_context(storage));
    LeaveRecordService::new(store, roles)
}

pub(crate) fn role_context(storage: &StorageConfig) -> SlotRoleContext {
    SlotRoleContext::new(storage.role_slot())
}

pub(crate) fn role_writer(storage: &StorageConfig) -> RoleSlotWriter {
    RoleSlotWriter::new(storage.role_slot())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_kind(raw: &str) -> Result<LeaveKind, String> {
    LeaveKind::parse(raw).ok_or_else(|| format!("'{raw}' must be 'incapacidad' or 'permiso'"))
}
