//! Incapacity and permission records: validation, role-gated removal,
//! write-through persistence, and tabular export.

pub mod domain;
pub mod export;
pub mod role;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{LeaveKind, LeaveRecord, RecordDraft, RecordId, Role};
pub use export::{export, ExportDocument, ExportError, ExportRow};
pub use role::{RoleContext, RoleSlotWriter, SessionRole, SlotRoleContext};
pub use service::{LeaveRecordService, RecordServiceError, ValidationError};
pub use store::{JsonFileRecordStore, MemoryRecordStore, RecordStore, StorageError};
