use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::{info, warn};

use super::domain::{LeaveRecord, RecordDraft, RecordId, Role};
use super::role::RoleContext;
use super::store::{RecordStore, StorageError};

/// Session-scoped owner of the record projection.
///
/// Every mutation is saved through the store before the projection changes,
/// so a failed write leaves the projection exactly as it was.
pub struct LeaveRecordService<S, C> {
    store: Arc<S>,
    roles: Arc<C>,
    records: Vec<LeaveRecord>,
}

impl<S, C> LeaveRecordService<S, C>
where
    S: RecordStore + 'static,
    C: RoleContext + 'static,
{
    /// Loads the persisted collection once for this session.
    pub fn new(store: Arc<S>, roles: Arc<C>) -> Self {
        let records = unique_by_id(store.load());
        info!(records = records.len(), "leave records loaded");
        Self {
            store,
            roles,
            records,
        }
    }

    /// Records in insertion order.
    pub fn list(&self) -> &[LeaveRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&LeaveRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn current_role(&self) -> Role {
        self.roles.current_role()
    }

    /// Validate and persist a new record stamped with the current instant.
    pub fn create(&mut self, draft: &RecordDraft) -> Result<LeaveRecord, RecordServiceError> {
        self.create_at(draft, Utc::now())
    }

    /// Same as [`create`](Self::create) with an explicit creation instant.
    pub fn create_at(
        &mut self,
        draft: &RecordDraft,
        now: DateTime<Utc>,
    ) -> Result<LeaveRecord, RecordServiceError> {
        let today = now.with_timezone(&Local).date_naive();
        let validated = validate(draft, today).inspect_err(|err| {
            warn!(error = %err, "leave record rejected");
        })?;

        let record = LeaveRecord::new(
            self.next_id(now),
            validated.employee_name,
            draft.kind,
            validated.date,
            validated.justification,
            now,
        );

        let mut updated = self.records.clone();
        updated.push(record.clone());
        self.commit(updated)?;

        info!(id = %record.id(), kind = record.kind().slot_value(), "leave record created");
        Ok(record)
    }

    /// Remove a record. Only an admin may delete.
    pub fn delete(&mut self, id: RecordId) -> Result<LeaveRecord, RecordServiceError> {
        let role = self.roles.current_role();
        if !role.is_admin() {
            warn!(%id, %role, "delete denied");
            return Err(RecordServiceError::Unauthorized { role });
        }

        let position = self
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or(RecordServiceError::NotFound(id))?;

        let mut updated = self.records.clone();
        let removed = updated.remove(position);
        self.commit(updated)?;

        info!(%id, "leave record deleted");
        Ok(removed)
    }

    fn commit(&mut self, updated: Vec<LeaveRecord>) -> Result<(), RecordServiceError> {
        if let Err(err) = self.store.save(&updated) {
            warn!(error = %err, "records slot write failed; projection unchanged");
            return Err(err.into());
        }
        self.records = updated;
        Ok(())
    }

    fn next_id(&self, now: DateTime<Utc>) -> RecordId {
        let stamp = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let floor = self
            .records
            .iter()
            .map(|record| record.id().0.saturating_add(1))
            .max()
            .unwrap_or(0);
        RecordId(stamp.max(floor))
    }
}

struct ValidatedDraft {
    employee_name: String,
    date: NaiveDate,
    justification: String,
}

fn validate(draft: &RecordDraft, today: NaiveDate) -> Result<ValidatedDraft, ValidationError> {
    let employee_name = draft.employee_name.trim();
    if employee_name.is_empty() {
        return Err(ValidationError::MissingEmployeeName);
    }

    let date = draft.date.ok_or(ValidationError::MissingDate)?;

    let justification = draft.justification.trim();
    if justification.is_empty() {
        return Err(ValidationError::MissingJustification);
    }

    if date > today {
        return Err(ValidationError::FutureDate { date, today });
    }

    Ok(ValidatedDraft {
        employee_name: employee_name.to_string(),
        date,
        justification: justification.to_string(),
    })
}

fn unique_by_id(records: Vec<LeaveRecord>) -> Vec<LeaveRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert(record.id());
            if !fresh {
                warn!(id = %record.id(), "duplicate record id in slot; keeping the first");
            }
            fresh
        })
        .collect()
}

/// Input problems the user must correct before resubmitting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("El nombre del empleado es obligatorio")]
    MissingEmployeeName,
    #[error("Debe seleccionar una fecha")]
    MissingDate,
    #[error("La justificación es obligatoria")]
    MissingJustification,
    #[error("La fecha {date} no puede ser posterior a hoy ({today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },
}

/// Error raised by the record service.
#[derive(Debug, thiserror::Error)]
pub enum RecordServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No tienes permisos para eliminar registros (rol actual: {role})")]
    Unauthorized { role: Role },
    #[error("El registro {0} no existe")]
    NotFound(RecordId),
    #[error("Error al guardar los registros: {0}")]
    Persistence(#[from] StorageError),
}
