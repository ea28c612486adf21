use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier derived from the creation instant in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the absence is a medical incapacity or a granted permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveKind {
    #[default]
    #[serde(rename = "incapacidad")]
    Incapacity,
    #[serde(rename = "permiso")]
    Permission,
}

impl LeaveKind {
    /// Lower-case value stored in the records slot.
    pub const fn slot_value(self) -> &'static str {
        match self {
            LeaveKind::Incapacity => "incapacidad",
            LeaveKind::Permission => "permiso",
        }
    }

    /// Capitalized form shown in tables and exports.
    pub const fn label(self) -> &'static str {
        match self {
            LeaveKind::Incapacity => "Incapacidad",
            LeaveKind::Permission => "Permiso",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "incapacidad" | "incapacity" => Some(LeaveKind::Incapacity),
            "permiso" | "permission" => Some(LeaveKind::Permission),
            _ => None,
        }
    }
}

/// Unvalidated input as collected by the registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub employee_name: String,
    pub kind: LeaveKind,
    pub date: Option<NaiveDate>,
    pub justification: String,
}

/// A persisted incapacity or permission entry.
///
/// Fields are private: once created a record is only ever read or removed
/// as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    id: RecordId,
    #[serde(rename = "nombreEmpleado")]
    employee_name: String,
    #[serde(rename = "tipo")]
    kind: LeaveKind,
    #[serde(rename = "fecha")]
    date: NaiveDate,
    #[serde(rename = "justificacion")]
    justification: String,
    #[serde(rename = "fechaRegistro")]
    created_at: DateTime<Utc>,
}

impl LeaveRecord {
    pub(crate) fn new(
        id: RecordId,
        employee_name: String,
        kind: LeaveKind,
        date: NaiveDate,
        justification: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            employee_name,
            kind,
            date,
            justification,
            created_at,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn employee_name(&self) -> &str {
        &self.employee_name
    }

    pub fn kind(&self) -> LeaveKind {
        self.kind
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn justification(&self) -> &str {
        &self.justification
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Acting user's authorization level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

impl Role {
    /// Only the exact string `admin` grants the admin role.
    pub fn from_slot(value: &str) -> Self {
        if value == "admin" {
            Role::Admin
        } else {
            Role::Employee
        }
    }

    pub const fn slot_value(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }

    pub const fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot_value())
    }
}
