use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use super::domain::Role;

/// Read-only view of who is acting in the current session.
///
/// Implementations are consulted on every privileged call; the answer may
/// change between calls.
pub trait RoleContext: Send + Sync {
    fn current_role(&self) -> Role;
}

/// Resolves the role from the role slot file written at login.
#[derive(Debug, Clone)]
pub struct SlotRoleContext {
    path: PathBuf,
}

impl SlotRoleContext {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RoleContext for SlotRoleContext {
    fn current_role(&self) -> Role {
        match fs::read_to_string(&self.path) {
            Ok(value) => Role::from_slot(&value),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(slot = %self.path.display(), "no role slot; acting as employee");
                Role::Employee
            }
            Err(err) => {
                warn!(slot = %self.path.display(), error = %err, "role slot unreadable; acting as employee");
                Role::Employee
            }
        }
    }
}

/// Role held in memory for the lifetime of a session.
///
/// The login collaborator owns the value and may switch it; the record
/// service only ever reads it through [`RoleContext`].
#[derive(Debug, Default)]
pub struct SessionRole {
    role: RwLock<Role>,
}

impl SessionRole {
    pub fn new(role: Role) -> Self {
        Self {
            role: RwLock::new(role),
        }
    }

    pub fn switch_to(&self, role: Role) {
        let mut guard = self
            .role
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = role;
    }
}

impl RoleContext for SessionRole {
    fn current_role(&self) -> Role {
        *self
            .role
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Writes the role slot on behalf of the login screen.
#[derive(Debug, Clone)]
pub struct RoleSlotWriter {
    path: PathBuf,
}

impl RoleSlotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn write(&self, role: Role) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, role.slot_value())
    }
}
