use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::domain::LeaveRecord;

/// Durable home of the whole record collection.
///
/// `load` never fails: an absent or unreadable slot is an empty collection.
/// `save` replaces the slot in one step or not at all.
pub trait RecordStore: Send + Sync {
    fn load(&self) -> Vec<LeaveRecord>;
    fn save(&self, records: &[LeaveRecord]) -> Result<(), StorageError>;
}

/// Error raised when the slot could not be replaced.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not write records slot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not set aside damaged records slot as {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode records: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// What could be read back from a slot.
#[derive(Debug, Default)]
pub(crate) struct DecodedSlot {
    pub(crate) records: Vec<LeaveRecord>,
    /// Some or all of the slot could not be read as records.
    pub(crate) damaged: bool,
}

/// Keeps every entry that reads as a record; unreadable entries (or an
/// unreadable slot) are skipped with a warning and flag the slot as damaged.
pub(crate) fn decode_slot(raw: &[u8], slot: &str) -> DecodedSlot {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return DecodedSlot::default();
    }

    let entries = match serde_json::from_slice::<Option<Vec<serde_json::Value>>>(raw) {
        Ok(entries) => entries.unwrap_or_default(),
        Err(err) => {
            warn!(slot, error = %err, "records slot is malformed; starting with an empty collection");
            return DecodedSlot {
                records: Vec::new(),
                damaged: true,
            };
        }
    };

    let total = entries.len();
    let records: Vec<LeaveRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(slot, index, error = %err, "skipping unreadable entry in records slot");
                None
            }
        })
        .collect();

    DecodedSlot {
        damaged: records.len() != total,
        records,
    }
}

/// Records slot backed by a JSON file in the local data directory.
///
/// A slot that loaded with unreadable content is copied aside to
/// `<slot>.corrupt` before it is first replaced.
#[derive(Debug)]
pub struct JsonFileRecordStore {
    path: PathBuf,
    damaged: AtomicBool,
}

impl JsonFileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            damaged: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// First of `<slot>.corrupt`, `<slot>.corrupt.1`, ... that does not exist yet.
    fn backup_path(&self) -> PathBuf {
        let mut base = self.path.as_os_str().to_owned();
        base.push(".corrupt");
        let first = PathBuf::from(&base);
        if !first.exists() {
            return first;
        }
        (1..)
            .map(|n| {
                let mut candidate = base.clone();
                candidate.push(format!(".{n}"));
                PathBuf::from(candidate)
            })
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }

    fn set_aside_damaged_slot(&self) -> Result<(), StorageError> {
        if !self.damaged.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let backup = self.backup_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => {
                warn!(slot = %self.path.display(), backup = %backup.display(), "damaged records slot copied aside before replacing it");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => {
                self.damaged.store(true, Ordering::Release);
                Err(StorageError::Backup {
                    path: backup,
                    source,
                })
            }
        }
    }
}

impl RecordStore for JsonFileRecordStore {
    fn load(&self) -> Vec<LeaveRecord> {
        let slot = self.path.display().to_string();
        match fs::read(&self.path) {
            Ok(raw) => {
                let decoded = decode_slot(&raw, &slot);
                self.damaged.store(decoded.damaged, Ordering::Release);
                decoded.records
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(slot = %slot, "records slot not found; nothing persisted yet");
                Vec::new()
            }
            Err(err) => {
                warn!(slot = %slot, error = %err, "records slot unreadable; starting with an empty collection");
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[LeaveRecord]) -> Result<(), StorageError> {
        let payload = serde_json::to_vec(records)?;
        let directory = self.directory();
        fs::create_dir_all(directory).map_err(|err| self.io_error(err))?;
        self.set_aside_damaged_slot()?;

        // Same directory as the slot so the final rename stays on one filesystem.
        let mut staged = NamedTempFile::new_in(directory).map_err(|err| self.io_error(err))?;
        staged
            .write_all(&payload)
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|err| self.io_error(err))?;
        staged
            .persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;

        debug!(slot = %self.path.display(), records = records.len(), "records slot replaced");
        Ok(())
    }
}

/// In-process slot holding the serialized collection, for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    state: Mutex<MemorySlot>,
}

#[derive(Debug, Default)]
struct MemorySlot {
    raw: Option<Vec<u8>>,
    damaged: bool,
    set_aside: Option<Vec<u8>>,
    reject_writes: bool,
    writes: usize,
}

impl MemoryRecordStore {
    /// Seeds the slot with raw text, as if written by an earlier session.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(MemorySlot {
                raw: Some(raw.into().into_bytes()),
                ..MemorySlot::default()
            }),
        }
    }

    /// While set, every `save` fails the way an exceeded quota would.
    pub fn reject_writes(&self, reject: bool) {
        self.slot().reject_writes = reject;
    }

    /// Number of successful saves.
    pub fn writes(&self) -> usize {
        self.slot().writes
    }

    pub fn raw(&self) -> Option<String> {
        self.slot()
            .raw
            .as_ref()
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
    }

    /// Damaged content moved out of the slot by the first save after loading it.
    pub fn set_aside(&self) -> Option<String> {
        self.slot()
            .set_aside
            .as_ref()
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, MemorySlot> {
        // A poisoned slot still holds the last complete write.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self) -> Vec<LeaveRecord> {
        let mut slot = self.slot();
        let decoded = match &slot.raw {
            Some(raw) => decode_slot(raw, "memory"),
            None => DecodedSlot::default(),
        };
        slot.damaged = decoded.damaged;
        decoded.records
    }

    fn save(&self, records: &[LeaveRecord]) -> Result<(), StorageError> {
        let mut slot = self.slot();
        if slot.reject_writes {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        let payload = serde_json::to_vec(records)?;
        if slot.damaged {
            slot.set_aside = slot.raw.take();
            slot.damaged = false;
        }
        slot.raw = Some(payload);
        slot.writes += 1;
        Ok(())
    }
}
