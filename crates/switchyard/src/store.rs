//! File-backed persistence for the CLI.
//!
//! Each invocation is a new process, so cached device sessions, permission
//! maps, the activity log and usage counters live under the data directory:
//!
//! ```text
//! <data_dir>/sessions/<user>/<device>.json
//! <data_dir>/permissions/<user>.json
//! <data_dir>/activity.jsonl
//! <data_dir>/counters.json
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};

use switchyard_core::{
    ActivityLog, CoreError, CounterValue, LogEntry, LogFilter, SessionKey, SessionStore,
};

fn io_error(context: &str, path: &Path, err: &io::Error) -> CoreError {
    CoreError::Internal(format!("{context} {}: {err}", path.display()))
}

/// Keep user names usable as file names. A leading dot is escaped so no
/// name maps to `.`, `..` or a hidden file.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let keep =
                c.is_ascii_alphanumeric() || matches!(c, '-' | '_') || (c == '.' && i > 0);
            if keep { c } else { '_' }
        })
        .collect();
    if stem.is_empty() { "_".into() } else { stem }
}

/// Read a file, treating a missing file as `None`.
fn read_optional(path: &Path) -> Result<Option<String>, CoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error("cannot read", path, &e)),
    }
}

/// Write through a temporary file so readers never see half a blob.
fn write_atomic(path: &Path, contents: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("cannot create", parent, &e))?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).map_err(|e| io_error("cannot write", &tmp, &e))?;
    fs::rename(&tmp, path).map_err(|e| io_error("cannot replace", path, &e))
}

fn remove_optional(path: &Path) -> Result<(), CoreError> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(io_error("cannot remove", path, &e)),
        _ => Ok(()),
    }
}

// ── Sessions ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            root: data_dir.to_path_buf(),
        }
    }

    fn user_dir(&self, user: &str) -> PathBuf {
        self.root.join("sessions").join(file_stem(user))
    }

    fn session_path(&self, key: &SessionKey) -> PathBuf {
        self.user_dir(&key.user)
            .join(format!("{}.json", key.device_id))
    }

    fn permissions_path(&self, user: &str) -> PathBuf {
        self.root
            .join("permissions")
            .join(format!("{}.json", file_stem(user)))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, key: &SessionKey) -> Result<Option<String>, CoreError> {
        read_optional(&self.session_path(key))
    }

    fn store(&self, key: &SessionKey, blob: String) -> Result<(), CoreError> {
        write_atomic(&self.session_path(key), &blob)
    }

    fn remove(&self, key: &SessionKey) -> Result<(), CoreError> {
        remove_optional(&self.session_path(key))
    }

    fn remove_user(&self, user: &str) -> Result<(), CoreError> {
        let dir = self.user_dir(user);
        match fs::remove_dir_all(&dir) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                return Err(io_error("cannot remove", &dir, &e));
            }
            _ => {}
        }
        debug!(user, "cached sessions removed");
        remove_optional(&self.permissions_path(user))
    }

    fn load_permissions(&self, user: &str) -> Result<Option<String>, CoreError> {
        read_optional(&self.permissions_path(user))
    }

    fn store_permissions(&self, user: &str, blob: String) -> Result<(), CoreError> {
        write_atomic(&self.permissions_path(user), &blob)
    }
}

// ── Activity log ─────────────────────────────────────────────────────

/// Append-only JSON lines file.
#[derive(Debug)]
pub struct FileActivityLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileActivityLog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("activity.jsonl"),
            lock: Mutex::new(()),
        }
    }
}

impl ActivityLog for FileActivityLog {
    fn append(&self, entry: LogEntry) -> Result<(), CoreError> {
        let line = serde_json::to_string(&entry)
            .map_err(|e| CoreError::Internal(format!("cannot encode log entry: {e}")))?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error("cannot create", parent, &e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_error("cannot open", &self.path, &e))?;
        writeln!(file, "{line}").map_err(|e| io_error("cannot append to", &self.path, &e))
    }

    fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>, CoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("cannot open", &self.path, &e)),
        };

        let mut entries = Vec::new();
        for (number, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| io_error("cannot read", &self.path, &e))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEntry>(&line) {
                Ok(entry) if filter.matches(&entry) => entries.push(entry),
                Ok(_) => {}
                Err(e) => warn!(line = number + 1, error = %e, "skipping unreadable log line"),
            }
        }

        entries.reverse();
        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}

// ── Counters ─────────────────────────────────────────────────────────

pub fn counters_path(data_dir: &Path) -> PathBuf {
    data_dir.join("counters.json")
}

/// Counter totals saved by earlier runs; unreadable files count as empty.
pub fn load_counters(path: &Path) -> Vec<CounterValue> {
    match read_optional(path) {
        Ok(Some(text)) => serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unreadable counters");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "ignoring counters");
            Vec::new()
        }
    }
}

pub fn save_counters(path: &Path, values: &[CounterValue]) -> Result<(), CoreError> {
    let text = serde_json::to_string_pretty(values)
        .map_err(|e| CoreError::Internal(format!("cannot encode counters: {e}")))?;
    write_atomic(path, &text)
}
