//! Append-only record store.
//!
//! Records are appended to a JSONL (JSON Lines) file, one [`StoredRecord`] per
//! line, with file locking around every read and write. The store keeps its
//! file handle open for as long as it lives; dropping the store closes it.

use crate::{BmiRecord, Error, HistoryPoint, Result, StoredRecord};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Record sink trait for persisting measurements
pub trait RecordSink {
    /// Durably write one record and return the id assigned to it
    fn append(&mut self, record: &BmiRecord) -> Result<u64>;
}

/// JSONL-based record store with file locking
pub struct JsonlStore {
    path: PathBuf,
    file: File,
}

impl JsonlStore {
    /// Open the store at `path`, creating the file and its parent directory if needed.
    ///
    /// Never truncates, so calling this on every startup is safe.
    pub fn initialize(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Store(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::Store(format!("cannot open {}: {}", path.display(), e)))?;

        tracing::debug!("Opened record store at {:?}", path);
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// BMI history for `username`, oldest first.
    ///
    /// An unknown user yields an empty history, not an error.
    pub fn query_by_user(&self, username: &str) -> Result<Vec<HistoryPoint>> {
        let records = self.records_for_user(username)?;
        Ok(records.iter().map(HistoryPoint::from).collect())
    }

    /// Full rows for `username`, ordered by timestamp and then id
    pub fn records_for_user(&self, username: &str) -> Result<Vec<StoredRecord>> {
        let mut records: Vec<StoredRecord> = self
            .read_locked()?
            .into_iter()
            .filter(|r| r.record.username() == username)
            .collect();

        records.sort_by(|a, b| {
            a.record
                .timestamp()
                .cmp(&b.record.timestamp())
                .then(a.id.cmp(&b.id))
        });

        tracing::debug!("Found {} records for {:?}", records.len(), username);
        Ok(records)
    }

    /// Number of readable records across all users
    pub fn count(&self) -> Result<usize> {
        Ok(self.read_locked()?.len())
    }

    fn read_locked(&self) -> Result<Vec<StoredRecord>> {
        // Acquire shared lock for reading
        self.file.lock_shared()?;
        let result = read_records(&self.file);
        release(&self.file);
        result
    }

    fn append_locked(&self, record: &BmiRecord) -> Result<u64> {
        let id = read_records(&self.file)?
            .iter()
            .map(|r| r.id)
            .max()
            .unwrap_or(0)
            + 1;

        let stored = StoredRecord {
            id,
            record: record.clone(),
        };
        let line = serde_json::to_string(&stored)?;

        {
            let mut writer = BufWriter::new(&self.file);
            // A crash mid-write can leave a final line without its newline
            if ends_without_newline(&self.file)? {
                writer.write_all(b"\n")?;
            }
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        self.file.sync_data()?;
        Ok(id)
    }
}

impl RecordSink for JsonlStore {
    fn append(&mut self, record: &BmiRecord) -> Result<u64> {
        // Acquire exclusive lock
        self.file.lock_exclusive()?;
        let result = self.append_locked(record);
        release(&self.file);

        let id = result?;
        tracing::debug!("Appended record {} for {:?}", id, record.username());
        Ok(id)
    }
}

/// Read every parseable record from the start of the file.
///
/// Lines are split on raw bytes so a torn multibyte character only costs the
/// line it sits on. Malformed lines are logged and skipped.
fn read_records(mut file: &File) -> Result<Vec<StoredRecord>> {
    file.seek(SeekFrom::Start(0))?;

    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut buf = Vec::new();
    let mut line_num = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_num += 1;

        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<StoredRecord>(&buf) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse record at line {}: {}", line_num, e);
            }
        }
    }

    Ok(records)
}

/// Drop the file lock without masking an earlier error
fn release(file: &File) {
    if let Err(e) = file.unlock() {
        tracing::warn!("Failed to release store lock: {}", e);
    }
}

fn ends_without_newline(mut file: &File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn record(username: &str, weight: f64, d: u32) -> BmiRecord {
        BmiRecord::new(username, weight, 1.75, day(d))
    }

    #[test]
    fn test_append_and_query_single_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::initialize(temp_dir.path().join("records.jsonl")).unwrap();

        let written = record("alice", 70.0, 1);
        let id = store.append(&written).unwrap();
        assert_eq!(id, 1);

        let rows = store.records_for_user("alice").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record, written);
        assert_eq!(rows[0].record.category(), Category::Normal);

        let history = store.query_by_user("alice").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].bmi, written.bmi());
        assert_eq!(history[0].date_label(), "2024-01-01 08:00:00");
    }

    #[test]
    fn test_query_unknown_user_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::initialize(temp_dir.path().join("records.jsonl")).unwrap();
        store.append(&record("alice", 70.0, 1)).unwrap();

        assert!(store.query_by_user("nobody").unwrap().is_empty());
        assert!(store.query_by_user("Alice").unwrap().is_empty());
    }

    #[test]
    fn test_history_sorted_by_timestamp() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::initialize(temp_dir.path().join("records.jsonl")).unwrap();

        // Append out of chronological order
        store.append(&record("alice", 72.0, 5)).unwrap();
        store.append(&record("bob", 90.0, 2)).unwrap();
        store.append(&record("alice", 70.0, 1)).unwrap();
        store.append(&record("alice", 71.0, 3)).unwrap();

        let history = store.query_by_user("alice").unwrap();
        let dates: Vec<_> = history.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(1), day(3), day(5)]);
    }

    #[test]
    fn test_same_timestamp_ordered_by_id() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::initialize(temp_dir.path().join("records.jsonl")).unwrap();

        store.append(&record("alice", 80.0, 1)).unwrap();
        store.append(&record("alice", 60.0, 1)).unwrap();

        let rows = store.records_for_user("alice").unwrap();
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[1].id, 2);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("records.jsonl");

        {
            let mut store = JsonlStore::initialize(&path).unwrap();
            store.append(&record("alice", 70.0, 1)).unwrap();
        }
        let before = std::fs::read_to_string(&path).unwrap();

        let first = JsonlStore::initialize(&path).unwrap();
        let second = JsonlStore::initialize(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        assert_eq!(first.count().unwrap(), 1);
        assert_eq!(second.count().unwrap(), 1);
    }

    #[test]
    fn test_ids_continue_after_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.jsonl");

        {
            let mut store = JsonlStore::initialize(&path).unwrap();
            store.append(&record("alice", 70.0, 1)).unwrap();
            store.append(&record("alice", 71.0, 2)).unwrap();
        }

        let mut store = JsonlStore::initialize(&path).unwrap();
        assert_eq!(store.append(&record("alice", 72.0, 3)).unwrap(), 3);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.jsonl");

        {
            let mut store = JsonlStore::initialize(&path).unwrap();
            store.append(&record("alice", 70.0, 1)).unwrap();
        }
        let mut contents = std::fs::read_to_string(&path).unwrap();
        contents.push_str("{ invalid json }\n\n");
        std::fs::write(&path, contents).unwrap();

        let mut store = JsonlStore::initialize(&path).unwrap();
        assert_eq!(store.query_by_user("alice").unwrap().len(), 1);
        assert_eq!(store.append(&record("alice", 71.0, 2)).unwrap(), 2);
        assert_eq!(store.query_by_user("alice").unwrap().len(), 2);
    }

    #[test]
    fn test_partial_last_line_does_not_swallow_next_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.jsonl");
        std::fs::write(&path, r#"{"id":1,"username":"ali"#).unwrap();

        let mut store = JsonlStore::initialize(&path).unwrap();
        store.append(&record("alice", 70.0, 1)).unwrap();

        let history = store.query_by_user("alice").unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_torn_multibyte_line_is_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.jsonl");

        let mut store = JsonlStore::initialize(&path).unwrap();
        store.append(&record("josé", 70.0, 1)).unwrap();

        // Cut off halfway through the two bytes of "é"
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"id\":2,\"username\":\"jos\xc3").unwrap();
        drop(file);

        assert_eq!(store.query_by_user("josé").unwrap().len(), 1);

        let id = store.append(&record("josé", 68.0, 2)).unwrap();
        assert_eq!(id, 2);

        let history = store.query_by_user("josé").unwrap();
        assert_eq!(history.len(), 2);
        assert!((history[1].bmi - 68.0 / (1.75 * 1.75)).abs() < 1e-9);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_lock_released_after_read_and_append() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("records.jsonl");
        let mut store = JsonlStore::initialize(&path).unwrap();
        let other = OpenOptions::new().read(true).open(&path).unwrap();

        store.append(&record("alice", 70.0, 1)).unwrap();
        other.try_lock_exclusive().unwrap();
        other.unlock().unwrap();

        store.query_by_user("alice").unwrap();
        other.try_lock_exclusive().unwrap();
        other.unlock().unwrap();
    }

    #[test]
    fn test_initialize_fails_on_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = JsonlStore::initialize(temp_dir.path());
        assert!(matches!(result, Err(Error::Store(_))));
    }
}
