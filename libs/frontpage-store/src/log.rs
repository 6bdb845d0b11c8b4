use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use frontpage_api::{FrontpageError, GenerationRecord};

// ════════════════════════════════════════════════════════════════
//  LogStore
// ════════════════════════════════════════════════════════════════

/// Append-only JSONL log of generation events.
#[derive(Clone, Debug)]
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `record` as one line and flush.
    pub fn append(&self, record: &GenerationRecord) -> Result<(), FrontpageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| FrontpageError::internal(format!("mkdir {}: {e}", parent.display())))?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| FrontpageError::internal(format!("open {}: {e}", self.path.display())))?;
        f.write_all(line.as_bytes())
            .and_then(|_| f.flush())
            .map_err(|e| FrontpageError::internal(format!("write {}: {e}", self.path.display())))
    }

    /// Up to `limit` records, most recent first. Unparseable lines are skipped.
    pub fn recent(&self, limit: usize) -> Result<Vec<GenerationRecord>, FrontpageError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let Some(reader) = self.open_reader()? else {
            return Ok(Vec::new());
        };

        let mut bucket = VecDeque::with_capacity(limit.min(1024));
        for (lineno, line) in reader.split(b'\n').enumerate() {
            let line = line
                .map_err(|e| FrontpageError::internal(format!("read {}: {e}", self.path.display())))?;
            let line = line.trim_ascii();
            if line.is_empty() {
                continue;
            }
            // from_slice also rejects lines that are not valid UTF-8
            match serde_json::from_slice::<GenerationRecord>(line) {
                Ok(record) => {
                    if bucket.len() == limit {
                        bucket.pop_front();
                    }
                    bucket.push_back(record);
                }
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), line = lineno + 1, error = %e, "skipping malformed log line");
                }
            }
        }

        Ok(bucket.into_iter().rev().collect())
    }

    /// Number of records ever appended (non-empty lines).
    pub fn count(&self) -> Result<usize, FrontpageError> {
        let Some(reader) = self.open_reader()? else {
            return Ok(0);
        };

        let mut count = 0;
        for line in reader.split(b'\n') {
            let line = line
                .map_err(|e| FrontpageError::internal(format!("read {}: {e}", self.path.display())))?;
            if !line.trim_ascii().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }

    fn open_reader(&self) -> Result<Option<std::io::BufReader<std::fs::File>>, FrontpageError> {
        match std::fs::File::open(&self.path) {
            Ok(f) => Ok(Some(std::io::BufReader::new(f))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FrontpageError::internal(format!(
                "open {}: {e}",
                self.path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(i: u32) -> GenerationRecord {
        GenerationRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, i).unwrap(),
            name: format!("student-{i}"),
            roll: format!("{i}"),
            registration: format!("REG{i}"),
            subject: "Operating Systems".into(),
            stream: "CSE".into(),
            semester: "5TH".into(),
        }
    }

    fn store() -> (tempfile::TempDir, LogStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::new(dir.path().join("logs").join("frontpage_logs.jsonl"));
        (dir, store)
    }

    #[test]
    fn missing_file_reads_empty() {
        let (_dir, store) = store();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.recent(10).unwrap().is_empty());
    }

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let (_dir, store) = store();
        for i in 0..5 {
            store.append(&record(i)).unwrap();
        }

        let names: Vec<String> = store.recent(3).unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["student-4", "student-3", "student-2"]);
        assert_eq!(store.recent(50).unwrap().len(), 5);
        assert!(store.recent(0).unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 5);
    }

    #[test]
    fn malformed_lines_are_skipped_but_counted() {
        let (_dir, store) = store();
        store.append(&record(1)).unwrap();
        let mut f = std::fs::OpenOptions::new().append(true).open(store.path()).unwrap();
        writeln!(f, "{{broken").unwrap();
        writeln!(f).unwrap();
        store.append(&record(2)).unwrap();

        let recent = store.recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0], record(2));
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn invalid_utf8_line_is_skipped_but_counted() {
        let (_dir, store) = store();
        store.append(&record(1)).unwrap();
        let mut f = std::fs::OpenOptions::new().append(true).open(store.path()).unwrap();
        f.write_all(b"\xff\xfe garbage\n").unwrap();
        store.append(&record(2)).unwrap();

        assert_eq!(store.count().unwrap(), 3);
        let recent = store.recent(10).unwrap();
        assert_eq!(recent, vec![record(2), record(1)]);
    }
}
