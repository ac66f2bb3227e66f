use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::persist::{PersistError, Persistence, decode_board, encode_board};
use super::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::model::board::Board;

/// Board state kept in a single JSON file.
///
/// Writes go through a temp file + rename so a crash mid-save never leaves
/// a half-written board behind. Data that can't be read or written is
/// copied into the recovery log next to the state file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    recovery_dir: Option<PathBuf>,
}

impl JsonFileStore {
    /// Store at `path`, logging recovery data in the same directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let recovery_dir = Some(
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        );
        JsonFileStore { path, recovery_dir }
    }

    /// Skip the recovery log entirely.
    pub fn without_recovery_log(mut self) -> Self {
        self.recovery_dir = None;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&self, entry: RecoveryEntry) {
        if let Some(dir) = &self.recovery_dir {
            log_recovery(dir, entry);
        }
    }
}

impl Persistence for JsonFileStore {
    fn load(&mut self) -> Result<Option<Board>, PersistError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PersistError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let text = match std::str::from_utf8(&bytes) {
            Ok(text) => text,
            Err(e) => {
                self.record(
                    RecoveryEntry::new(RecoveryCategory::Parse, "unreadable board state")
                        .field("Path", self.path.display())
                        .field("Error", e)
                        .body(String::from_utf8_lossy(&bytes)),
                );
                return Err(PersistError::Encoding {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(None);
        }

        match decode_board(text) {
            Ok(board) => Ok(Some(board)),
            Err(e) => {
                self.record(
                    RecoveryEntry::new(RecoveryCategory::Parse, "unreadable board state")
                        .field("Path", self.path.display())
                        .field("Error", &e)
                        .body(text),
                );
                Err(PersistError::Parse {
                    path: self.path.clone(),
                    source: e,
                })
            }
        }
    }

    fn save(&mut self, board: &Board) -> Result<(), PersistError> {
        let text = encode_board(board)?;
        atomic_write(&self.path, text.as_bytes()).map_err(|e| {
            self.record(
                RecoveryEntry::new(RecoveryCategory::Write, "board state not saved")
                    .field("Path", self.path.display())
                    .field("Error", &e)
                    .body(text.clone()),
            );
            PersistError::Io {
                path: self.path.clone(),
                source: e,
            }
        })
    }

    /// Copy the file as it is on disk into the recovery log. Falls back to
    /// the decoded board if the file can no longer be read.
    fn quarantine(&mut self, board: &Board, reason: &str) {
        let body = match fs::read(&self.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => encode_board(board).unwrap_or_else(|e| format!("{board:?}\n({e})")),
        };
        self.record(
            RecoveryEntry::new(RecoveryCategory::Parse, "malformed board state")
                .field("Path", self.path.display())
                .field("Error", reason)
                .body(body),
        );
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::recovery::read_recovery_entries;
    use crate::model::board::default_seed;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_none() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(tmp.path().join("board.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn blank_file_loads_none() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.json");
        fs::write(&path, "\n  \n").unwrap();
        assert!(JsonFileStore::new(&path).load().unwrap().is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonFileStore::new(tmp.path().join("board.json"));
        let board = default_seed();
        store.save(&board).unwrap();
        assert_eq!(store.load().unwrap(), Some(board));
    }

    #[test]
    fn corrupt_file_is_logged_for_recovery() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.json");
        fs::write(&path, "{\"columns\": [").unwrap();

        let mut store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(PersistError::Parse { .. })));

        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Parse);
        assert_eq!(entries[0].body, "{\"columns\": [");
    }

    #[test]
    fn non_utf8_file_is_logged_for_recovery() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.json");
        let mut raw = b"{\"columns\": [{\"id\": \"a\", \"name\": \"Caf".to_vec();
        raw.extend_from_slice(&[0xE9]);
        raw.extend_from_slice(b"\", \"cards\": []}]}");
        fs::write(&path, &raw).unwrap();

        let mut store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(PersistError::Encoding { .. })));

        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Parse);
        assert!(entries[0].body.contains("\"name\": \"Caf\u{FFFD}\""));
    }

    #[test]
    fn quarantine_copies_file_as_on_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.json");
        let board = default_seed();
        let text = encode_board(&board).unwrap();
        fs::write(&path, &text).unwrap();

        let mut store = JsonFileStore::new(&path);
        store.quarantine(&board, "duplicate card seed-1");
        store.quarantine(&board, "duplicate card seed-1");

        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "malformed board state");
        assert_eq!(entries[0].fields[1].1, "duplicate card seed-1");
        assert_eq!(entries[0].body, text);
    }

    #[test]
    fn reloading_same_corrupt_file_logs_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.json");
        fs::write(&path, "{ broken").unwrap();

        for _ in 0..5 {
            assert!(JsonFileStore::new(&path).load().is_err());
        }
        assert_eq!(read_recovery_entries(tmp.path(), None, None).len(), 1);
    }

    #[test]
    fn corrupt_file_without_recovery_log() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.json");
        fs::write(&path, "garbage").unwrap();

        let mut store = JsonFileStore::new(&path).without_recovery_log();
        assert!(store.load().is_err());
        assert!(read_recovery_entries(tmp.path(), None, None).is_empty());
    }

    #[test]
    fn failed_save_keeps_board_in_recovery_log() {
        let tmp = TempDir::new().unwrap();
        // The state file's directory doesn't exist, so the temp file can't be created
        let mut store = JsonFileStore::new(tmp.path().join("missing").join("board.json"));
        store.recovery_dir = Some(tmp.path().to_path_buf());

        assert!(matches!(store.save(&default_seed()), Err(PersistError::Io { .. })));
        let entries = read_recovery_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, RecoveryCategory::Write);
        assert!(entries[0].body.contains("\"seed-1\""));
    }

    #[test]
    fn test_atomic_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.txt");
        atomic_write(&path, b"hello world").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
        atomic_write(&path, b"goodbye").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "goodbye");
    }
}
