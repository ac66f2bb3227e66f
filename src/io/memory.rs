use super::persist::{PersistError, Persistence, decode_board, encode_board};
use crate::model::board::Board;
use std::path::PathBuf;

/// In-memory persistence slot.
///
/// Stores the same serialized text a file would hold, so loads go through
/// the real decoder. Useful for tests and for hosts that manage storage
/// themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Option<String>,
    saves: usize,
    fail_saves: bool,
    quarantined: Vec<(Board, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Prime the slot with raw text (possibly malformed).
    pub fn with_raw(text: impl Into<String>) -> Self {
        MemoryStore {
            slot: Some(text.into()),
            ..Default::default()
        }
    }

    /// Prime the slot with an already-serialized board.
    pub fn with_board(board: &Board) -> Result<Self, PersistError> {
        Ok(MemoryStore::with_raw(encode_board(board)?))
    }

    /// Make every subsequent save fail.
    pub fn fail_saves(mut self, fail: bool) -> Self {
        self.fail_saves = fail;
        self
    }

    pub fn contents(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Boards rejected at load, with the reason
    pub fn quarantined(&self) -> &[(Board, String)] {
        &self.quarantined
    }
}

impl Persistence for MemoryStore {
    fn load(&mut self) -> Result<Option<Board>, PersistError> {
        match &self.slot {
            None => Ok(None),
            Some(text) => decode_board(text).map(Some).map_err(|e| PersistError::Parse {
                path: PathBuf::from("<memory>"),
                source: e,
            }),
        }
    }

    fn save(&mut self, board: &Board) -> Result<(), PersistError> {
        if self.fail_saves {
            return Err(PersistError::Io {
                path: PathBuf::from("<memory>"),
                source: std::io::Error::other("saves disabled"),
            });
        }
        self.slot = Some(encode_board(board)?);
        self.saves += 1;
        Ok(())
    }

    fn quarantine(&mut self, board: &Board, reason: &str) {
        self.quarantined.push((board.clone(), reason.to_string()));
    }
}
