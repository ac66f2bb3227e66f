use std::path::PathBuf;

use crate::model::board::Board;

/// Error type for board persistence
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse board state in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("board state in {path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        source: std::str::Utf8Error,
    },
    #[error("could not serialize board state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A durable slot holding one serialized board.
pub trait Persistence {
    /// Read the persisted board. `Ok(None)` means nothing has been saved yet.
    fn load(&mut self) -> Result<Option<Board>, PersistError>;

    /// Replace the persisted board.
    fn save(&mut self, board: &Board) -> Result<(), PersistError>;

    /// Set aside a board that loaded but was rejected as malformed, before
    /// the seed replaces it. The default keeps nothing.
    fn quarantine(&mut self, _board: &Board, _reason: &str) {}
}

/// Serialize a board in the persisted layout.
pub fn encode_board(board: &Board) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(board)
}

/// Parse a board from the persisted layout.
pub fn decode_board(text: &str) -> Result<Board, serde_json::Error> {
    serde_json::from_str(text)
}
