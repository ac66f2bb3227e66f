use serde::{Deserialize, Serialize};

use super::board::{Board, default_seed};

/// Configuration from dealboard.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub board: StorageConfig,
    #[serde(default)]
    pub drop: DropConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    /// Seed columns used when no board state exists yet.
    /// If empty, the built-in demo board is used.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Board state file, relative to the board directory
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            state_file: default_state_file(),
        }
    }
}

fn default_state_file() -> String {
    "board.json".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropConfig {
    /// Approximate rendered card height including margin
    #[serde(default = "default_card_height")]
    pub card_height: f64,
    /// Padding above the first card in a column's list
    #[serde(default = "default_container_padding")]
    pub container_padding: f64,
}

impl Default for DropConfig {
    fn default() -> Self {
        DropConfig {
            card_height: default_card_height(),
            container_padding: default_container_padding(),
        }
    }
}

fn default_card_height() -> f64 {
    88.0
}

fn default_container_padding() -> f64 {
    8.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Minimum interval between accepted add/delete triggers
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        GuardConfig {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub id: String,
    pub name: String,
}

impl BoardConfig {
    /// The board to start from when nothing has been persisted.
    pub fn seed_board(&self) -> Board {
        if self.columns.is_empty() {
            default_seed()
        } else {
            Board::with_columns(
                self.columns
                    .iter()
                    .map(|c| (c.id.clone(), c.name.clone())),
            )
        }
    }
}
