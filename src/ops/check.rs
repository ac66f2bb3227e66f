use std::collections::HashMap;

use serde::Serialize;

use crate::model::board::Board;

/// Structured result from an integrity check, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A broken board invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// The same card id appears more than once across the board
    #[serde(rename = "duplicate_card")]
    DuplicateCard {
        card_id: String,
        column_ids: Vec<String>,
    },
    /// Two columns share an id
    #[serde(rename = "duplicate_column")]
    DuplicateColumn { column_id: String },
    /// A card's stage label doesn't match the column holding it
    #[serde(rename = "stage_mismatch")]
    StageMismatch {
        card_id: String,
        column_id: String,
        stage: String,
    },
}

impl CheckError {
    /// Errors that can't be repaired without guessing which copy is right.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CheckError::DuplicateCard { .. } | CheckError::DuplicateColumn { .. }
        )
    }
}

/// Suspicious but harmless data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    #[serde(rename = "blank_column_name")]
    BlankColumnName { column_id: String },
    /// Negative or non-finite value, usually from hand-edited state
    #[serde(rename = "invalid_value")]
    InvalidValue { card_id: String, value: f64 },
    #[serde(rename = "empty_card_id")]
    EmptyCardId { column_id: String, index: usize },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Validate a board. Read-only.
///
/// Checks performed:
/// 1. No card id appears twice (closed partition)
/// 2. No two columns share an id
/// 3. Every card's stage equals its column's id
/// 4. Warnings for blank names, invalid values and empty ids
pub fn check_board(board: &Board) -> CheckResult {
    let mut result = CheckResult::default();

    let mut seen_columns: HashMap<&str, usize> = HashMap::new();
    for column in &board.columns {
        let count = seen_columns.entry(column.id.as_str()).or_insert(0);
        *count += 1;
        if *count == 2 {
            result.errors.push(CheckError::DuplicateColumn {
                column_id: column.id.clone(),
            });
        }
    }

    // Card id -> columns it appears in, in first-seen order
    let mut placements: Vec<(&str, Vec<String>)> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();

    for column in &board.columns {
        if column.name.trim().is_empty() {
            result.warnings.push(CheckWarning::BlankColumnName {
                column_id: column.id.clone(),
            });
        }
        for (i, card) in column.cards.iter().enumerate() {
            if card.id.is_empty() {
                result.warnings.push(CheckWarning::EmptyCardId {
                    column_id: column.id.clone(),
                    index: i,
                });
            }
            if !(card.value.is_finite() && card.value >= 0.0) {
                result.warnings.push(CheckWarning::InvalidValue {
                    card_id: card.id.clone(),
                    value: card.value,
                });
            }
            if card.stage != column.id {
                result.errors.push(CheckError::StageMismatch {
                    card_id: card.id.clone(),
                    column_id: column.id.clone(),
                    stage: card.stage.clone(),
                });
            }

            let slot = *index_of.entry(card.id.as_str()).or_insert_with(|| {
                placements.push((card.id.as_str(), Vec::new()));
                placements.len() - 1
            });
            placements[slot].1.push(column.id.clone());
        }
    }

    for (card_id, column_ids) in placements {
        if column_ids.len() > 1 {
            result.errors.push(CheckError::DuplicateCard {
                card_id: card_id.to_string(),
                column_ids,
            });
        }
    }

    result.valid = result.errors.is_empty();
    result
}
