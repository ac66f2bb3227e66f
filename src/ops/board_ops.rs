//! Board mutations.
//!
//! Every function here is total: a stale or unknown reference leaves the
//! board untouched and reports `false` instead of failing. Event handlers
//! can't always guarantee their view of the board is still current by the
//! time they run, so "nothing to do" is a normal outcome.

use serde::{Deserialize, Serialize};

use crate::model::board::Board;
use crate::model::card::Card;

/// A fully resolved move: which card, from where, to where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub card_id: String,
    pub source_column: String,
    pub source_index: usize,
    pub target_column: String,
    pub target_index: usize,
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// Move a card between or within columns.
///
/// The card must currently sit at `source_index` of `source_column`. The
/// target index is applied to the target sequence *after* removal and is
/// clamped to its length.
pub fn move_card(board: &mut Board, req: &MoveRequest) -> bool {
    let Some(src) = board.column_index(&req.source_column) else {
        return false;
    };
    let Some(dst) = board.column_index(&req.target_column) else {
        return false;
    };
    match board.columns[src].cards.get(req.source_index) {
        Some(card) if card.id == req.card_id => {}
        _ => return false,
    }

    let target_len = if src == dst {
        board.columns[dst].len() - 1
    } else {
        board.columns[dst].len()
    };
    let insert_at = req.target_index.min(target_len);
    if src == dst && insert_at == req.source_index {
        return false;
    }

    let mut card = board.columns[src].cards.remove(req.source_index);
    card.stage = board.columns[dst].id.clone();
    board.columns[dst].cards.insert(insert_at, card);
    true
}

// ---------------------------------------------------------------------------
// Card create / delete
// ---------------------------------------------------------------------------

/// Insert a card at the head of `column_id` (first column when `None`).
///
/// Skipped when a card with the same id is already on the board or the
/// column doesn't exist.
pub fn add_card(board: &mut Board, mut card: Card, column_id: Option<&str>) -> bool {
    if board.contains_card(&card.id) {
        return false;
    }
    let column = match column_id {
        Some(id) => board.column_mut(id),
        None => board.columns.first_mut(),
    };
    let Some(column) = column else {
        return false;
    };
    card.stage = column.id.clone();
    column.cards.insert(0, card);
    true
}

/// Remove a card from whichever column holds it.
pub fn delete_card(board: &mut Board, card_id: &str) -> bool {
    match board.locate(card_id) {
        Some((ci, i)) => {
            board.columns[ci].cards.remove(i);
            true
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Set a column's display name. Blank names are ignored.
pub fn rename_column(board: &mut Board, column_id: &str, new_name: &str) -> bool {
    let name = new_name.trim();
    if name.is_empty() {
        return false;
    }
    match board.column_mut(column_id) {
        Some(column) if column.name != name => {
            column.name = name.to_string();
            true
        }
        _ => false,
    }
}
