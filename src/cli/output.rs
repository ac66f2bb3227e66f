use serde::Serialize;

use crate::model::board::Board;
use crate::model::card::Card;
use crate::ops::check::{CheckError, CheckResult, CheckWarning};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct BoardJson<'a> {
    pub columns: Vec<ColumnJson<'a>>,
    pub total_cards: usize,
    pub total_value: f64,
}

#[derive(Serialize)]
pub struct ColumnJson<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub card_count: usize,
    pub value: f64,
    pub cards: &'a [Card],
}

impl<'a> BoardJson<'a> {
    pub fn new(board: &'a Board) -> Self {
        BoardJson {
            columns: board
                .columns
                .iter()
                .map(|c| ColumnJson {
                    id: &c.id,
                    name: &c.name,
                    card_count: c.len(),
                    value: c.total_value(),
                    cards: &c.cards,
                })
                .collect(),
            total_cards: board.card_count(),
            total_value: board.total_value(),
        }
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

fn plural_cards(n: usize) -> &'static str {
    if n == 1 { "card" } else { "cards" }
}

/// Render the board as plain text, one block per column.
pub fn format_board(board: &Board) -> String {
    let mut out = String::new();
    for column in &board.columns {
        out.push_str(&format!(
            "{} [{}]  {} {}  {:.2}\n",
            column.name,
            column.id,
            column.len(),
            plural_cards(column.len()),
            column.total_value()
        ));
        for card in &column.cards {
            out.push_str(&format!("  {}  {}  {:.2}\n", card.id, card.title, card.value));
        }
        out.push('\n');
    }
    let total = board.card_count();
    out.push_str(&format!(
        "Total  {} {}  {:.2}\n",
        total,
        plural_cards(total),
        board.total_value()
    ));
    out
}

/// Render a check result. Empty string when there is nothing to report.
pub fn format_check(result: &CheckResult) -> String {
    let mut out = String::new();
    if !result.errors.is_empty() {
        out.push_str("Errors:\n");
        for err in &result.errors {
            let line = match err {
                CheckError::DuplicateCard {
                    card_id,
                    column_ids,
                } => format!("{} appears in columns: {}", card_id, column_ids.join(", ")),
                CheckError::DuplicateColumn { column_id } => {
                    format!("column id {} is used more than once", column_id)
                }
                CheckError::StageMismatch {
                    card_id,
                    column_id,
                    stage,
                } => format!("[{}] {} has stage \"{}\"", column_id, card_id, stage),
            };
            out.push_str(&format!("  {}\n", line));
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            out.push('\n');
        }
        out.push_str("Warnings:\n");
        for warning in &result.warnings {
            let line = match warning {
                CheckWarning::BlankColumnName { column_id } => {
                    format!("[{}] column has a blank name", column_id)
                }
                CheckWarning::InvalidValue { card_id, value } => {
                    format!("{} has invalid value {}", card_id, value)
                }
                CheckWarning::EmptyCardId { column_id, index } => {
                    format!("[{}] card at position {} has no id", column_id, index)
                }
            };
            out.push_str(&format!("  {}\n", line));
        }
    }
    out
}
