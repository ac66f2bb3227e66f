use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::card::Card;

/// A pipeline stage: a named, ordered bucket of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
    /// Cards in visible (top to bottom) order
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Column {
            id: id.into(),
            name: name.into(),
            cards: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Position of a card in this column
    pub fn position_of(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    pub fn total_value(&self) -> f64 {
        self.cards.iter().map(|c| c.value).sum()
    }
}

/// The full board: columns in their fixed display order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Board {
    pub columns: Vec<Column>,
}

/// Derived per-column aggregate, computed on read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub id: String,
    pub name: String,
    pub cards: usize,
    pub value: f64,
}

impl Board {
    /// Build a board with empty columns
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Board {
            columns: columns
                .into_iter()
                .map(|(id, name)| Column::new(id, name))
                .collect(),
        }
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    /// Locate a card: (column index, index within column)
    pub fn locate(&self, card_id: &str) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(ci, col)| col.position_of(card_id).map(|i| (ci, i)))
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.locate(card_id)
            .map(|(ci, i)| &self.columns[ci].cards[i])
    }

    pub fn contains_card(&self, card_id: &str) -> bool {
        self.locate(card_id).is_some()
    }

    /// All cards, column by column, in display order
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.columns.iter().flat_map(|c| c.cards.iter())
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    pub fn total_value(&self) -> f64 {
        self.columns.iter().map(Column::total_value).sum()
    }

    pub fn summaries(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .map(|c| ColumnSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                cards: c.len(),
                value: c.total_value(),
            })
            .collect()
    }

    /// Re-sync every card's stage label with the column holding it.
    /// Returns the number of cards that had drifted.
    pub fn resync_stages(&mut self) -> usize {
        let mut fixed = 0;
        for column in &mut self.columns {
            for card in &mut column.cards {
                if card.stage != column.id {
                    card.stage = column.id.clone();
                    fixed += 1;
                }
            }
        }
        fixed
    }
}

/// Columns of the built-in seed board, in order.
pub const DEFAULT_COLUMNS: [(&str, &str); 6] = [
    ("lead", "Lead"),
    ("qualified", "Qualified"),
    ("proposal", "Proposal"),
    ("negotiation", "Negotiation"),
    ("won", "Won"),
    ("lost", "Lost"),
];

/// The built-in seed board used when nothing has been persisted yet.
///
/// Deterministic: fixed ids and timestamps, so two calls compare equal.
/// Demo content only; nothing relies on it across versions.
pub fn default_seed() -> Board {
    let mut board = Board::with_columns(DEFAULT_COLUMNS);
    let created = Utc
        .with_ymd_and_hms(2025, 1, 6, 9, 0, 0)
        .single()
        .unwrap_or_default();

    let demo: [(&str, &str, f64, &str, &str); 4] = [
        ("seed-1", "Website redesign", 12_000.0, "lead", "Northwind Traders"),
        ("seed-2", "Annual support renewal", 4_800.0, "lead", "Contoso"),
        ("seed-3", "Data migration", 27_500.0, "proposal", "Fabrikam"),
        ("seed-4", "Onboarding package", 3_200.0, "won", "Tailspin Toys"),
    ];
    for (id, title, value, stage, company) in demo {
        let card = Card::with_id(id, title, value, stage, created).field("company", company);
        if let Some(column) = board.column_mut(stage) {
            column.cards.push(card);
        }
    }
    board
}
