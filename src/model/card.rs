use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A single opportunity on the board.
///
/// `fields` is opaque payload (company, probability, tags, notes, ...).
/// Board operations carry it along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    /// Monetary value, never negative
    #[serde(deserialize_with = "deserialize_value")]
    pub value: f64,
    /// Id of the column that currently holds this card
    pub stage: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub fields: IndexMap<String, Value>,
}

impl Card {
    /// Create a card with a freshly generated id, stamped now.
    pub fn new(title: impl Into<String>, value: f64, stage: impl Into<String>) -> Self {
        Card::with_id(generate_card_id(), title, value, stage, Utc::now())
    }

    /// Create a card with an explicit id and creation time.
    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        value: f64,
        stage: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Card {
            id: id.into(),
            title: title.into(),
            value: sanitize_value(value),
            stage: stage.into(),
            created_at,
            fields: IndexMap::new(),
        }
    }

    /// Builder-style helper for attaching a payload field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Generate a collision-resistant card id.
pub fn generate_card_id() -> String {
    Uuid::new_v4().to_string()
}

/// Hand-edited state files can carry negative values; clamp them on the way in.
fn deserialize_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(sanitize_value)
}

/// Clamp a monetary value into the valid range (finite, >= 0).
pub fn sanitize_value(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Everything needed to create a card except its identity.
///
/// `column` of `None` means the first column of the board.
#[derive(Debug, Clone, Default)]
pub struct CardDraft {
    pub column: Option<String>,
    pub title: Option<String>,
    pub value: f64,
    pub fields: IndexMap<String, Value>,
}

/// Title given to cards created without one.
pub const DEFAULT_CARD_TITLE: &str = "New opportunity";

impl CardDraft {
    /// Turn the draft into a card with the given id, placed in `stage`.
    pub fn into_card(self, id: String, stage: &str, created_at: DateTime<Utc>) -> Card {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CARD_TITLE.to_string());
        let mut card = Card::with_id(id, title, self.value, stage, created_at);
        card.fields = self.fields;
        card
    }
}
