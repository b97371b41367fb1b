use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the date cell in every sheet row
pub const DATE_FIELD: &str = "date";

/// One day's content as read from the sheet.
///
/// Every cell, `date` included, lives in `fields` in the order the source
/// produced it and is written back out untouched. Only `date` is interpreted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatedRecord {
    pub fields: Map<String, Value>,
}

impl DatedRecord {
    pub fn new(date: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(DATE_FIELD.to_string(), Value::String(date.into()));
        Self { fields }
    }

    /// Builder-style helper, mostly for fixtures.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Wrap a loosely typed sheet row.
    pub fn from_row(row: Map<String, Value>) -> Self {
        Self { fields: row }
    }

    /// Source date, `DD/MM/YYYY` with day and month possibly unpadded.
    /// `None` when the cell is missing or holds anything but a string.
    pub fn date(&self) -> Option<&str> {
        self.fields.get(DATE_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Content fields the placeholder is synthesized for, with the wording used
/// in the "not available" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentField {
    OldTestament,
    Gospel,
    Pope,
}

impl ContentField {
    fn label(&self) -> &'static str {
        match self {
            ContentField::OldTestament => "Old Testament reading",
            ContentField::Gospel => "Gospel reading",
            ContentField::Pope => "Pope reflection",
        }
    }

    pub fn unavailable_message(&self, display_date: &str) -> String {
        format!("No {} available for {}.", self.label(), display_date)
    }
}

/// Synthesized body returned when no record matches the queried date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFoundPlaceholder {
    pub ot: String,
    pub gospel: String,
    pub pope: String,
    pub date: String,
}

impl NotFoundPlaceholder {
    pub fn for_date(display_date: &str) -> Self {
        Self {
            ot: ContentField::OldTestament.unavailable_message(display_date),
            gospel: ContentField::Gospel.unavailable_message(display_date),
            pope: ContentField::Pope.unavailable_message(display_date),
            date: display_date.to_string(),
        }
    }
}

/// Outcome of a date lookup. Serialized as the bare record or placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupResult {
    Found(DatedRecord),
    NotFound(NotFoundPlaceholder),
}

impl LookupResult {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupResult::Found(_))
    }
}
