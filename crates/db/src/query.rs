//! Backend-neutral description of a read against a record collection.
//!
//! A [`Query`] is a plain value: a conjunction of [`Filter`]s, an optional
//! [`Order`], and an optional [`Range`] window. Adapters translate it in
//! one place; nothing is applied incrementally.

use std::fmt;

use serde_json::Value;

/// A raw row as the store returns it, keyed by column name.
pub type Record = serde_json::Map<String, Value>;

/// Store-assigned record identifier.
pub type RecordId = u64;

/// Name of the identifier column every collection carries.
pub const ID_FIELD: &str = "id";

/// A single predicate. Multiple filters are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Case-insensitive substring match on a text field
    Contains { field: String, needle: String },
    /// Exact equality
    Equals { field: String, value: Value },
}

impl Filter {
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Evaluate the predicate against an in-memory record.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Contains { field, needle } => match record.get(field) {
                Some(Value::String(text)) => {
                    text.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            },
            Self::Equals { field, value } => {
                record.get(field).unwrap_or(&Value::Null) == value
            }
        }
    }
}

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn descending(descending: bool) -> Self {
        if descending {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Sort on one field. Ties are broken by [`ID_FIELD`] in the same
/// direction, so a descending read is the exact reverse of an ascending one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Half-open window `[offset, offset + limit)` over the ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub offset: u64,
    pub limit: u64,
}

impl Range {
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub range: Option<Range>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order::new(field, direction));
        self
    }

    #[must_use]
    pub fn range(mut self, offset: u64, limit: u64) -> Self {
        self.range = Some(Range::new(offset, limit));
        self
    }

    /// True when the record passes every filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test records are objects"),
        }
    }

    #[test]
    fn contains_ignores_case() {
        let filter = Filter::contains("title", "the");
        assert!(filter.matches(&record(json!({"title": "The Hobbit"}))));
        assert!(filter.matches(&record(json!({"title": "there and back"}))));
        assert!(!filter.matches(&record(json!({"title": "Dune"}))));
    }

    #[test]
    fn contains_never_matches_non_text() {
        let filter = Filter::contains("published_year", "19");
        assert!(!filter.matches(&record(json!({"published_year": 1937}))));
        assert!(!filter.matches(&record(json!({}))));
    }

    #[test]
    fn equals_is_exact() {
        let filter = Filter::equals("category", "Fiction");
        assert!(filter.matches(&record(json!({"category": "Fiction"}))));
        assert!(!filter.matches(&record(json!({"category": "fiction"}))));
        assert!(!filter.matches(&record(json!({"category": "Non-Fiction"}))));
    }

    #[test]
    fn filters_are_conjunctive() {
        let query = Query::new()
            .filter(Filter::contains("title", "hob"))
            .filter(Filter::equals("category", "Fantasy"));

        assert!(query.matches(&record(
            json!({"title": "The Hobbit", "category": "Fantasy"})
        )));
        assert!(!query.matches(&record(
            json!({"title": "The Hobbit", "category": "Fiction"})
        )));
        assert!(Query::new().matches(&record(json!({}))));
    }

    #[test]
    fn direction_display() {
        assert_eq!(Direction::descending(false).to_string(), "asc");
        assert_eq!(Direction::descending(true).to_string(), "desc");
    }
}
