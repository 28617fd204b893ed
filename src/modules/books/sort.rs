//! Public sort keys and their mapping onto book fields.

use std::str::FromStr;

use library_db::{Direction, Order};

use super::error::BooksError;
use super::models::fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Year,
    Author,
    #[default]
    Title,
}

impl SortKey {
    /// Every key a caller may use, in documentation order
    pub const VALID: &'static [&'static str] = &["year", "author", "title"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Author => "author",
            Self::Title => "title",
        }
    }

    /// Field the key orders by
    pub fn field(self) -> &'static str {
        match self {
            Self::Year => fields::PUBLISHED_YEAR,
            Self::Author => fields::AUTHOR,
            Self::Title => fields::TITLE,
        }
    }

    /// Resolve a key for the unified listing: absent or empty means title.
    pub fn or_default(key: Option<&str>) -> Result<Self, BooksError> {
        match key {
            None | Some("") => Ok(Self::default()),
            Some(key) => key.parse(),
        }
    }
}

/// Strict parse used where the key is mandatory; there is no default.
impl FromStr for SortKey {
    type Err = BooksError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "year" => Ok(Self::Year),
            "author" => Ok(Self::Author),
            "title" => Ok(Self::Title),
            other => Err(BooksError::InvalidSortKey {
                given: other.to_string(),
                valid: Self::VALID,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub key: SortKey,
    pub descending: bool,
}

impl SortOrder {
    pub fn new(key: SortKey, descending: bool) -> Self {
        Self { key, descending }
    }

    pub fn to_order(self) -> Order {
        Order::new(self.key.field(), Direction::descending(self.descending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_fields() {
        assert_eq!("year".parse::<SortKey>().unwrap().field(), "published_year");
        assert_eq!("author".parse::<SortKey>().unwrap().field(), "author");
        assert_eq!("title".parse::<SortKey>().unwrap().field(), "title");
    }

    #[test]
    fn unknown_key_lists_valid_keys() {
        let err = "invalid_key".parse::<SortKey>().unwrap_err();
        match err {
            BooksError::InvalidSortKey { given, valid } => {
                assert_eq!(given, "invalid_key");
                assert_eq!(valid, &["year", "author", "title"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn strict_parse_has_no_default() {
        assert!("".parse::<SortKey>().is_err());
        assert!("Title".parse::<SortKey>().is_err());
    }

    #[test]
    fn unified_path_defaults_to_title() {
        assert_eq!(SortKey::or_default(None).unwrap(), SortKey::Title);
        assert_eq!(SortKey::or_default(Some("")).unwrap(), SortKey::Title);
        assert_eq!(SortKey::or_default(Some("year")).unwrap(), SortKey::Year);
        assert!(SortKey::or_default(Some("price")).is_err());
    }

    #[test]
    fn order_carries_direction() {
        let order = SortOrder::new(SortKey::Year, true).to_order();
        assert_eq!(order.field, "published_year");
        assert_eq!(order.direction, Direction::Descending);

        let order = SortOrder::default().to_order();
        assert_eq!(order.field, "title");
        assert_eq!(order.direction, Direction::Ascending);
    }
}
