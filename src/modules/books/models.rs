use library_db::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::BooksError;

/// Collection (table) holding book records
pub const COLLECTION: &str = "books";

/// Column names of the `books` collection
pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const AUTHOR: &str = "author";
    pub const PUBLISHED_YEAR: &str = "published_year";
    pub const CATEGORY: &str = "category";
    pub const DESCRIPTION: &str = "description";
    pub const COVER_IMAGE: &str = "cover_image";
}

/// A book as returned to callers. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier, immutable after creation
    pub id: u64,
    pub title: String,
    pub author: String,
    pub published_year: i32,
    pub category: String,
    pub description: String,
    /// Cover image URI
    pub cover_image: String,
}

/// Payload for create and update. On update it replaces every mutable
/// field of the stored book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub published_year: i32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: String,
}

impl BookInput {
    /// Reject blank titles and authors.
    pub fn validate(&self) -> Result<(), BooksError> {
        for (field, value) in [(fields::TITLE, &self.title), (fields::AUTHOR, &self.author)] {
            if value.trim().is_empty() {
                return Err(BooksError::InvalidInput {
                    field,
                    reason: "must not be blank",
                });
            }
        }
        Ok(())
    }

    /// Every mutable field, by name. `id` is never part of the record.
    pub fn into_record(self) -> Record {
        let mut record = Record::new();
        record.insert(fields::TITLE.into(), Value::String(self.title));
        record.insert(fields::AUTHOR.into(), Value::String(self.author));
        record.insert(
            fields::PUBLISHED_YEAR.into(),
            Value::from(self.published_year),
        );
        record.insert(fields::CATEGORY.into(), Value::String(self.category));
        record.insert(fields::DESCRIPTION.into(), Value::String(self.description));
        record.insert(fields::COVER_IMAGE.into(), Value::String(self.cover_image));
        record
    }
}

impl From<Book> for BookInput {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author: book.author,
            published_year: book.published_year,
            category: book.category,
            description: book.description,
            cover_image: book.cover_image,
        }
    }
}

/// Confirmation returned by the delete endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedBook {
    pub deleted: bool,
    pub book: Book,
}
