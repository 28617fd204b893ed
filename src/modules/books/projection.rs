//! Converts raw store records into [`Book`]s.
//!
//! A record that is missing a field or carries the wrong type is reported
//! as [`BooksError::RecordShapeMismatch`]; nothing is defaulted silently.

use library_db::Record;
use serde_json::Value;

use super::error::BooksError;
use super::models::{fields, Book};

pub fn project(record: Record) -> Result<Book, BooksError> {
    let id = field(&record, fields::ID)?
        .as_u64()
        .ok_or_else(|| mismatch(fields::ID, "is not a non-negative integer"))?;

    let published_year = field(&record, fields::PUBLISHED_YEAR)?
        .as_i64()
        .ok_or_else(|| mismatch(fields::PUBLISHED_YEAR, "is not an integer"))?;
    let published_year = i32::try_from(published_year)
        .map_err(|_| mismatch(fields::PUBLISHED_YEAR, "is out of range"))?;

    Ok(Book {
        id,
        title: required_text(&record, fields::TITLE)?,
        author: required_text(&record, fields::AUTHOR)?,
        published_year,
        category: text(&record, fields::CATEGORY)?,
        description: text(&record, fields::DESCRIPTION)?,
        cover_image: text(&record, fields::COVER_IMAGE)?,
    })
}

/// Project every record, failing on the first bad one.
pub fn project_all(records: Vec<Record>) -> Result<Vec<Book>, BooksError> {
    records.into_iter().map(project).collect()
}

fn field<'a>(record: &'a Record, name: &'static str) -> Result<&'a Value, BooksError> {
    match record.get(name) {
        None | Some(Value::Null) => Err(mismatch(name, "is missing")),
        Some(value) => Ok(value),
    }
}

fn text(record: &Record, name: &'static str) -> Result<String, BooksError> {
    field(record, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| mismatch(name, "is not a string"))
}

fn required_text(record: &Record, name: &'static str) -> Result<String, BooksError> {
    let value = text(record, name)?;
    if value.trim().is_empty() {
        return Err(mismatch(name, "is blank"));
    }
    Ok(value)
}

fn mismatch(field: &'static str, reason: &'static str) -> BooksError {
    BooksError::RecordShapeMismatch { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn hobbit() -> Value {
        json!({
            "id": 7,
            "title": "The Hobbit",
            "author": "J. R. R. Tolkien",
            "published_year": 1937,
            "category": "Fantasy",
            "description": "There and back again",
            "cover_image": "https://covers.example/hobbit.jpg"
        })
    }

    #[test]
    fn well_formed_record_projects() {
        let book = project(record(hobbit())).unwrap();
        assert_eq!(book.id, 7);
        assert_eq!(book.title, "The Hobbit");
        assert_eq!(book.published_year, 1937);
        assert_eq!(book.cover_image, "https://covers.example/hobbit.jpg");
    }

    #[test]
    fn empty_optional_text_is_kept() {
        let mut value = hobbit();
        value["description"] = json!("");
        let book = project(record(value)).unwrap();
        assert_eq!(book.description, "");
    }

    #[test]
    fn missing_or_mistyped_fields_are_reported() {
        let cases = [
            ("published_year", json!(null), "is missing"),
            ("published_year", json!("1937"), "is not an integer"),
            ("published_year", json!(1.5), "is not an integer"),
            ("published_year", json!(i64::MAX), "is out of range"),
            ("id", json!(-1), "is not a non-negative integer"),
            ("title", json!(""), "is blank"),
            ("category", json!(3), "is not a string"),
        ];

        for (name, value, expected) in cases {
            let mut broken = hobbit();
            broken[name] = value;
            match project(record(broken)) {
                Err(BooksError::RecordShapeMismatch { field, reason }) => {
                    assert_eq!(field, name);
                    assert_eq!(reason, expected);
                }
                other => panic!("expected mismatch on {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn absent_field_is_missing() {
        let mut broken = record(hobbit());
        broken.remove("author");
        assert!(matches!(
            project(broken),
            Err(BooksError::RecordShapeMismatch { field: "author", reason: "is missing" })
        ));
    }

    #[test]
    fn project_all_stops_at_first_bad_record() {
        let mut bad = hobbit();
        bad["published_year"] = json!("soon");
        let result = project_all(vec![record(hobbit()), record(bad)]);
        assert!(result.is_err());

        let books = project_all(vec![record(hobbit())]).unwrap();
        assert_eq!(books.len(), 1);
    }
}
