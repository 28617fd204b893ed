//! Turns optional listing parameters into one immutable store query.

use std::fmt;

use library_db::{Filter, Query};
use library_kernel::settings::PaginationSettings;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::Deserialize;

use super::error::BooksError;
use super::models::fields;
use super::pagination::PageRequest;
use super::sort::{SortKey, SortOrder};

/// Raw parameters of the unified listing, as they arrive on the wire.
/// Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    #[serde(default, alias = "desc_order", deserialize_with = "lenient_bool")]
    pub desc: bool,
}

/// Accept the usual spellings of a query-string flag: `true`/`false`,
/// `1`/`0`, `yes`/`no`, `on`/`off`, `t`/`f`, `y`/`n`, in any case.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientBool;

    impl Visitor<'_> for LenientBool {
        type Value = bool;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a boolean flag such as true, false, 1, 0, yes or no")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(Unexpected::Unsigned(other), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(Unexpected::Signed(other), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
                "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
                _ => Err(E::invalid_value(Unexpected::Str(value), &self)),
            }
        }
    }

    deserializer.deserialize_any(LenientBool)
}

/// Validated listing: filters, ordering and the page window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookQuery {
    /// Case-insensitive substring of the title
    pub title_contains: Option<String>,
    /// Exact category
    pub category_equals: Option<String>,
    pub sort: SortOrder,
    pub page: PageRequest,
}

impl BookQuery {
    /// Validate `params` and build the query. Absent or empty text
    /// parameters add no predicate; absent sort means title ascending.
    pub fn from_params(
        params: &ListParams,
        limits: &PaginationSettings,
    ) -> Result<Self, BooksError> {
        let key = SortKey::or_default(params.sort_by.as_deref())?;
        let page = PageRequest::bounded(
            params.page.unwrap_or(1),
            params
                .page_size
                .unwrap_or_else(|| i64::from(limits.default_page_size)),
            limits.max_page_size,
        )?;

        Ok(Self {
            title_contains: present(params.title.as_deref()),
            category_equals: present(params.category.as_deref()),
            sort: SortOrder::new(key, params.desc),
            page,
        })
    }

    /// Every record, title ascending, one page.
    pub fn all(page: PageRequest) -> Self {
        Self {
            title_contains: None,
            category_equals: None,
            sort: SortOrder::default(),
            page,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category_equals = Some(category.into());
        self
    }

    /// The predicates, shared by the count and the page read.
    pub fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(title) = &self.title_contains {
            filters.push(Filter::contains(fields::TITLE, title.clone()));
        }
        if let Some(category) = &self.category_equals {
            filters.push(Filter::equals(fields::CATEGORY, category.clone()));
        }
        filters
    }

    /// Filters, then order, then the page window.
    pub fn to_store_query(&self) -> Query {
        Query {
            filters: self.filters(),
            order: Some(self.sort.to_order()),
            range: Some(self.page.range()),
        }
    }
}

fn present(value: Option<&str>) -> Option<String> {
    value.filter(|value| !value.is_empty()).map(str::to_string)
}
