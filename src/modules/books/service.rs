use std::sync::Arc;

use library_db::{Direction, Filter, Query, RecordStore};
use library_kernel::settings::PaginationSettings;

use super::error::BooksError;
use super::models::{fields, Book, BookInput, COLLECTION};
use super::pagination::{Page, PageRequest};
use super::projection::{project, project_all};
use super::query::{BookQuery, ListParams};
use super::sort::SortKey;

/// Book operations over a [`RecordStore`].
///
/// Each operation is one or two store calls. Reads that precede writes are
/// not atomic with them: concurrent updates or deletes of the same id race.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn RecordStore>,
    limits: PaginationSettings,
}

impl BookService {
    pub fn new(store: Arc<dyn RecordStore>, limits: PaginationSettings) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> &PaginationSettings {
        &self.limits
    }

    pub async fn create(&self, input: BookInput) -> Result<Book, BooksError> {
        input.validate()?;
        let record = self.store.insert(COLLECTION, input.into_record()).await?;
        let book = project(record)?;
        tracing::info!(book_id = book.id, "book created");
        Ok(book)
    }

    /// `None` when no book has `id`.
    pub async fn get(&self, id: u64) -> Result<Option<Book>, BooksError> {
        self.store
            .fetch(COLLECTION, id)
            .await?
            .map(project)
            .transpose()
    }

    /// Replace every mutable field of book `id`. `None` when it does not exist.
    pub async fn update(&self, id: u64, input: BookInput) -> Result<Option<Book>, BooksError> {
        input.validate()?;
        let Some(record) = self
            .store
            .replace(COLLECTION, id, input.into_record())
            .await?
        else {
            tracing::debug!(book_id = id, "update of missing book");
            return Ok(None);
        };

        let book = project(record)?;
        tracing::info!(book_id = id, "book updated");
        Ok(Some(book))
    }

    /// Remove book `id`, returning it. `None` when it does not exist.
    pub async fn delete(&self, id: u64) -> Result<Option<Book>, BooksError> {
        let Some(record) = self.store.remove(COLLECTION, id).await? else {
            tracing::debug!(book_id = id, "delete of missing book");
            return Ok(None);
        };

        tracing::info!(book_id = id, "book deleted");
        project(record).map(Some)
    }

    /// Remove book `id`; `false` when there was nothing to remove.
    pub async fn try_delete(&self, id: u64) -> Result<bool, BooksError> {
        Ok(self.store.remove(COLLECTION, id).await?.is_some())
    }

    /// Validate raw listing parameters, then run [`BookService::list`].
    pub async fn list_params(&self, params: &ListParams) -> Result<Page<Book>, BooksError> {
        let query = BookQuery::from_params(params, &self.limits)?;
        self.list(&query).await
    }

    /// One page of matching books plus the size of the whole matching set.
    ///
    /// The count and the page are separate store reads; a write landing
    /// between them can make `total` disagree with the page contents.
    pub async fn list(&self, query: &BookQuery) -> Result<Page<Book>, BooksError> {
        let total = self.store.count(COLLECTION, &query.filters()).await?;
        let records = self
            .store
            .select(COLLECTION, &query.to_store_query())
            .await?;
        let items = project_all(records)?;

        tracing::debug!(
            total,
            returned = items.len(),
            page = query.page.page(),
            page_size = query.page.page_size(),
            sort = query.sort.key.as_str(),
            descending = query.sort.descending,
            "books listed"
        );
        Ok(Page::new(items, total, query.page))
    }

    /// Every book ordered by a mandatory key. Unknown or empty keys are
    /// rejected; there is no default here.
    pub async fn sorted_by(&self, key: &str, descending: bool) -> Result<Vec<Book>, BooksError> {
        let key: SortKey = key.parse()?;
        let query = Query::new().order_by(key.field(), Direction::descending(descending));
        let records = self.store.select(COLLECTION, &query).await?;
        project_all(records)
    }

    /// One page of books in exactly `category`, title ascending.
    pub async fn by_category(
        &self,
        category: &str,
        page: PageRequest,
    ) -> Result<Page<Book>, BooksError> {
        self.list(&BookQuery::all(page).with_category(category)).await
    }

    /// Every book whose title contains `title`, ignoring case, title ascending.
    pub async fn search_title(&self, title: &str) -> Result<Vec<Book>, BooksError> {
        let query = Query::new()
            .filter(Filter::contains(fields::TITLE, title))
            .order_by(fields::TITLE, Direction::Ascending);
        let records = self.store.select(COLLECTION, &query).await?;
        project_all(records)
    }
}
