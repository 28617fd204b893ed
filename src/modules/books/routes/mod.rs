//! HTTP handlers of the books module, mounted at `/api/books`.

use axum::{extract::State, routing::get, Json, Router};
use library_http::error::AppError;
use library_http::extract::{self, Path, Query};
use serde::Deserialize;

use super::error::BooksError;
use super::models::{Book, BookInput, DeletedBook};
use super::pagination::{Page, PageRequest};
use super::query::{lenient_bool, ListParams};
use super::service::BookService;

type ApiResult<T> = Result<Json<T>, AppError>;

#[derive(Debug, Default, Deserialize)]
pub struct SortParams {
    #[serde(default, alias = "desc_order", deserialize_with = "lenient_bool")]
    pub desc: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// Router for every books endpoint, bound to `service`.
pub fn router(service: BookService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/combined", get(list_books))
        .route("/health", get(health_check))
        .route("/sort/{sort_by}", get(sorted_books))
        .route("/category/{category}", get(books_in_category))
        .route("/search/{title}", get(search_books))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .with_state(service)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(
    State(service): State<BookService>,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<Book>> {
    Ok(Json(service.list_params(&params).await?))
}

async fn create_book(
    State(service): State<BookService>,
    extract::Json(input): extract::Json<BookInput>,
) -> ApiResult<Book> {
    Ok(Json(service.create(input).await?))
}

async fn get_book(State(service): State<BookService>, Path(id): Path<u64>) -> ApiResult<Book> {
    let book = service
        .get(id)
        .await?
        .ok_or(BooksError::NotFound { id })?;
    Ok(Json(book))
}

async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<u64>,
    extract::Json(input): extract::Json<BookInput>,
) -> ApiResult<Book> {
    let book = service
        .update(id, input)
        .await?
        .ok_or(BooksError::NotFound { id })?;
    Ok(Json(book))
}

async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<u64>,
) -> ApiResult<DeletedBook> {
    let book = service
        .delete(id)
        .await?
        .ok_or(BooksError::NotFound { id })?;
    Ok(Json(DeletedBook {
        deleted: true,
        book,
    }))
}

async fn sorted_books(
    State(service): State<BookService>,
    Path(sort_by): Path<String>,
    Query(params): Query<SortParams>,
) -> ApiResult<Vec<Book>> {
    Ok(Json(service.sorted_by(&sort_by, params.desc).await?))
}

async fn books_in_category(
    State(service): State<BookService>,
    Path(category): Path<String>,
    Query(params): Query<PageParams>,
) -> ApiResult<Page<Book>> {
    let limits = service.limits();
    let page = PageRequest::bounded(
        params.page.unwrap_or(1),
        params
            .page_size
            .unwrap_or_else(|| i64::from(limits.default_page_size)),
        limits.max_page_size,
    )?;
    Ok(Json(service.by_category(&category, page).await?))
}

async fn search_books(
    State(service): State<BookService>,
    Path(title): Path<String>,
) -> ApiResult<Vec<Book>> {
    Ok(Json(service.search_title(&title).await?))
}
