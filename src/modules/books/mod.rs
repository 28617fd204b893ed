pub mod error;
pub mod models;
pub mod pagination;
pub mod projection;
pub mod query;
pub mod routes;
pub mod service;
pub mod sort;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use library_kernel::{InitCtx, Migration, Module};

pub use error::BooksError;
pub use models::{Book, BookInput, DeletedBook};
pub use pagination::{Page, PageRequest};
pub use query::{BookQuery, ListParams};
pub use service::BookService;
pub use sort::{SortKey, SortOrder};

/// Book catalogue: CRUD plus filtered, sorted, paged listings.
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(service: BookService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &BookService {
        &self.service
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            max_page_size = self.service.limits().max_page_size,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "001_init",
                up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    title          TEXT    NOT NULL CHECK (length(trim(title)) > 0),
                    author         TEXT    NOT NULL CHECK (length(trim(author)) > 0),
                    published_year INTEGER NOT NULL,
                    category       TEXT    NOT NULL DEFAULT '',
                    description    TEXT    NOT NULL DEFAULT '',
                    cover_image    TEXT    NOT NULL DEFAULT ''
                );
                "#,
            },
            Migration {
                id: "002_category_index",
                up: "CREATE INDEX IF NOT EXISTS books_category_idx ON books (category);",
            },
        ]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn path_param(name: &str, schema: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "name": name, "in": "path", "required": true, "schema": schema })
}

fn query_param(name: &str, schema: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "name": name, "in": "query", "required": false, "schema": schema })
}

/// Paths are relative to the `/api/books` mount point; the collection root
/// is the empty path.
fn openapi_fragment() -> serde_json::Value {
    use serde_json::json;

    let book = json!({ "$ref": "#/components/schemas/Book" });
    let book_list = json!({ "type": "array", "items": book });
    let book_page = json!({ "$ref": "#/components/schemas/BookPage" });
    let book_input = json!({
        "required": true,
        "content": {
            "application/json": { "schema": { "$ref": "#/components/schemas/BookInput" } }
        }
    });
    let id = path_param("id", json!({ "type": "integer", "format": "int64", "minimum": 1 }));
    let paging = [
        query_param("page", json!({ "type": "integer", "minimum": 1, "default": 1 })),
        query_param(
            "page_size",
            json!({ "type": "integer", "minimum": 1, "maximum": 100, "default": 10 }),
        ),
    ];
    let list = json!({
        "summary": "List books with optional title search, category filter, sorting and pagination",
        "tags": ["Books"],
        "parameters": [
            paging[0], paging[1],
            query_param("title", json!({ "type": "string" })),
            query_param("category", json!({ "type": "string" })),
            query_param("sort_by", json!({ "type": "string", "enum": SortKey::VALID })),
            query_param("desc", json!({ "type": "boolean", "default": false }))
        ],
        "responses": {
            "200": json_response("One page of books", book_page.clone()),
            "400": error_response("Invalid sort key or pagination parameter"),
            "500": error_response("Internal server error")
        }
    });

    json!({
        "paths": {
            "": {
                "get": list,
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": book_input,
                    "responses": {
                        "200": json_response("Created book", book.clone()),
                        "422": error_response("Invalid book payload")
                    }
                }
            },
            "/combined": { "get": list },
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            },
            "/sort/{sort_by}": {
                "get": {
                    "summary": "All books ordered by year, author or title",
                    "tags": ["Books"],
                    "parameters": [
                        path_param("sort_by", json!({ "type": "string", "enum": SortKey::VALID })),
                        query_param("desc", json!({ "type": "boolean", "default": false }))
                    ],
                    "responses": {
                        "200": json_response("Ordered books", book_list.clone()),
                        "400": error_response("Invalid sort key")
                    }
                }
            },
            "/category/{category}": {
                "get": {
                    "summary": "Books in one category",
                    "tags": ["Books"],
                    "parameters": [
                        path_param("category", json!({ "type": "string" })),
                        paging[0], paging[1]
                    ],
                    "responses": {
                        "200": json_response("One page of books", book_page),
                        "400": error_response("Invalid pagination parameter")
                    }
                }
            },
            "/search/{title}": {
                "get": {
                    "summary": "Books whose title contains the text, ignoring case",
                    "tags": ["Books"],
                    "parameters": [path_param("title", json!({ "type": "string" }))],
                    "responses": {
                        "200": json_response("Matching books", book_list)
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Fetch a book",
                    "tags": ["Books"],
                    "parameters": [id],
                    "responses": {
                        "200": json_response("The book", book.clone()),
                        "404": error_response("No book with this id")
                    }
                },
                "put": {
                    "summary": "Replace every field of a book",
                    "tags": ["Books"],
                    "parameters": [id],
                    "requestBody": book_input,
                    "responses": {
                        "200": json_response("Updated book", book),
                        "404": error_response("No book with this id"),
                        "422": error_response("Invalid book payload")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [id],
                    "responses": {
                        "200": json_response(
                            "Deleted book",
                            json!({ "$ref": "#/components/schemas/DeletedBook" })
                        ),
                        "404": error_response("No book with this id")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "published_year": { "type": "integer", "format": "int32" },
                        "category": { "type": "string" },
                        "description": { "type": "string" },
                        "cover_image": { "type": "string", "description": "Cover image URI" }
                    },
                    "required": [
                        "id", "title", "author", "published_year",
                        "category", "description", "cover_image"
                    ]
                },
                "BookInput": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "minLength": 1 },
                        "author": { "type": "string", "minLength": 1 },
                        "published_year": { "type": "integer", "format": "int32" },
                        "category": { "type": "string", "default": "" },
                        "description": { "type": "string", "default": "" },
                        "cover_image": { "type": "string", "default": "" }
                    },
                    "required": ["title", "author", "published_year"]
                },
                "BookPage": {
                    "type": "object",
                    "properties": {
                        "items": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } },
                        "total": { "type": "integer", "description": "Books matching the filters" },
                        "page": { "type": "integer" },
                        "page_size": { "type": "integer" },
                        "total_pages": { "type": "integer" }
                    },
                    "required": ["items", "total", "page", "page_size", "total_pages"]
                },
                "DeletedBook": {
                    "type": "object",
                    "properties": {
                        "deleted": { "type": "boolean" },
                        "book": { "$ref": "#/components/schemas/Book" }
                    },
                    "required": ["deleted", "book"]
                }
            }
        }
    })
}

/// Create the books module over `service`
pub fn create_module(service: BookService) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(service))
}
