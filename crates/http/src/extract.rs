//! Request extractors whose rejections use the [`AppError`] envelope.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
};

use crate::error::AppError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

/// URL query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// URL path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        // Well-formed JSON of the wrong shape is unprocessable; anything
        // else is a malformed request.
        if rejection.status() == StatusCode::UNPROCESSABLE_ENTITY {
            AppError::Validation {
                details: Vec::new(),
                code: "invalid_body".to_string(),
                message,
            }
        } else {
            AppError::bad_request_with("invalid_body", Vec::new(), message)
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request_with("invalid_query", Vec::new(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request_with("invalid_path", Vec::new(), rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request},
        response::Response,
        routing::get,
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Shelf {
        name: String,
    }

    #[derive(Deserialize)]
    struct Window {
        page: Option<u32>,
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/shelves/{id}",
                get(|Path(id): Path<u64>| async move { id.to_string() }),
            )
            .route(
                "/shelves",
                get(|Query(window): Query<Window>| async move {
                    window.page.unwrap_or(1).to_string()
                })
                .post(|Json(shelf): Json<Shelf>| async move { shelf.name }),
            )
    }

    async fn send(request: Request<Body>) -> Response {
        app().oneshot(request).await.unwrap()
    }

    async fn error_code(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["error"]["code"].clone()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/shelves")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn accepted_values_pass_through() {
        let response = send(get_request("/shelves/3")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(post_json(r#"{"name": "fiction"}"#)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_path_uses_error_envelope() {
        let response = send(get_request("/shelves/abc")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "invalid_path");
    }

    #[tokio::test]
    async fn bad_query_uses_error_envelope() {
        let response = send(get_request("/shelves?page=x")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "invalid_query");
    }

    #[tokio::test]
    async fn bad_body_uses_error_envelope() {
        let response = send(post_json(r#"{"title": "no name"}"#)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(response).await, "invalid_body");

        let response = send(post_json("{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "invalid_body");
    }
}
