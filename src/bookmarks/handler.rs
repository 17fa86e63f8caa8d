//! HTTP handlers for bookmarks

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::Response,
};
use serde::Serialize;

use super::model::{CreateBookmark, ListParams, UpdateBookmark};
use super::service;
use super::store::Bookmarks;
use crate::api::APIResponse;
use crate::error::{BookmarkError, unpack_anyhow};
use crate::handler::AppState;
use crate::identity::CallerIdentity;

const NOT_FOUND: &str = "BookMark is not found";
const INVALID_BODY: &str = "Invalid request body";

#[derive(Debug, Clone, Copy)]
enum Operation {
    Create,
    Get,
    List,
    Update,
    Delete,
}

impl Operation {
    fn success_message(self) -> &'static str {
        match self {
            Operation::Create => "Bookmark added successfully",
            Operation::Get => "BookMark is found",
            Operation::List => "Bookmarks fetched",
            Operation::Update => "BookMark is updated",
            Operation::Delete => "BookMark is deleted",
        }
    }

    fn forbidden_message(self) -> &'static str {
        match self {
            Operation::Update => "Not Authorized to update",
            Operation::Delete => "Not Authorized to delete the Bookmark",
            _ => "Not Authorized to view the Bookmark",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Operation::Create => "Failed to add bookmark",
            Operation::Get => "Failed to get BookMark",
            Operation::List => "Failed to list bookmarks",
            Operation::Update => "Unable to Update the BookMark",
            Operation::Delete => "Failed to delete BookMark",
        }
    }

    fn success_status(self) -> StatusCode {
        match self {
            Operation::Create => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }

    fn respond<T: Serialize>(self, outcome: Result<T, BookmarkError>) -> Response {
        match outcome {
            Ok(data) => APIResponse::with_data(self.success_message(), data)
                .into_response_with(self.success_status()),
            Err(err) => self.error_response(err),
        }
    }

    fn error_response(self, err: BookmarkError) -> Response {
        match err {
            BookmarkError::Validation(msg) => {
                APIResponse::failure(msg).into_response_with(StatusCode::BAD_REQUEST)
            }
            BookmarkError::MalformedBody(detail) => APIResponse::failure(INVALID_BODY)
                .with_error(detail)
                .into_response_with(StatusCode::BAD_REQUEST),
            BookmarkError::NotFound(id) => {
                tracing::debug!(bookmark_id = %id, "bookmark not found");
                APIResponse::failure(NOT_FOUND).into_response_with(StatusCode::NOT_FOUND)
            }
            BookmarkError::Forbidden { id, caller } => {
                tracing::warn!(bookmark_id = %id, caller = %caller, op = ?self, "caller does not own bookmark");
                APIResponse::failure(self.forbidden_message())
                    .into_response_with(StatusCode::FORBIDDEN)
            }
            BookmarkError::Internal(e) => {
                let detail = unpack_anyhow(&e);
                tracing::error!(error = %detail, op = ?self, "{}", self.failure_message());
                APIResponse::failure(self.failure_message())
                    .with_error(detail)
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, BookmarkError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| BookmarkError::MalformedBody(rejection.body_text()))
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    caller: CallerIdentity,
    payload: Result<Json<CreateBookmark>, JsonRejection>,
) -> Response {
    let payload = match parse_body(payload) {
        Ok(payload) => payload,
        Err(err) => return Operation::Create.error_response(err),
    };
    let store = Bookmarks::new(state.db.connection());

    let outcome = service::create_bookmark(&store, payload, &caller).await;
    if let Ok(bookmark) = &outcome {
        tracing::info!(bookmark_id = %bookmark.id, owner = %bookmark.owner, "bookmark created");
    }
    Operation::Create.respond(outcome)
}

pub async fn get_bookmark(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Response {
    let store = Bookmarks::new(state.db.connection());

    Operation::Get.respond(service::get_bookmark(&store, &id, &caller).await)
}

pub async fn list_bookmarks(
    State(state): State<AppState>,
    caller: CallerIdentity,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            return APIResponse::failure("Invalid query parameters")
                .with_error(rejection.body_text())
                .into_response_with(StatusCode::BAD_REQUEST);
        }
    };
    let store = Bookmarks::new(state.db.connection());
    let filter = params.into_filter();

    Operation::List.respond(service::list_bookmarks(&store, &filter, &caller).await)
}

pub async fn update_bookmark(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBookmark>, JsonRejection>,
) -> Response {
    let store = Bookmarks::new(state.db.connection());

    let outcome = service::update_bookmark(&store, &id, parse_body(payload), &caller).await;
    if outcome.is_ok() {
        tracing::info!(bookmark_id = %id, owner = %caller.user_id(), "bookmark updated");
    }
    Operation::Update.respond(outcome)
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Response {
    let store = Bookmarks::new(state.db.connection());

    match service::delete_bookmark(&store, &id, &caller).await {
        Ok(()) => {
            tracing::info!(bookmark_id = %id, owner = %caller.user_id(), "bookmark deleted");
            APIResponse::new_from_msg(Operation::Delete.success_message())
                .into_response_with(StatusCode::OK)
        }
        Err(err) => Operation::Delete.error_response(err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{HeaderName, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::Operation;
    use crate::db::Database;
    use crate::error::BookmarkError;
    use crate::handler::{AppState, router};

    struct TestApp {
        _dir: tempfile::TempDir,
        router: Router,
    }

    async fn test_app() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_local(&dir.path().join("bookmarks.db")).await.unwrap();
        let state = AppState {
            db: Arc::new(db),
            identity_header: HeaderName::from_static("x-user-id"),
        };
        TestApp {
            _dir: dir,
            router: router(state),
        }
    }

    impl TestApp {
        async fn call(&self, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
            let mut request = Request::builder().method(method).uri(uri);
            if let Some(user) = user {
                request = request.header("x-user-id", user);
            }
            let request = match body {
                Some(body) => request
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string())),
                None => request.body(Body::empty()),
            }
            .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn create_docs(&self, user: &str) -> Value {
            let (status, body) = self
                .call(
                    "POST",
                    "/bookmarks",
                    Some(user),
                    Some(json!({ "title": "Docs", "url": "https://x.test", "tags": ["ref"] })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body["data"].clone()
        }
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let app = test_app().await;

        let (status, body) = app.call("GET", "/", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "ok", "success": true }));
    }

    #[tokio::test]
    async fn create_returns_owned_record_with_defaults() {
        let app = test_app().await;

        let (status, body) = app
            .call(
                "POST",
                "/bookmarks",
                Some("alice"),
                Some(json!({ "title": "Docs", "url": "https://x.test" })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Bookmark added successfully");
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["owner"], "alice");
        assert_eq!(body["data"]["tags"], json!([]));
        assert_eq!(body["data"]["isFavorite"], false);
        assert!(body["data"]["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn create_with_empty_title_is_bad_request() {
        let app = test_app().await;

        let (status, body) = app
            .call(
                "POST",
                "/bookmarks",
                Some("alice"),
                Some(json!({ "title": "", "url": "https://x.test" })),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Please provide title and url", "success": false }));

        let (_, listed) = app.call("GET", "/bookmarks", Some("alice"), None).await;
        assert_eq!(listed["data"], json!([]));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request_envelope() {
        let app = test_app().await;

        let (status, body) = app
            .call("POST", "/bookmarks", Some("alice"), Some(json!({ "title": 5, "url": "u" })))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid request body");
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let app = test_app().await;

        let (status, body) = app
            .call("POST", "/bookmarks", None, Some(json!({ "title": "Docs", "url": "https://x.test" })))
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Not Authorized, no user identity");
    }

    #[tokio::test]
    async fn non_owner_delete_is_forbidden_and_keeps_record() {
        let app = test_app().await;
        let created = app.create_docs("alice").await;
        let uri = format!("/bookmarks/{}", created["id"].as_str().unwrap());

        let (status, body) = app.call("DELETE", &uri, Some("bob"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body,
            json!({ "message": "Not Authorized to delete the Bookmark", "success": false })
        );

        let (status, body) = app.call("GET", &uri, Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], created);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_not_found() {
        let app = test_app().await;

        let (status, body) = app.call("DELETE", "/bookmarks/does-not-exist", Some("alice"), None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "BookMark is not found", "success": false }));
    }

    #[tokio::test]
    async fn owner_delete_removes_record() {
        let app = test_app().await;
        let created = app.create_docs("alice").await;
        let uri = format!("/bookmarks/{}", created["id"].as_str().unwrap());

        let (status, body) = app.call("DELETE", &uri, Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "BookMark is deleted", "success": true }));

        let (status, _) = app.call("GET", &uri, Some("alice"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn favorite_toggle_leaves_other_fields_alone() {
        let app = test_app().await;
        let created = app.create_docs("alice").await;
        let uri = format!("/bookmarks/{}", created["id"].as_str().unwrap());

        let (status, body) = app
            .call("PUT", &uri, Some("alice"), Some(json!({ "isFavorite": true })))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "BookMark is updated");
        let updated = &body["data"];
        assert_eq!(updated["isFavorite"], true);
        for field in ["id", "title", "url", "tags", "owner", "createdAt"] {
            assert_eq!(updated[field], created[field], "{field}");
        }
    }

    #[tokio::test]
    async fn non_owner_update_is_forbidden() {
        let app = test_app().await;
        let created = app.create_docs("alice").await;
        let uri = format!("/bookmarks/{}", created["id"].as_str().unwrap());

        let (status, body) = app
            .call("PATCH", &uri, Some("bob"), Some(json!({ "title": "Mine now" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not Authorized to update");

        let (_, body) = app.call("GET", &uri, Some("alice"), None).await;
        assert_eq!(body["data"]["title"], "Docs");
    }

    #[tokio::test]
    async fn update_with_null_field_is_bad_request() {
        let app = test_app().await;
        let created = app.create_docs("alice").await;
        let uri = format!("/bookmarks/{}", created["id"].as_str().unwrap());

        let (status, body) = app
            .call("PUT", &uri, Some("alice"), Some(json!({ "title": null })))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn list_is_scoped_and_filterable() {
        let app = test_app().await;
        app.create_docs("alice").await;
        app.call(
            "POST",
            "/bookmarks",
            Some("alice"),
            Some(json!({ "title": "Blog", "url": "https://b.test", "isFavorite": true })),
        )
        .await;
        app.create_docs("bob").await;

        let (status, body) = app.call("GET", "/bookmarks", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Bookmarks fetched");
        let listed = body["data"].as_array().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|b| b["owner"] == "alice"));

        let (_, body) = app.call("GET", "/bookmarks?favorite=true", Some("alice"), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["title"], "Blog");

        let (_, body) = app.call("GET", "/bookmarks?tag=ref", Some("alice"), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["title"], "Docs");

        let (status, body) = app.call("GET", "/bookmarks?limit=many", Some("alice"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid query parameters");
    }

    #[tokio::test]
    async fn non_owner_cannot_read() {
        let app = test_app().await;
        let created = app.create_docs("alice").await;
        let uri = format!("/bookmarks/{}", created["id"].as_str().unwrap());

        let (status, body) = app.call("GET", &uri, Some("bob"), None).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not Authorized to view the Bookmark");
    }

    #[tokio::test]
    async fn malformed_update_on_unknown_id_is_not_found() {
        let app = test_app().await;

        let (status, body) = app
            .call("PUT", "/bookmarks/does-not-exist", Some("alice"), Some(json!({ "title": null })))
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "BookMark is not found", "success": false }));
    }

    #[tokio::test]
    async fn malformed_update_by_non_owner_is_forbidden() {
        let app = test_app().await;
        let created = app.create_docs("alice").await;
        let uri = format!("/bookmarks/{}", created["id"].as_str().unwrap());

        let (status, body) = app
            .call("PATCH", &uri, Some("bob"), Some(json!({ "tags": "x" })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not Authorized to update");

        let (status, body) = app.call("PATCH", &uri, Some("bob"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Not Authorized to update");

        let (_, body) = app.call("GET", &uri, Some("alice"), None).await;
        assert_eq!(body["data"], created);
    }

    async fn envelope(response: axum::response::Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn internal_failures_carry_operation_message_and_diagnostic() {
        for (op, message) in [
            (Operation::Create, "Failed to add bookmark"),
            (Operation::Get, "Failed to get BookMark"),
            (Operation::List, "Failed to list bookmarks"),
            (Operation::Update, "Unable to Update the BookMark"),
            (Operation::Delete, "Failed to delete BookMark"),
        ] {
            let response = op.error_response(BookmarkError::Internal(anyhow::anyhow!("boom")));
            let (status, body) = envelope(response).await;

            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                body,
                json!({ "message": message, "success": false, "error": "boom" }),
                "{op:?}"
            );
        }
    }

    #[tokio::test]
    async fn internal_failure_diagnostic_includes_context_chain() {
        let err = anyhow::anyhow!("disk full").context("saving bookmark");

        let (status, body) = envelope(Operation::Update.error_response(err.into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "saving bookmark: disk full");
    }
}
