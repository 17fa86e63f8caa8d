//! Bookmarks Module
//!
//! Per-user bookmark records (title, url, tags, favorite flag) with
//! ownership-checked CRUD over HTTP.
//!
//! # Layout
//!
//! - `model`: records and request payloads, including presence-tracking partial updates
//! - `store`: the [`BookmarkStore`] persistence trait and its libsql implementation
//! - `service`: create / get / list / update / delete with ownership checks
//! - `handler` and `routes`: axum glue that maps outcomes onto the response envelope
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookmark_service::bookmarks;
//!
//! let app = Router::new()
//!     .merge(bookmarks::routes())
//!     .with_state(app_state);
//!
//! // Or drive the operations directly
//! let store = bookmarks::Bookmarks::new(db.connection());
//! let created = bookmarks::service::create_bookmark(&store, input, &caller).await?;
//! ```

mod handler;
pub mod model;
mod routes;
pub mod service;
pub mod store;

pub use model::{Bookmark, CreateBookmark, ListFilter, NewBookmark, Patch, UpdateBookmark};
pub use routes::routes;
pub use store::{BookmarkStore, Bookmarks};

/// Schema migrations for bookmarks, applied in order at startup.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "bookmarks_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}
