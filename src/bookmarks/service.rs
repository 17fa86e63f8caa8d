//! Bookmark operations, independent of HTTP.
//!
//! Each operation loads what it needs from a [`BookmarkStore`], checks that the
//! caller owns the record, and returns a typed outcome. Concurrent writers are
//! not coordinated; the last save wins.

use super::model::{Bookmark, CreateBookmark, ListFilter, UpdateBookmark};
use super::store::BookmarkStore;
use crate::error::BookmarkError;
use crate::identity::CallerIdentity;

pub async fn create_bookmark<S: BookmarkStore + ?Sized>(
    store: &S,
    input: CreateBookmark,
    caller: &CallerIdentity,
) -> Result<Bookmark, BookmarkError> {
    let attrs = input
        .into_new(caller.user_id())
        .map_err(BookmarkError::Validation)?;

    Ok(store.create(attrs).await?)
}

pub async fn get_bookmark<S: BookmarkStore + ?Sized>(
    store: &S,
    id: &str,
    caller: &CallerIdentity,
) -> Result<Bookmark, BookmarkError> {
    find_owned(store, id, caller).await
}

pub async fn list_bookmarks<S: BookmarkStore + ?Sized>(
    store: &S,
    filter: &ListFilter,
    caller: &CallerIdentity,
) -> Result<Vec<Bookmark>, BookmarkError> {
    Ok(store.list_by_owner(caller.user_id(), filter).await?)
}

/// Applies a partial update. `input` is the already-parsed request body; a body
/// that failed to parse is only reported once the record exists and the caller
/// owns it.
pub async fn update_bookmark<S: BookmarkStore + ?Sized>(
    store: &S,
    id: &str,
    input: Result<UpdateBookmark, BookmarkError>,
    caller: &CallerIdentity,
) -> Result<Bookmark, BookmarkError> {
    let mut bookmark = find_owned(store, id, caller).await?;
    let input = input?;

    if !input.merge_into(&mut bookmark) {
        return Ok(bookmark);
    }

    Ok(store.save(&bookmark).await?)
}

pub async fn delete_bookmark<S: BookmarkStore + ?Sized>(
    store: &S,
    id: &str,
    caller: &CallerIdentity,
) -> Result<(), BookmarkError> {
    let bookmark = find_owned(store, id, caller).await?;
    store.delete_one(&bookmark).await?;
    Ok(())
}

async fn find_owned<S: BookmarkStore + ?Sized>(
    store: &S,
    id: &str,
    caller: &CallerIdentity,
) -> Result<Bookmark, BookmarkError> {
    let bookmark = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| BookmarkError::NotFound(id.to_string()))?;

    if bookmark.owner != caller.user_id() {
        return Err(BookmarkError::Forbidden {
            id: id.to_string(),
            caller: caller.user_id().to_string(),
        });
    }

    Ok(bookmark)
}
