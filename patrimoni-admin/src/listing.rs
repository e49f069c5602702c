//! Local list state
//!
//! Deletion is two-step: [`ListState::request_delete`] hands out a
//! [`DeleteRequest`] that must be confirmed before any request is issued,
//! and the row is pruned only once the server confirms.

use std::future::Future;

use tracing::{debug, warn};

use patrimoni_common::models::Entity;

use crate::api::ApiResult;

/// A pending, not yet confirmed deletion
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a delete request does nothing until confirmed"]
pub struct DeleteRequest {
    id: i64,
}

impl DeleteRequest {
    pub fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    items: Vec<T>,
    pending_delete: Option<i64>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pending_delete: None,
        }
    }
}

impl<T: Entity + Clone> ListState<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            pending_delete: None,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.pending_delete = None;
    }

    /// Replace the row with the same id, or put a new row first
    pub fn upsert(&mut self, item: T) {
        let existing = item
            .id()
            .and_then(|id| self.items.iter().position(|i| i.id() == Some(id)));
        match existing {
            Some(index) => self.items[index] = item,
            None => self.items.insert(0, item),
        }
    }

    /// The id awaiting confirmation, if any
    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    /// Ask to delete a listed row
    pub fn request_delete(&mut self, id: i64) -> Option<DeleteRequest> {
        if !self.items.iter().any(|i| i.id() == Some(id)) {
            return None;
        }
        self.pending_delete = Some(id);
        Some(DeleteRequest { id })
    }

    pub fn cancel_delete(&mut self, request: DeleteRequest) {
        if self.pending_delete == Some(request.id) {
            self.pending_delete = None;
        }
    }

    /// Issue the deletion and prune the row once the server confirms
    ///
    /// On failure the row stays and the error is returned.
    pub async fn confirm_delete<F, Fut>(&mut self, request: DeleteRequest, delete: F) -> ApiResult<()>
    where
        F: FnOnce(i64) -> Fut,
        Fut: Future<Output = ApiResult<()>>,
    {
        let id = request.id;
        let result = delete(id).await;
        if self.pending_delete == Some(id) {
            self.pending_delete = None;
        }
        match result {
            Ok(()) => {
                self.items.retain(|i| i.id() != Some(id));
                debug!(id, kind = %T::KIND, "Row deleted");
                Ok(())
            }
            Err(err) => {
                warn!(id, kind = %T::KIND, error = %err, "Delete failed; row kept");
                Err(err)
            }
        }
    }
}
