//! Read access to the legacy store.

use crate::error::MigrateError;
use crate::model::{Category, ContentEntry};
use crate::retry::{RetryClient, RetryPolicy};

/// The legacy store is small and frozen; one request at the page-size
/// ceiling returns the full set, so there is no pagination loop.
const LEGACY_PAGE_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct LegacyStore {
    client: RetryClient,
    base: String,
}

impl LegacyStore {
    pub fn new(client: RetryClient, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
        }
    }

    /// `GET {base}/{category}?_limit=100`, unauthenticated. Retry
    /// exhaustion surfaces as `SourceUnavailable` and aborts the category.
    pub async fn list_entries(&self, category: Category) -> Result<Vec<ContentEntry>, MigrateError> {
        let url = format!("{}/{}", self.base, category.endpoint());
        let query = [("_limit", LEGACY_PAGE_LIMIT.to_string())];
        self.client
            .get_json(&url, &query, None, RetryPolicy::fetch())
            .await
            .map_err(|e| MigrateError::SourceUnavailable(Box::new(e)))
    }
}
