//! Capability-scoped write access to the target store.
//!
//! The executor is selected once at startup and injected into everything
//! that mutates the target, so dry-run handling lives here instead of as
//! conditionals scattered over the call sites. The dry-run implementation
//! logs what a live run would do and never touches the network.

use crate::error::MigrateError;
use crate::model::Category;
use crate::store::target::TargetStore;
use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use tracing::info;

/// Asset id handed out by the dry-run executor in place of a real upload.
pub const DRY_RUN_ASSET_ID: i64 = -1;

#[async_trait]
pub trait TargetExecutor: Send + Sync {
    /// Upload one media payload; returns the target-assigned asset id.
    async fn upload_asset(
        &self,
        payload: Bytes,
        file_name: &str,
        mime: &str,
    ) -> Result<i64, MigrateError>;

    /// Apply one entry patch body.
    async fn update_entry(
        &self,
        category: Category,
        document_id: &str,
        data: Value,
    ) -> Result<(), MigrateError>;
}

pub struct LiveExecutor {
    store: TargetStore,
}

impl LiveExecutor {
    pub fn new(store: TargetStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TargetExecutor for LiveExecutor {
    async fn upload_asset(
        &self,
        payload: Bytes,
        file_name: &str,
        mime: &str,
    ) -> Result<i64, MigrateError> {
        let uploaded = self.store.upload_asset(payload, file_name, mime).await?;
        Ok(uploaded.id)
    }

    async fn update_entry(
        &self,
        category: Category,
        document_id: &str,
        data: Value,
    ) -> Result<(), MigrateError> {
        self.store.update_entry(category, document_id, &data).await
    }
}

pub struct DryRunExecutor;

#[async_trait]
impl TargetExecutor for DryRunExecutor {
    async fn upload_asset(
        &self,
        payload: Bytes,
        file_name: &str,
        mime: &str,
    ) -> Result<i64, MigrateError> {
        info!(
            file = %file_name,
            mime = %mime,
            kb = payload.len() / 1024,
            "[dry-run] would upload"
        );
        Ok(DRY_RUN_ASSET_ID)
    }

    async fn update_entry(
        &self,
        category: Category,
        document_id: &str,
        data: Value,
    ) -> Result<(), MigrateError> {
        info!(
            category = %category,
            document_id = %document_id,
            fields = %data,
            "[dry-run] would update entry"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_upload_returns_sentinel_id() {
        let id = DryRunExecutor
            .upload_asset(Bytes::from_static(b"abc"), "a.jpg", "image/jpeg")
            .await
            .unwrap();
        assert_eq!(id, DRY_RUN_ASSET_ID);
    }

    #[tokio::test]
    async fn dry_run_update_is_a_no_op() {
        DryRunExecutor
            .update_entry(
                Category::Spectacles,
                "doc1",
                serde_json::json!({ "image": 1 }),
            )
            .await
            .unwrap();
    }
}
