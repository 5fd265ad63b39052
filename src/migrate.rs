//! Media migration and entry updates for one matched pair.
//!
//! `MediaMigrator` moves a single media object: one download attempt from
//! the legacy URL (the legacy store is static, so failures there are not
//! treated as transient), then an upload through the injected executor,
//! then a fixed pacing pause to respect the target API's rate limits. The
//! pause is taken in dry-run mode too; only the upload itself is a no-op
//! there.

use crate::error::MigrateError;
use crate::executor::TargetExecutor;
use crate::model::{Category, MediaAsset, RelationPatch};
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

pub struct MediaMigrator {
    http: reqwest::Client,
    executor: Arc<dyn TargetExecutor>,
    pacing: Duration,
}

impl MediaMigrator {
    pub fn new(http: reqwest::Client, executor: Arc<dyn TargetExecutor>, pacing: Duration) -> Self {
        Self {
            http,
            executor,
            pacing,
        }
    }

    /// Download the legacy payload and re-upload it to the target. Returns
    /// the new target-side asset id.
    pub async fn migrate_media(&self, asset: &MediaAsset) -> Result<i64, MigrateError> {
        let file_name = asset.file_name();
        info!(file = %file_name, "downloading");
        let payload = self.download(asset).await?;
        info!(file = %file_name, kb = payload.len() / 1024, "uploading");
        let id = self
            .executor
            .upload_asset(payload, &file_name, &asset.mime_type())
            .await?;
        sleep(self.pacing).await;
        Ok(id)
    }

    async fn download(&self, asset: &MediaAsset) -> Result<Bytes, MigrateError> {
        let resp = self.http.get(&asset.url).send().await.map_err(|e| {
            MigrateError::DownloadFailed {
                url: asset.url.clone(),
                detail: e.to_string(),
            }
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MigrateError::DownloadFailed {
                url: asset.url.clone(),
                detail: format!("HTTP {}", status.as_u16()),
            });
        }
        resp.bytes()
            .await
            .map_err(|e| MigrateError::DownloadFailed {
                url: asset.url.clone(),
                detail: e.to_string(),
            })
    }
}

/// Relation patches for one target entry, assembled while the pair's media
/// fields are migrated and applied in a single update at the end.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntryPatch {
    pub image: RelationPatch,
    pub gallery: RelationPatch,
    pub document: RelationPatch,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.image.is_unset() && self.gallery.is_unset() && self.document.is_unset()
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if !self.image.is_unset() {
            names.push("image");
        }
        if !self.gallery.is_unset() {
            names.push("gallery");
        }
        if !self.document.is_unset() {
            names.push("dossier_de_diffusion");
        }
        names
    }

    /// Update body carrying only the fields that changed; `None` when
    /// nothing did.
    pub fn into_body(self) -> Option<Value> {
        let mut fields = serde_json::Map::new();
        if let Some(v) = self.image.to_single_value() {
            fields.insert("image".into(), v);
        }
        if let Some(v) = self.gallery.to_many_value() {
            fields.insert("gallery".into(), v);
        }
        if let Some(v) = self.document.to_single_value() {
            fields.insert("dossier_de_diffusion".into(), v);
        }
        if fields.is_empty() {
            None
        } else {
            Some(Value::Object(fields))
        }
    }
}

/// Issue at most one update per matched pair, skipping the network call
/// entirely when no field changed. Returns whether an update was sent.
pub async fn apply_update(
    executor: &dyn TargetExecutor,
    category: Category,
    document_id: &str,
    patch: EntryPatch,
) -> Result<bool, MigrateError> {
    let fields = patch.field_names();
    let Some(body) = patch.into_body() else {
        info!(document_id, "nothing to update");
        return Ok(false);
    };
    info!(document_id, fields = ?fields, "updating entry");
    executor.update_entry(category, document_id, body).await?;
    Ok(true)
}
