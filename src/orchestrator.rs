//! Drives the per-category pipeline: read legacy, read target, match, then
//! diff/migrate/update each pair.
//!
//! A read-phase failure aborts the current category only; the other
//! category still runs. Each pair is processed under isolated error
//! handling, so one entry's failure increments the error counter and the
//! run moves on. Everything is sequential on purpose: one category, one
//! pair, one media field, one gallery item at a time, which together with
//! the post-upload pacing keeps the tool inside the target API's rate
//! limits.

use crate::diff::{self, MediaFieldDiff};
use crate::error::MigrateError;
use crate::executor::TargetExecutor;
use crate::matching;
use crate::migrate::{self, EntryPatch, MediaMigrator};
use crate::model::{Category, ContentEntry, RelationPatch};
use crate::stats::{CategoryStats, RunStatistics};
use crate::store::legacy::LegacyStore;
use crate::store::target::TargetStore;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct Orchestrator {
    legacy: LegacyStore,
    target: TargetStore,
    migrator: MediaMigrator,
    executor: Arc<dyn TargetExecutor>,
}

impl Orchestrator {
    pub fn new(
        legacy: LegacyStore,
        target: TargetStore,
        migrator: MediaMigrator,
        executor: Arc<dyn TargetExecutor>,
    ) -> Self {
        Self {
            legacy,
            target,
            migrator,
            executor,
        }
    }

    /// Runs every category and merges their statistics. Never aborts the
    /// whole run on a single category's failure.
    pub async fn run(&self) -> RunStatistics {
        let mut run_stats = RunStatistics::default();
        for category in Category::all() {
            info!(category = %category, "========== migrating category ==========");
            match self.run_category(category).await {
                Ok(stats) => {
                    info!(
                        category = %category,
                        images = stats.images,
                        gallery_items = stats.gallery_items,
                        documents = stats.documents,
                        skipped = stats.skipped,
                        errors = stats.errors,
                        "category summary"
                    );
                    run_stats.record(category, stats);
                }
                Err(err) => {
                    error!(category = %category, error = %err, "category migration aborted");
                    run_stats.record(
                        category,
                        CategoryStats {
                            errors: 1,
                            ..Default::default()
                        },
                    );
                }
            }
        }
        info!("========== migration complete ==========");
        run_stats
    }

    async fn run_category(&self, category: Category) -> Result<CategoryStats, MigrateError> {
        let legacy_entries = self.legacy.list_entries(category).await?;
        let target_entries = self.target.list_entries(category).await?;
        info!(
            category = %category,
            legacy = legacy_entries.len(),
            target = target_entries.len(),
            "listings loaded"
        );
        let index = matching::index_by_key(category, &target_entries);

        let mut stats = CategoryStats::default();
        for legacy_entry in &legacy_entries {
            let Some(key) = matching::matching_key(category, legacy_entry) else {
                warn!(category = %category, "legacy entry has no matching key; skipping");
                stats.skipped += 1;
                continue;
            };
            let Some(target_entry) = index.get(key.as_str()).copied() else {
                info!(category = %category, key = %key, "no target match; skipping");
                stats.skipped += 1;
                continue;
            };
            if let Err(err) = self
                .process_pair(category, &key, legacy_entry, target_entry, &mut stats)
                .await
            {
                error!(category = %category, key = %key, error = %err, "entry migration failed");
                stats.errors += 1;
            }
        }
        Ok(stats)
    }

    async fn process_pair(
        &self,
        category: Category,
        key: &str,
        legacy: &ContentEntry,
        target: &ContentEntry,
        stats: &mut CategoryStats,
    ) -> Result<(), MigrateError> {
        let Some(document_id) = target.document_id.as_deref() else {
            warn!(key, "target entry has no documentId; cannot update");
            stats.errors += 1;
            return Ok(());
        };
        info!(key, document_id, "processing entry");

        let diff = diff::diff_pair(category, legacy, target);
        let mut patch = EntryPatch::default();

        if let MediaFieldDiff::Absent = diff.image {
            if let Some(asset) = &legacy.image {
                info!(key, "[image] missing on target; migrating");
                let id = self.migrator.migrate_media(asset).await?;
                patch.image = RelationPatch::SetExact(vec![id]);
                stats.images += 1;
            }
        } else {
            debug!(key, "[image] already present or empty; skipping");
        }

        if let MediaFieldDiff::PartiallyPresent(missing) = &diff.gallery {
            info!(
                key,
                have = target.gallery_items().len(),
                want = legacy.gallery_items().len(),
                migrating = missing.len(),
                "[gallery] completing partial gallery"
            );
            // Never remove or reorder what the target already holds; new
            // ids are appended after the existing ones.
            let existing: Vec<i64> = target.gallery_items().iter().filter_map(|g| g.id).collect();
            let mut uploaded = Vec::new();
            for item in missing {
                match self.migrator.migrate_media(item).await {
                    Ok(id) => {
                        uploaded.push(id);
                        stats.gallery_items += 1;
                    }
                    Err(err) => {
                        error!(key, file = %item.file_name(), error = %err, "[gallery] item migration failed");
                        stats.errors += 1;
                    }
                }
            }
            if !uploaded.is_empty() {
                let mut ids = existing;
                ids.extend(uploaded);
                patch.gallery = RelationPatch::SetExact(ids);
            }
        } else {
            debug!(key, "[gallery] satisfied; skipping");
        }

        if let MediaFieldDiff::Absent = diff.document {
            if let Some(asset) = legacy.legacy_document() {
                info!(key, "[dossier_de_diffusion] missing on target; migrating");
                let id = self.migrator.migrate_media(asset).await?;
                patch.document = RelationPatch::SetExact(vec![id]);
                stats.documents += 1;
            }
        } else {
            debug!(key, "[dossier_de_diffusion] already present or empty; skipping");
        }

        migrate::apply_update(self.executor.as_ref(), category, document_id, patch).await?;
        Ok(())
    }
}
