//! Wire-level data model shared by the legacy and target stores.
//!
//! Both stores return category-tagged entries with optional media relation
//! fields. The shapes differ just enough to matter: the legacy store spells
//! the gallery field `galery`, serves the document under `pdf` (sometimes as
//! a one-element array), and has no `documentId`; the target store uses
//! `gallery` / `dossier_de_diffusion` and identifies entries by `documentId`.
//! One lenient struct covers both sides.

use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;

/// Content categories handled by the migration, with their endpoint paths
/// and which media fields each carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Spectacles,
    Podcasts,
}

impl Category {
    pub fn all() -> [Category; 2] {
        [Category::Spectacles, Category::Podcasts]
    }

    /// Path segment used by both stores (`/{path}` legacy, `/api/{path}` target).
    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Spectacles => "spectacles",
            Category::Podcasts => "podcasts",
        }
    }

    /// Podcasts carry a single image only.
    pub fn has_gallery(&self) -> bool {
        matches!(self, Category::Spectacles)
    }

    pub fn has_document(&self) -> bool {
        matches!(self, Category::Spectacles)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// A media object as served by either store. Legacy-side identity is the
/// source URL; once uploaded to the target, identity is the assigned `id`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaAsset {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
}

impl MediaAsset {
    /// Filename for upload and gallery comparison: the declared `name`, or
    /// the last path segment of the URL.
    pub fn file_name(&self) -> String {
        if let Some(name) = self.name.as_deref() {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|mut segments| segments.next_back().map(|s| s.to_string()))
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                self.url
                    .rsplit('/')
                    .next()
                    .unwrap_or(self.url.as_str())
                    .to_string()
            })
    }

    /// Declared MIME type, or a generic binary fallback.
    pub fn mime_type(&self) -> String {
        self.mime
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }
}

/// The legacy store serves the document field either as a single object or
/// as a one-element array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DocumentField {
    One(MediaAsset),
    Many(Vec<MediaAsset>),
}

/// A content entry from either store. Fields that only exist on one side
/// are simply absent on the other.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    #[serde(default, rename = "documentId")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<MediaAsset>,
    // `galery` is the legacy store's spelling.
    #[serde(default, alias = "galery")]
    pub gallery: Option<Vec<MediaAsset>>,
    #[serde(default)]
    pub pdf: Option<DocumentField>,
    #[serde(default)]
    pub dossier_de_diffusion: Option<MediaAsset>,
}

impl ContentEntry {
    pub fn gallery_items(&self) -> &[MediaAsset] {
        self.gallery.as_deref().unwrap_or(&[])
    }

    /// Legacy document, normalized to an optional single object before
    /// diffing. A present-but-empty array counts as no document.
    pub fn legacy_document(&self) -> Option<&MediaAsset> {
        match &self.pdf {
            Some(DocumentField::One(asset)) => Some(asset),
            Some(DocumentField::Many(assets)) => assets.first(),
            None => None,
        }
    }

    pub fn target_document(&self) -> Option<&MediaAsset> {
        self.dossier_de_diffusion.as_ref()
    }
}

/// Patch value for one relation field of a target entry.
///
/// The target store accepts several wire shapes for relation updates; this
/// closed set replaces object-shape inspection. `Unset` means the field does
/// not participate in the update at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RelationPatch {
    #[default]
    Unset,
    Connect(Vec<i64>),
    Disconnect(Vec<i64>),
    SetExact(Vec<i64>),
}

impl RelationPatch {
    pub fn is_unset(&self) -> bool {
        matches!(self, RelationPatch::Unset)
    }

    /// Whether the relation ends up non-empty after applying this patch to a
    /// field whose current fill state is `currently_filled`.
    pub fn resolves_non_empty(&self, currently_filled: bool) -> bool {
        match self {
            RelationPatch::Unset => currently_filled,
            RelationPatch::Connect(ids) => !ids.is_empty() || currently_filled,
            RelationPatch::Disconnect(ids) => {
                if ids.is_empty() {
                    currently_filled
                } else {
                    false
                }
            }
            RelationPatch::SetExact(ids) => !ids.is_empty(),
        }
    }

    /// Wire value for a single-object relation field (e.g. `image`).
    /// `SetExact` of one id serializes as the bare id, matching what the
    /// target update endpoint expects for single media fields.
    pub fn to_single_value(&self) -> Option<Value> {
        match self {
            RelationPatch::Unset => None,
            RelationPatch::Connect(ids) => Some(json!({ "connect": ids })),
            RelationPatch::Disconnect(ids) => Some(json!({ "disconnect": ids })),
            RelationPatch::SetExact(ids) => match ids.as_slice() {
                [id] => Some(json!(id)),
                _ => Some(json!(ids)),
            },
        }
    }

    /// Wire value for a multi-object relation field (e.g. `gallery`).
    pub fn to_many_value(&self) -> Option<Value> {
        match self {
            RelationPatch::Unset => None,
            RelationPatch::Connect(ids) => Some(json!({ "connect": ids })),
            RelationPatch::Disconnect(ids) => Some(json!({ "disconnect": ids })),
            RelationPatch::SetExact(ids) => Some(json!(ids)),
        }
    }
}
