//! Pairing legacy entries with their target counterparts.
//!
//! Spectacles match on exact slug equality. Podcasts match on normalized
//! titles: legacy titles carry decorative `<<...>>` markup that the target
//! store does not, so both sides are stripped, trimmed and lowercased before
//! comparison.

use crate::model::{Category, ContentEntry};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::warn;

pub fn normalize_title(raw: &str) -> String {
    raw.replace("<<", "")
        .replace(">>", "")
        .trim()
        .to_lowercase()
}

/// Matching key for an entry, per category. `None` when the entry lacks the
/// key field entirely.
pub fn matching_key(category: Category, entry: &ContentEntry) -> Option<String> {
    match category {
        Category::Spectacles => entry.slug.clone().filter(|s| !s.is_empty()),
        Category::Podcasts => entry
            .title
            .as_deref()
            .map(normalize_title)
            .filter(|t| !t.is_empty()),
    }
}

/// Key -> entry lookup over the target listing. When two target entries
/// share a key the first one seen wins; the collision is surfaced as a
/// warning rather than silently resolved.
pub fn index_by_key<'a>(
    category: Category,
    entries: &'a [ContentEntry],
) -> HashMap<String, &'a ContentEntry> {
    let mut index: HashMap<String, &'a ContentEntry> = HashMap::new();
    for entry in entries {
        let Some(key) = matching_key(category, entry) else {
            continue;
        };
        match index.entry(key) {
            Entry::Occupied(existing) => {
                warn!(
                    category = %category,
                    key = %existing.key(),
                    "duplicate matching key in target store; keeping first match"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slug: Option<&str>, title: Option<&str>) -> ContentEntry {
        serde_json::from_value(serde_json::json!({
            "slug": slug,
            "title": title,
        }))
        .unwrap()
    }

    #[test]
    fn titles_normalize_markup_case_and_whitespace() {
        assert_eq!(normalize_title("<<Les Ombres>>"), "les ombres");
        assert_eq!(normalize_title("  les ombres  "), "les ombres");
        assert_eq!(
            normalize_title("<<Les Ombres>>"),
            normalize_title("les ombres")
        );
    }

    #[test]
    fn slug_matching_is_exact() {
        let a = entry(Some("les-ombres"), None);
        let b = entry(Some("les-ombres-2"), None);
        assert_ne!(
            matching_key(Category::Spectacles, &a),
            matching_key(Category::Spectacles, &b)
        );
    }

    #[test]
    fn podcast_key_uses_normalized_title() {
        let legacy = entry(None, Some("<<Les Ombres>>"));
        let target = entry(None, Some("les ombres"));
        assert_eq!(
            matching_key(Category::Podcasts, &legacy),
            matching_key(Category::Podcasts, &target)
        );
    }

    #[test]
    fn missing_key_fields_yield_no_key() {
        let blank = entry(None, None);
        assert_eq!(matching_key(Category::Spectacles, &blank), None);
        assert_eq!(matching_key(Category::Podcasts, &blank), None);
    }

    #[test]
    fn duplicate_keys_keep_first_entry() {
        let first = entry(Some("dup"), Some("first"));
        let second = entry(Some("dup"), Some("second"));
        let entries = vec![first, second];
        let index = index_by_key(Category::Spectacles, &entries);
        assert_eq!(index.len(), 1);
        assert_eq!(index["dup"].title.as_deref(), Some("first"));
    }
}
