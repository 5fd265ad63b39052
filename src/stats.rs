//! Per-category migration counters, threaded through each category run and
//! merged by the orchestrator. Counters accumulate and are never reset
//! mid-run.

use crate::model::Category;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub images: u32,
    pub gallery_items: u32,
    pub documents: u32,
    pub skipped: u32,
    pub errors: u32,
}

impl CategoryStats {
    pub fn absorb(&mut self, other: &CategoryStats) {
        self.images += other.images;
        self.gallery_items += other.gallery_items;
        self.documents += other.documents;
        self.skipped += other.skipped;
        self.errors += other.errors;
    }
}

/// Cross-category totals plus the per-category breakdown, reported at the
/// end of each category and again at program exit.
#[derive(Debug, Default, Clone)]
pub struct RunStatistics {
    pub totals: CategoryStats,
    pub categories: Vec<(Category, CategoryStats)>,
}

impl RunStatistics {
    pub fn record(&mut self, category: Category, stats: CategoryStats) {
        self.totals.absorb(&stats);
        self.categories.push((category, stats));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_sums_every_counter() {
        let mut a = CategoryStats {
            images: 1,
            gallery_items: 2,
            documents: 3,
            skipped: 4,
            errors: 5,
        };
        let b = CategoryStats {
            images: 10,
            gallery_items: 20,
            documents: 30,
            skipped: 40,
            errors: 50,
        };
        a.absorb(&b);
        assert_eq!(
            a,
            CategoryStats {
                images: 11,
                gallery_items: 22,
                documents: 33,
                skipped: 44,
                errors: 55,
            }
        );
    }

    #[test]
    fn run_statistics_merges_categories() {
        let mut run = RunStatistics::default();
        run.record(
            Category::Spectacles,
            CategoryStats {
                images: 2,
                gallery_items: 5,
                ..Default::default()
            },
        );
        run.record(
            Category::Podcasts,
            CategoryStats {
                images: 1,
                skipped: 3,
                ..Default::default()
            },
        );
        assert_eq!(run.totals.images, 3);
        assert_eq!(run.totals.gallery_items, 5);
        assert_eq!(run.totals.skipped, 3);
        assert_eq!(run.categories.len(), 2);
    }
}
