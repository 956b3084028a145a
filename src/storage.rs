//! Persistence of extracted feature records
//!
//! The pipeline hands each record to a [`FeatureStore`] exactly once and
//! never reads it back. [`InMemoryFeatureStore`] is a wardrobe store that
//! also answers the per-owner queries used by outfit recommendation.

use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, ClothingType, FeatureRecord, Result};

/// Identifier assigned by a store to a saved record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoredId(pub u64);

impl fmt::Display for StoredId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability to persist one feature record
///
/// Records are keyed by `(owner_id, source_image_url)`. Implementations own
/// their concurrency discipline.
pub trait FeatureStore: Send + Sync {
    fn save(&self, record: &FeatureRecord) -> Result<StoredId>;
}

#[derive(Debug, Default)]
struct Entries {
    next_id: u64,
    rows: Vec<(StoredId, FeatureRecord)>,
}

/// Thread-safe in-memory wardrobe
#[derive(Debug, Default)]
pub struct InMemoryFeatureStore {
    entries: RwLock<Entries>,
}

impl InMemoryFeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> Result<usize> {
        self.read(|entries| entries.rows.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// Look up a record by id
    pub fn get(&self, id: StoredId) -> Result<Option<FeatureRecord>> {
        self.read(|entries| {
            entries
                .rows
                .iter()
                .find(|(stored, _)| *stored == id)
                .map(|(_, record)| record.clone())
        })
    }

    /// Records of one owner in insertion order, paginated
    pub fn by_owner(&self, owner_id: &str, skip: usize, limit: usize) -> Result<Vec<FeatureRecord>> {
        self.filtered(|record| record.owner_id == owner_id)
            .map(|records| records.into_iter().skip(skip).take(limit).collect())
    }

    /// Records of one owner with the given garment type
    pub fn by_clothing_type(&self, owner_id: &str, clothing_type: ClothingType) -> Result<Vec<FeatureRecord>> {
        self.filtered(|record| record.owner_id == owner_id && record.clothing_type == clothing_type)
    }

    /// Records of one owner carrying at least one of `tags`
    pub fn search_by_tags(&self, owner_id: &str, tags: &[&str]) -> Result<Vec<FeatureRecord>> {
        self.filtered(|record| record.owner_id == owner_id && tags.iter().any(|tag| record.has_tag(tag)))
    }

    /// Entire wardrobe of one owner
    pub fn wardrobe(&self, owner_id: &str) -> Result<Vec<FeatureRecord>> {
        self.filtered(|record| record.owner_id == owner_id)
    }

    fn filtered<F>(&self, predicate: F) -> Result<Vec<FeatureRecord>>
    where
        F: Fn(&FeatureRecord) -> bool,
    {
        self.read(|entries| {
            entries
                .rows
                .iter()
                .map(|(_, record)| record)
                .filter(|record| predicate(*record))
                .cloned()
                .collect()
        })
    }

    fn read<T>(&self, f: impl FnOnce(&Entries) -> T) -> Result<T> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AnalysisError::persistence("wardrobe store lock poisoned"))?;
        Ok(f(&entries))
    }
}

impl FeatureStore for InMemoryFeatureStore {
    /// Insert, or replace the record already stored for the same owner and image
    fn save(&self, record: &FeatureRecord) -> Result<StoredId> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AnalysisError::persistence("wardrobe store lock poisoned"))?;

        let existing = entries.rows.iter_mut().find(|(_, stored)| {
            stored.owner_id == record.owner_id && stored.source_image_url == record.source_image_url
        });
        if let Some((id, stored)) = existing {
            *stored = record.clone();
            return Ok(*id);
        }

        let id = StoredId(entries.next_id);
        entries.next_id += 1;
        entries.rows.push((id, record.clone()));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundingBox, ColorSample};

    fn record(owner: &str, url: &str, clothing_type: ClothingType, tags: &[&str]) -> FeatureRecord {
        FeatureRecord {
            dominant_color: ColorSample::new(255, 0, 0),
            palette: vec![ColorSample::new(255, 0, 0)],
            bounding_box: BoundingBox::new(10, 10, 100, 100),
            clothing_type,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            source_image_url: url.to_string(),
            owner_id: owner.to_string(),
        }
    }

    fn sample_wardrobe() -> InMemoryFeatureStore {
        let store = InMemoryFeatureStore::new();
        store.save(&record("test_user", "https://example.com/shirt1.jpg", ClothingType::Shirt, &["red"])).unwrap();
        store.save(&record("test_user", "https://example.com/pants1.jpg", ClothingType::Pants, &["blue"])).unwrap();
        store.save(&record("test_user", "https://example.com/shirt2.jpg", ClothingType::Shirt, &["green"])).unwrap();
        store.save(&record("other_user", "https://example.com/pants2.jpg", ClothingType::Pants, &["black"])).unwrap();
        store
    }

    #[test]
    fn test_save_assigns_sequential_ids() {
        let store = InMemoryFeatureStore::new();
        let first = store.save(&record("u", "a", ClothingType::Shirt, &[])).unwrap();
        let second = store.save(&record("u", "b", ClothingType::Shirt, &[])).unwrap();
        assert_eq!(first, StoredId(0));
        assert_eq!(second, StoredId(1));
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_save_upserts_same_owner_and_url() {
        let store = InMemoryFeatureStore::new();
        let id = store.save(&record("u", "a", ClothingType::Shirt, &["red"])).unwrap();
        let again = store.save(&record("u", "a", ClothingType::Pants, &["blue"])).unwrap();
        assert_eq!(id, again);
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get(id).unwrap().unwrap().clothing_type, ClothingType::Pants);

        // same url, different owner is a separate item
        store.save(&record("v", "a", ClothingType::Shirt, &[])).unwrap();
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_wardrobe_is_per_owner() {
        let store = sample_wardrobe();
        let wardrobe = store.wardrobe("test_user").unwrap();
        assert_eq!(wardrobe.len(), 3);
        assert_eq!(wardrobe[0].clothing_type, ClothingType::Shirt);
        assert!(wardrobe[0].has_tag("red"));
        assert!(store.wardrobe("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_by_owner_paginates() {
        let store = sample_wardrobe();
        let page = store.by_owner("test_user", 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].source_image_url, "https://example.com/pants1.jpg");
    }

    #[test]
    fn test_by_clothing_type() {
        let store = sample_wardrobe();
        let shirts = store.by_clothing_type("test_user", ClothingType::Shirt).unwrap();
        assert_eq!(shirts.len(), 2);
        assert!(store.by_clothing_type("test_user", ClothingType::FullBody).unwrap().is_empty());
    }

    #[test]
    fn test_search_by_tags_matches_any() {
        let store = sample_wardrobe();
        let found = store.search_by_tags("test_user", &["green", "blue"]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(store.search_by_tags("test_user", &["black"]).unwrap().is_empty());
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let store = sample_wardrobe();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.entries.write().unwrap();
            panic!("writer crashed");
        }));

        assert!(matches!(store.len(), Err(AnalysisError::PersistenceError { .. })));
        assert!(store.is_empty().is_err());
        assert!(store.wardrobe("test_user").is_err());
        assert!(store.save(&record("u", "a", ClothingType::Shirt, &[])).is_err());
    }

    #[test]
    fn test_get_unknown_id() {
        let store = sample_wardrobe();
        assert!(store.get(StoredId(99)).unwrap().is_none());
    }
}
