//! Feature extraction pipeline
//!
//! Runs the stages on one decoded raster, strictly in order:
//! 1. Palette clustering (`palette_size` colors, dominant color first)
//! 2. Garment region detection
//! 3. Garment classification from the region
//! 4. Single-color clustering and color tagging
//!
//! Stage-local failures degrade to sentinels (fallback box, `unknown`
//! type, no tag). Only an empty raster is a hard error. Persistence is
//! best effort: a failing store is logged and the record is still returned.

use std::time::Instant;

use image::RgbImage;
use indexmap::IndexSet;
use log::{debug, info, warn};

use crate::color::{ColorClusterer, TagDeriver};
use crate::config::PipelineConfig;
use crate::constants;
use crate::detection::{GarmentClassifier, RegionDetector};
use crate::error::{AnalysisError, Result};
use crate::storage::FeatureStore;
use crate::FeatureRecord;

/// Composition of the four extraction stages
///
/// Holds no per-image state, so one pipeline can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    clusterer: ColorClusterer,
    detector: RegionDetector,
    classifier: GarmentClassifier,
    tagger: TagDeriver,
    palette_size: usize,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FeaturePipeline {
    /// Create a pipeline with default parameters for every stage
    pub fn new() -> Self {
        Self {
            clusterer: ColorClusterer::new(),
            detector: RegionDetector::new(),
            classifier: GarmentClassifier::new(),
            tagger: TagDeriver::new(),
            palette_size: constants::clustering::PALETTE_SIZE,
        }
    }

    /// Create a pipeline from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidParameter` if the configuration fails
    /// [`PipelineConfig::validate`].
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            clusterer: ColorClusterer::from_config(&config.clustering),
            detector: RegionDetector::from_config(&config.region_detection),
            classifier: GarmentClassifier::from_config(&config.classification),
            tagger: TagDeriver::with_rules(config.tagging.rules.clone()),
            palette_size: config.clustering.palette_size,
        })
    }

    /// Extract the feature record of one photograph
    ///
    /// When `store` is given the record is saved exactly once after it is
    /// assembled. A save failure is logged and does not affect the result.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidImage` if the raster has no pixels.
    pub fn process(
        &self,
        image: &RgbImage,
        image_url: &str,
        owner_id: &str,
        store: Option<&dyn FeatureStore>,
    ) -> Result<FeatureRecord> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidImage {
                reason: format!("raster has no pixels ({}x{})", width, height),
            });
        }
        let started = Instant::now();

        // Step 1: palette, most populous first
        let stage = Instant::now();
        let palette = self.clusterer.cluster(image, self.palette_size);
        let dominant_color = *palette.first().ok_or_else(|| AnalysisError::InvalidImage {
            reason: "no colors could be clustered".to_string(),
        })?;
        debug!("Palette of {} colors in {:?}", palette.len(), stage.elapsed());

        // Step 2: garment region
        let stage = Instant::now();
        let bounding_box = self.detector.detect(image);
        debug!("Region {:?} in {:?}", bounding_box, stage.elapsed());
        if bounding_box.is_empty() {
            warn!("No garment region found in {}, using fallback box", image_url);
        }

        // Step 3: garment type
        let clothing_type = self.classifier.classify(&bounding_box);

        // Step 4: tag from the overall mean color
        let stage = Instant::now();
        let mut tags = IndexSet::new();
        if let Some(mean) = self.clusterer.cluster(image, 1).first() {
            if let Some(tag) = self.tagger.tag(*mean) {
                tags.insert(tag.as_str().to_string());
            }
        }
        debug!("Tags {:?} in {:?}", tags, stage.elapsed());

        let record = FeatureRecord {
            dominant_color,
            palette,
            bounding_box,
            clothing_type,
            tags,
            source_image_url: image_url.to_string(),
            owner_id: owner_id.to_string(),
        };

        if let Some(store) = store {
            match store.save(&record) {
                Ok(id) => info!("Saved features for {} as {}", record.source_image_url, id),
                Err(e) => warn!(
                    "Could not save features for {}: {}",
                    record.source_image_url, e
                ),
            }
        }

        debug!(
            "Processed {}x{} image for {} in {:?}",
            width,
            height,
            owner_id,
            started.elapsed()
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryFeatureStore, StoredId};
    use crate::{BoundingBox, ClothingType, ColorSample};
    use image::Rgb;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that always fails and counts its calls
    #[derive(Default)]
    struct FailingStore {
        calls: AtomicUsize,
    }

    impl FeatureStore for FailingStore {
        fn save(&self, _record: &FeatureRecord) -> Result<StoredId> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AnalysisError::persistence("database unavailable"))
        }
    }

    fn silhouette() -> RgbImage {
        RgbImage::from_fn(100, 200, |x, y| {
            if (45..55).contains(&x) && (20..180).contains(&y) {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    #[test]
    fn test_silhouette_record() {
        let record = FeaturePipeline::new()
            .process(&silhouette(), "https://cdn/u1/a.png", "u1", None)
            .unwrap();

        assert_eq!(record.bounding_box, BoundingBox::new(45, 20, 10, 160));
        assert_eq!(record.clothing_type, ClothingType::FullBody);
        assert_eq!(record.dominant_color, ColorSample::new(255, 255, 255));
        assert_eq!(record.palette.len(), 2);
        assert!(record.has_tag("white"));
        assert_eq!(record.tags.len(), 1);
        assert_eq!(record.owner_id, "u1");
        assert_eq!(record.source_image_url, "https://cdn/u1/a.png");
    }

    #[test]
    fn test_uniform_image_degrades() {
        let image = RgbImage::from_pixel(30, 30, Rgb([128, 128, 128]));
        let record = FeaturePipeline::new().process(&image, "url", "owner", None).unwrap();

        assert_eq!(record.bounding_box, BoundingBox::EMPTY);
        assert_eq!(record.clothing_type, ClothingType::Unknown);
        assert!(record.tags.is_empty());
        assert_eq!(record.palette, vec![ColorSample::new(128, 128, 128)]);
    }

    #[test]
    fn test_empty_raster_fails_fast() {
        let store = InMemoryFeatureStore::new();
        let err = FeaturePipeline::new()
            .process(&RgbImage::new(0, 10), "url", "owner", Some(&store))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidImage { .. }));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_process_is_idempotent() {
        let pipeline = FeaturePipeline::new();
        let image = silhouette();
        let first = pipeline.process(&image, "url", "owner", None).unwrap();
        let second = pipeline.process(&image, "url", "owner", None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_store_receives_record_once() {
        let store = InMemoryFeatureStore::new();
        let record = FeaturePipeline::new()
            .process(&silhouette(), "url", "owner", Some(&store))
            .unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get(StoredId(0)).unwrap(), Some(record));
    }

    #[test]
    fn test_store_failure_does_not_alter_record() {
        let pipeline = FeaturePipeline::new();
        let image = silhouette();
        let store = FailingStore::default();

        let without = pipeline.process(&image, "url", "owner", None).unwrap();
        let with = pipeline.process(&image, "url", "owner", Some(&store)).unwrap();

        assert_eq!(with, without);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_applies_sections() {
        let mut config = PipelineConfig::default();
        config.clustering.palette_size = 1;
        config.classification.pants_max_ratio = 20.0;

        let record = FeaturePipeline::from_config(&config)
            .unwrap()
            .process(&silhouette(), "url", "owner", None)
            .unwrap();
        assert_eq!(record.palette.len(), 1);
        assert_eq!(record.clothing_type, ClothingType::Pants);
    }

    #[test]
    fn test_oversized_palette_is_bounded_by_colors() {
        let mut config = PipelineConfig::default();
        config.clustering.palette_size = usize::MAX;

        let record = FeaturePipeline::from_config(&config)
            .unwrap()
            .process(&silhouette(), "url", "owner", None)
            .unwrap();
        assert_eq!(
            record.palette,
            vec![ColorSample::new(255, 255, 255), ColorSample::new(0, 0, 0)]
        );
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let mut config = PipelineConfig::default();
        config.clustering.palette_size = 0;
        let err = FeaturePipeline::from_config(&config).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParameter { .. }));
    }
}
