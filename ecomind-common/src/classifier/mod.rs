//! Waste classification adapter
//!
//! Wraps a binary image classifier that emits a single probability and
//! thresholds it into a [`WasteLabel`]. The model runtime sits behind the
//! [`WasteModel`] trait; [`OnnxWasteModel`] is the production implementation.
//!
//! Polarity follows the label encoding used at training time:
//! probability > 0.5 is Non-Recyclable, anything else (0.5 included) is
//! Recyclable.

mod onnx;

pub use onnx::{shared_model, OnnxWasteModel};

use std::sync::Arc;

use image::{imageops::FilterType, DynamicImage};
use serde::Serialize;
use tracing::debug;

use crate::{Error, Result};

/// Square input resolution expected by the model
pub const INPUT_SIZE: u32 = 224;

/// Decision boundary on the model's probability output
pub const DECISION_THRESHOLD: f32 = 0.5;

/// Score change for a recyclable item
pub const RECYCLABLE_POINTS: i64 = 10;

/// Score change for a non-recyclable item
pub const NON_RECYCLABLE_POINTS: i64 = -5;

/// Binary classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteLabel {
    Recyclable,
    NonRecyclable,
}

impl WasteLabel {
    /// Threshold a model probability into a label
    pub fn from_probability(probability: f32) -> Self {
        if probability > DECISION_THRESHOLD {
            WasteLabel::NonRecyclable
        } else {
            WasteLabel::Recyclable
        }
    }

    /// Label as shown in the UI
    pub fn display_name(&self) -> &'static str {
        match self {
            WasteLabel::Recyclable => "Recyclable",
            WasteLabel::NonRecyclable => "Non-Recyclable",
        }
    }

    /// Disposal advice shown next to the label
    pub fn disposal_recommendation(&self) -> &'static str {
        match self {
            WasteLabel::Recyclable => "Place this item in the recycling bin.",
            WasteLabel::NonRecyclable => "Dispose this in general waste.",
        }
    }

    /// Eco score delta applied when a new upload gets this label
    pub fn score_delta(&self) -> i64 {
        match self {
            WasteLabel::Recyclable => RECYCLABLE_POINTS,
            WasteLabel::NonRecyclable => NON_RECYCLABLE_POINTS,
        }
    }
}

/// Outcome of a single classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub label: WasteLabel,
    /// Raw model output in [0, 1]
    pub probability: f32,
}

/// Preprocessed model input: RGB, 224x224, intensities scaled to [0, 1],
/// laid out NHWC with a batch of one.
#[derive(Debug, Clone)]
pub struct ModelInput {
    pixels: Vec<f32>,
}

impl ModelInput {
    /// Convert to 3-channel RGB, resize and normalize
    ///
    /// Resampling is bicubic (Catmull-Rom), matching the pipeline the model
    /// was trained against.
    pub fn from_image(image: &DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);
        let pixels = resized
            .into_raw()
            .into_iter()
            .map(|v| f32::from(v) / 255.0)
            .collect();
        Self { pixels }
    }

    /// Tensor shape `[batch, height, width, channels]`
    pub fn shape() -> [usize; 4] {
        [1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3]
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }
}

/// A binary image classifier producing one probability per image
pub trait WasteModel: Send + Sync {
    fn predict(&self, input: &ModelInput) -> Result<f32>;
}

/// Classifier adapter: preprocessing + model + threshold
///
/// Holds no model when loading failed at startup; every call then fails with
/// [`Error::ModelUnavailable`].
#[derive(Clone)]
pub struct WasteClassifier {
    model: Option<Arc<dyn WasteModel>>,
}

impl WasteClassifier {
    pub fn new(model: Arc<dyn WasteModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Adapter with no model loaded
    pub fn unavailable() -> Self {
        Self { model: None }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Classify a decoded image
    pub fn classify(&self, image: &DynamicImage) -> Result<Classification> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::ModelUnavailable("no classifier model is loaded".to_string()))?;

        let input = ModelInput::from_image(image);
        let probability = model.predict(&input)?;
        if !probability.is_finite() {
            return Err(Error::ModelUnavailable(format!(
                "model returned a non-finite probability ({})",
                probability
            )));
        }

        let label = WasteLabel::from_probability(probability);
        debug!(probability, ?label, "Classified image");
        Ok(Classification { label, probability })
    }

    /// Decode raw upload bytes (PNG/JPEG) and classify
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<Classification> {
        if !self.is_available() {
            return Err(Error::ModelUnavailable("no classifier model is loaded".to_string()));
        }
        let image = image::load_from_memory(bytes).map_err(|e| Error::ImageDecode(e.to_string()))?;
        self.classify(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba};
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Returns a fixed probability and remembers the input it saw
    struct FixedModel {
        probability: f32,
        seen: Mutex<Option<ModelInput>>,
    }

    impl FixedModel {
        fn new(probability: f32) -> Arc<Self> {
            Arc::new(Self {
                probability,
                seen: Mutex::new(None),
            })
        }
    }

    impl WasteModel for FixedModel {
        fn predict(&self, input: &ModelInput) -> Result<f32> {
            *self.seen.lock().unwrap() = Some(input.clone());
            Ok(self.probability)
        }
    }

    fn solid_png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb([255u8, 0, 51]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_threshold_polarity() {
        assert_eq!(WasteLabel::from_probability(0.0), WasteLabel::Recyclable);
        assert_eq!(WasteLabel::from_probability(0.49), WasteLabel::Recyclable);
        assert_eq!(WasteLabel::from_probability(0.5), WasteLabel::Recyclable);
        assert_eq!(WasteLabel::from_probability(0.5001), WasteLabel::NonRecyclable);
        assert_eq!(WasteLabel::from_probability(1.0), WasteLabel::NonRecyclable);
    }

    #[test]
    fn test_threshold_sweep() {
        for step in 0..=100 {
            let p = step as f32 / 100.0;
            let expected = if p > 0.5 {
                WasteLabel::NonRecyclable
            } else {
                WasteLabel::Recyclable
            };
            assert_eq!(WasteLabel::from_probability(p), expected, "p = {}", p);
        }
    }

    #[test]
    fn test_label_texts_and_deltas() {
        assert_eq!(WasteLabel::Recyclable.display_name(), "Recyclable");
        assert_eq!(WasteLabel::NonRecyclable.display_name(), "Non-Recyclable");
        assert_eq!(WasteLabel::Recyclable.score_delta(), 10);
        assert_eq!(WasteLabel::NonRecyclable.score_delta(), -5);
        assert!(WasteLabel::NonRecyclable
            .disposal_recommendation()
            .contains("general waste"));
    }

    #[test]
    fn test_preprocessing_resizes_and_normalizes() {
        let rgba = ImageBuffer::from_pixel(17, 5, Rgba([255u8, 0, 51, 10]));
        let input = ModelInput::from_image(&DynamicImage::ImageRgba8(rgba));

        assert_eq!(input.pixels().len(), 224 * 224 * 3);
        assert!(input.pixels().iter().all(|v| (0.0..=1.0).contains(v)));
        // Alpha dropped, channel order preserved
        assert!((input.pixels()[0] - 1.0).abs() < 0.005);
        assert!(input.pixels()[1].abs() < 0.005);
        assert!((input.pixels()[2] - 0.2).abs() < 0.005);
    }

    #[test]
    fn test_classify_bytes_uses_model_output() {
        let model = FixedModel::new(0.8);
        let classifier = WasteClassifier::new(model.clone());

        let result = classifier.classify_bytes(&solid_png(32, 32)).unwrap();
        assert_eq!(result.label, WasteLabel::NonRecyclable);
        assert!((result.probability - 0.8).abs() < f32::EPSILON);
        assert!(model.seen.lock().unwrap().is_some());
    }

    #[test]
    fn test_unavailable_model() {
        let classifier = WasteClassifier::unavailable();
        let err = classifier.classify_bytes(&solid_png(4, 4)).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }

    #[test]
    fn test_undecodable_bytes() {
        let classifier = WasteClassifier::new(FixedModel::new(0.1));
        let err = classifier.classify_bytes(b"definitely not a png").unwrap_err();
        assert!(matches!(err, Error::ImageDecode(_)));
    }

    #[test]
    fn test_non_finite_probability_rejected() {
        let classifier = WasteClassifier::new(FixedModel::new(f32::NAN));
        let err = classifier.classify_bytes(&solid_png(4, 4)).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable(_)));
    }
}
