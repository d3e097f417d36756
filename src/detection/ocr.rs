use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use std::path::{Path, PathBuf};

/// ocrs does not score recognized lines, so every candidate carries this value
pub const OCRS_LINE_CONFIDENCE: f32 = 0.9;

/// One recognized text candidate for an image region
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub text: String,
    pub confidence: f32,
}

impl Recognition {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Text recognition over an image region.
///
/// Implementations are shared across request threads once loaded, and
/// return candidates in priority order.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, region: &DynamicImage) -> anyhow::Result<Vec<Recognition>>;
}

/// Recognizer that never finds text
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecognizer;

impl TextRecognizer for NullRecognizer {
    fn recognize(&self, _region: &DynamicImage) -> anyhow::Result<Vec<Recognition>> {
        Ok(Vec::new())
    }
}

/// Locations of the ocrs detection and recognition models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub detection: PathBuf,
    pub recognition: PathBuf,
}

impl ModelPaths {
    /// Models in the standard ocrs cache directory (`~/.cache/ocrs`)
    pub fn default_cache() -> anyhow::Result<Self> {
        let home_dir = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(Self::in_dir(Path::new(&home_dir).join(".cache/ocrs")))
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection: dir.join("text-detection.rten"),
            recognition: dir.join("text-recognition.rten"),
        }
    }
}

/// Recognizer backed by the ocrs engine
pub struct OcrsRecognizer {
    engine: OcrEngine,
}

impl OcrsRecognizer {
    /// Load both models and build the engine. This is the slow part of
    /// service startup.
    pub fn load(paths: &ModelPaths) -> anyhow::Result<Self> {
        if !paths.detection.exists() || !paths.recognition.exists() {
            anyhow::bail!(
                "OCR models not found. Expected locations:\n  - {}\n  - {}",
                paths.detection.display(),
                paths.recognition.display()
            );
        }

        tracing::info!(path = %paths.detection.display(), "Loading text detection model");
        let detection_model = Model::load_file(&paths.detection)?;
        tracing::info!(path = %paths.recognition.display(), "Loading text recognition model");
        let recognition_model = Model::load_file(&paths.recognition)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|e| anyhow::anyhow!("Failed to create OCR engine: {}", e))?;

        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    fn recognize(&self, region: &DynamicImage) -> anyhow::Result<Vec<Recognition>> {
        let img = region.to_rgb8();

        let source = ImageSource::from_bytes(img.as_raw(), img.dimensions())
            .map_err(|e| anyhow::anyhow!("Invalid OCR input: {}", e))?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|e| anyhow::anyhow!("Failed to prepare OCR input: {}", e))?;

        let words = self
            .engine
            .detect_words(&input)
            .map_err(|e| anyhow::anyhow!("Text detection failed: {}", e))?;
        let lines = self.engine.find_text_lines(&input, &words);
        let texts = self
            .engine
            .recognize_text(&input, &lines)
            .map_err(|e| anyhow::anyhow!("Text recognition failed: {}", e))?;

        Ok(texts
            .into_iter()
            .flatten()
            .map(|line| line.to_string().trim().to_string())
            .filter(|text| !text.is_empty())
            .map(|text| Recognition::new(text, OCRS_LINE_CONFIDENCE))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_paths_use_ocrs_file_names() {
        let paths = ModelPaths::in_dir("/models");
        assert_eq!(paths.detection, PathBuf::from("/models/text-detection.rten"));
        assert_eq!(paths.recognition, PathBuf::from("/models/text-recognition.rten"));
    }

    #[test]
    fn missing_models_fail_to_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = OcrsRecognizer::load(&ModelPaths::in_dir(dir.path()))
            .err()
            .expect("load should fail without model files");
        assert!(err.to_string().contains("OCR models not found"));
    }
}
