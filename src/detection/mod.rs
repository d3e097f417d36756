pub mod contours;
pub mod ocr;
pub mod preprocessing;
pub mod shapes;

use image::{DynamicImage, GenericImageView};

use crate::detection::contours::{ContourExtractor, EdgeContourExtractor};
use crate::detection::ocr::{Recognition, TextRecognizer};
use crate::detection::shapes::DEFAULT_EPSILON_RATIO;
use crate::models::{
    AnnotatedShape, BoundingBox, Contour, DetectionRecord, ImageSummary, ShapeRegion,
};

/// Finds quadrilaterals in an image and reads the text inside each one
pub struct DetectionPipeline {
    extractor: Box<dyn ContourExtractor>,
    pub epsilon_ratio: f64,
    /// Upper bound on recognized shapes per image; unbounded when `None`
    pub max_shapes: Option<usize>,
}

impl DetectionPipeline {
    pub fn new() -> Self {
        Self {
            extractor: Box::new(EdgeContourExtractor::default()),
            epsilon_ratio: DEFAULT_EPSILON_RATIO,
            max_shapes: None,
        }
    }

    pub fn with_extractor(mut self, extractor: impl ContourExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn with_epsilon_ratio(mut self, epsilon_ratio: f64) -> Self {
        self.epsilon_ratio = epsilon_ratio;
        self
    }

    pub fn with_max_shapes(mut self, max_shapes: Option<usize>) -> Self {
        self.max_shapes = max_shapes;
        self
    }

    /// Run detection and recognition on one image.
    ///
    /// The result always starts with the whole-image summary, followed by
    /// one record per classified shape in classifier order. The recognizer
    /// is called once per shape, sequentially.
    pub fn annotate(
        &self,
        img: &DynamicImage,
        recognizer: &dyn TextRecognizer,
    ) -> anyhow::Result<Vec<DetectionRecord>> {
        let (width, height) = img.dimensions();
        let mut records = vec![DetectionRecord::Summary(ImageSummary::new(width, height))];

        let shapes = self.get_shapes(img);
        tracing::debug!(shapes = shapes.len(), width, height, "Classified shapes");

        for shape in &shapes {
            let best = match crop_region(img, &shape.bbox) {
                Some(roi) => recognizer.recognize(&roi)?.into_iter().next(),
                None => None,
            };
            let Recognition { text, confidence } = best.unwrap_or_else(|| Recognition::new("", 0.0));

            tracing::debug!(name = %shape.name, %text, confidence, "Annotated shape");
            records.push(DetectionRecord::Shape(AnnotatedShape::new(shape, text, confidence)));
        }

        Ok(records)
    }

    /// Get all contours from an image (for debugging)
    pub fn get_contours(&self, img: &DynamicImage) -> Vec<Contour> {
        self.extractor.extract(img)
    }

    /// Get classified quadrilaterals from an image, without recognition
    pub fn get_shapes(&self, img: &DynamicImage) -> Vec<ShapeRegion> {
        let contours = self.get_contours(img);
        shapes::classify_shapes(&contours, self.epsilon_ratio, self.max_shapes)
    }
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Crop the bounding box out of the image, clamped to the image bounds
pub fn crop_region(img: &DynamicImage, bbox: &BoundingBox) -> Option<DynamicImage> {
    let (img_width, img_height) = img.dimensions();
    let x = bbox.x.max(0) as u32;
    let y = bbox.y.max(0) as u32;
    if x >= img_width || y >= img_height {
        return None;
    }

    let width = bbox.width.min(img_width - x);
    let height = bbox.height.min(img_height - y);
    if width == 0 || height == 0 {
        return None;
    }

    Some(img.crop_imm(x, y, width, height))
}
