use base64::{Engine, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::point::Point;
use imageproc::rect::Rect;
use shapescan::detection::contours::ContourExtractor;
use shapescan::{Contour, ModelReadiness, Recognition, TextRecognizer};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Creates a white RGB image of the given size.
pub fn blank_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255u8, 255u8, 255u8])))
}

/// Creates a white image with one filled black rectangle.
pub fn image_with_rect(width: u32, height: u32, rect: Rect) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255u8, 255u8, 255u8]));
    draw_filled_rect_mut(&mut img, rect, Rgb([0u8, 0u8, 0u8]));
    DynamicImage::ImageRgb8(img)
}

/// Creates a black edge map with a one pixel wide white rectangle outline.
pub fn edge_map_with_outline(width: u32, height: u32, rect: Rect) -> image::GrayImage {
    let mut edges = image::GrayImage::new(width, height);
    imageproc::drawing::draw_hollow_rect_mut(&mut edges, rect, Luma([255u8]));
    edges
}

/// PNG-encodes the image and returns it as standard base64.
pub fn encode_png_base64(img: &DynamicImage) -> String {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode test image");
    STANDARD.encode(bytes)
}

/// Closed pixel ring around a rectangle, starting at its top-left corner and
/// running clockwise.
pub fn rect_contour(x: i32, y: i32, width: i32, height: i32) -> Contour {
    let (right, bottom) = (x + width - 1, y + height - 1);
    let mut points = Vec::new();
    for px in x..=right {
        points.push(Point::new(px, y));
    }
    for py in y + 1..=bottom {
        points.push(Point::new(right, py));
    }
    for px in (x..right).rev() {
        points.push(Point::new(px, bottom));
    }
    for py in (y + 1..bottom).rev() {
        points.push(Point::new(x, py));
    }
    Contour::new(points)
}

/// Extractor that ignores the image and returns a fixed contour list.
pub struct FixedContours(pub Vec<Contour>);

impl ContourExtractor for FixedContours {
    fn extract(&self, _img: &DynamicImage) -> Vec<Contour> {
        self.0.clone()
    }
}

/// Recognizer returning the same candidates for every region and counting calls.
#[derive(Default)]
pub struct StubRecognizer {
    pub candidates: Vec<Recognition>,
    pub calls: AtomicUsize,
}

impl StubRecognizer {
    pub fn with_text(text: &str, confidence: f32) -> Self {
        Self {
            candidates: vec![Recognition::new(text, confidence)],
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextRecognizer for StubRecognizer {
    fn recognize(&self, _region: &DynamicImage) -> anyhow::Result<Vec<Recognition>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }
}

/// Readiness controller whose loader hands out the given recognizer.
pub fn readiness_with(recognizer: Arc<dyn TextRecognizer>) -> Arc<ModelReadiness> {
    ModelReadiness::new(move || Ok(Arc::clone(&recognizer)))
}

/// Readiness controller that has already finished loading.
pub async fn ready_readiness(recognizer: Arc<dyn TextRecognizer>) -> Arc<ModelReadiness> {
    let readiness = readiness_with(recognizer);
    readiness.trigger_load();
    readiness.wait_settled().await;
    readiness
}
