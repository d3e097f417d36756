use imageproc::point::Point;
use serde::Serialize;

/// Closed polygon traced around one detected edge boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Closed arc length, including the segment back to the first point.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }

        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                let dx = (b.x - a.x) as f64;
                let dy = (b.y - a.y) as f64;
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }
}

/// Axis-aligned bounding box in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Smallest box covering every point, counting pixels inclusively
    /// (a single point yields a 1x1 box).
    pub fn from_points(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    /// Width over height, or `None` when the box has no height.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            return None;
        }
        Some(self.width as f64 / self.height as f64)
    }
}

/// Quadrilateral kept by the shape classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRegion {
    pub name: String,
    pub bbox: BoundingBox,
    pub aspect_ratio: f64,
    /// First approximated vertex, measured from the image origin
    pub offset: Position,
    pub vertices: [Point<i32>; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Whole-image record, always first in a detection result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSummary {
    pub name: String,
    pub text: String,
    pub position: Position,
    pub width: u32,
    pub height: u32,
}

impl ImageSummary {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            name: "Original".to_string(),
            text: "Original".to_string(),
            position: Position { x: 0, y: 0 },
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedShape {
    pub name: String,
    pub text: String,
    pub position: Position,
    pub width: u32,
    pub height: u32,
    /// No rotation estimation is done; always 0
    pub direction: i32,
    pub confidence: f32,
}

impl AnnotatedShape {
    pub fn new(region: &ShapeRegion, text: String, confidence: f32) -> Self {
        Self {
            name: region.name.clone(),
            text,
            position: region.offset,
            width: region.bbox.width,
            height: region.bbox.height,
            direction: 0,
            confidence,
        }
    }
}

/// One element of the detection response array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetectionRecord {
    Summary(ImageSummary),
    Shape(AnnotatedShape),
}

impl DetectionRecord {
    pub fn name(&self) -> &str {
        match self {
            DetectionRecord::Summary(summary) => &summary.name,
            DetectionRecord::Shape(shape) => &shape.name,
        }
    }

    pub fn as_shape(&self) -> Option<&AnnotatedShape> {
        match self {
            DetectionRecord::Shape(shape) => Some(shape),
            DetectionRecord::Summary(_) => None,
        }
    }
}
