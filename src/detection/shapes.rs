use crate::detection::contours::approximate_polygon;
use crate::models::{BoundingBox, Contour, Position, ShapeRegion};

/// Polygon approximation tolerance as a fraction of the contour perimeter
pub const DEFAULT_EPSILON_RATIO: f64 = 0.04;

/// Aspect ratio band (inclusive) inside which a quadrilateral is a square
pub const SQUARE_MIN_ASPECT: f64 = 0.95;
pub const SQUARE_MAX_ASPECT: f64 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Square,
    Rectangle,
}

impl ShapeKind {
    pub fn from_aspect_ratio(aspect: f64) -> Self {
        if (SQUARE_MIN_ASPECT..=SQUARE_MAX_ASPECT).contains(&aspect) {
            ShapeKind::Square
        } else {
            ShapeKind::Rectangle
        }
    }

    pub fn label(&self, index: usize) -> String {
        match self {
            ShapeKind::Square => format!("Square{}", index),
            ShapeKind::Rectangle => format!("Rectangle{}", index),
        }
    }
}

/// Keep the contours that approximate to exactly four vertices.
///
/// Output order is contour order. Each kept shape consumes the next index
/// of the running label counter; rejected contours do not.
pub fn classify_shapes(
    contours: &[Contour],
    epsilon_ratio: f64,
    max_shapes: Option<usize>,
) -> Vec<ShapeRegion> {
    let mut shapes = Vec::new();

    for contour in contours {
        if let Some(limit) = max_shapes {
            if shapes.len() >= limit {
                tracing::warn!(
                    limit,
                    contours = contours.len(),
                    "Shape limit reached, ignoring remaining contours"
                );
                break;
            }
        }

        if let Some(shape) = classify_contour(contour, epsilon_ratio, shapes.len()) {
            shapes.push(shape);
        }
    }

    shapes
}

fn classify_contour(contour: &Contour, epsilon_ratio: f64, index: usize) -> Option<ShapeRegion> {
    let epsilon = epsilon_ratio * contour.perimeter();
    if epsilon <= 0.0 {
        return None;
    }

    let approx = approximate_polygon(&contour.points, epsilon);
    let vertices: [_; 4] = approx.try_into().ok()?;

    let bbox = BoundingBox::from_points(&vertices)?;
    let Some(aspect_ratio) = bbox.aspect_ratio() else {
        tracing::debug!(?bbox, "Skipping quadrilateral with zero height");
        return None;
    };

    let kind = ShapeKind::from_aspect_ratio(aspect_ratio);

    Some(ShapeRegion {
        name: kind.label(index),
        bbox,
        aspect_ratio,
        offset: Position {
            x: vertices[0].x,
            y: vertices[0].y,
        },
        vertices,
    })
}
