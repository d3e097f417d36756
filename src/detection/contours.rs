use image::{DynamicImage, GrayImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::point::Point;

use crate::detection::preprocessing;
use crate::models::Contour;

/// Turns a raw image into closed contours, in discovery order.
pub trait ContourExtractor: Send + Sync {
    fn extract(&self, img: &DynamicImage) -> Vec<Contour>;
}

/// Grayscale, blur, Canny, then border following on the edge map
#[derive(Debug, Clone)]
pub struct EdgeContourExtractor {
    pub sigma: f32,
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for EdgeContourExtractor {
    fn default() -> Self {
        Self {
            sigma: preprocessing::DEFAULT_BLUR_SIGMA,
            low_threshold: preprocessing::DEFAULT_CANNY_LOW,
            high_threshold: preprocessing::DEFAULT_CANNY_HIGH,
        }
    }
}

impl ContourExtractor for EdgeContourExtractor {
    fn extract(&self, img: &DynamicImage) -> Vec<Contour> {
        let gray = preprocessing::to_grayscale(img);
        let blurred = preprocessing::apply_blur(&gray, self.sigma);
        let edges = preprocessing::detect_edges(&blurred, self.low_threshold, self.high_threshold);
        contours_from_edges(&edges)
    }
}

/// Find the outermost contours in a binary edge image.
///
/// Holes and borders nested inside another border are dropped, so each
/// connected edge structure contributes one contour. Order follows the
/// raster scan that discovers each border.
pub fn contours_from_edges(edges: &GrayImage) -> Vec<Contour> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| Contour::new(c.points))
        .collect()
}

/// Douglas-Peucker simplification of a closed curve.
///
/// The first input point is always kept and stays at index 0 of the result.
/// The curve is split at the point farthest from it and each half is
/// simplified as an open chain.
pub fn approximate_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let origin = points[0];
    let far = points
        .iter()
        .enumerate()
        .max_by_key(|(_, p)| {
            let dx = (p.x - origin.x) as i64;
            let dy = (p.y - origin.y) as i64;
            dx * dx + dy * dy
        })
        .map(|(i, _)| i)
        .unwrap_or(0);

    if far == 0 {
        return vec![origin];
    }

    // Close the curve so the second chain ends back on the origin
    let n = points.len();
    let mut closed = points.to_vec();
    closed.push(origin);

    let mut keep = vec![false; n + 1];
    keep[0] = true;
    keep[far] = true;
    keep[n] = true;

    let mut stack = vec![(0, far), (far, n)];
    while let Some((start, end)) = stack.pop() {
        if end - start <= 1 {
            continue;
        }

        let mut max_dist = 0.0;
        let mut max_index = start;
        for i in (start + 1)..end {
            let dist = distance_to_line(closed[i], closed[start], closed[end]);
            if dist > max_dist {
                max_dist = dist;
                max_index = i;
            }
        }

        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((start, max_index));
            stack.push((max_index, end));
        }
    }

    // Index n duplicates the origin
    closed
        .into_iter()
        .take(n)
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}

fn distance_to_line(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let (px, py) = (p.x as f64, p.y as f64);
    let (ax, ay) = (a.x as f64, a.y as f64);
    let (bx, by) = (b.x as f64, b.y as f64);

    let dx = bx - ax;
    let dy = by - ay;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }

    (dy * px - dx * py + bx * ay - by * ax).abs() / len
}
