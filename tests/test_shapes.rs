//! Integration tests for the shape classifier.
//!
//! Tests cover:
//! - Square / rectangle boundaries of the aspect ratio band
//! - Label counter advancing only on kept shapes
//! - Offset vector equal to the first approximated vertex
//! - Border following on a synthetic edge map

mod common;

use imageproc::point::Point;
use imageproc::rect::Rect;
use shapescan::detection::contours::{approximate_polygon, contours_from_edges};
use shapescan::detection::shapes::{DEFAULT_EPSILON_RATIO, ShapeKind, classify_shapes};

use common::*;

#[test]
fn test_aspect_ratio_band_is_inclusive() {
    assert_eq!(ShapeKind::from_aspect_ratio(1.0), ShapeKind::Square);
    assert_eq!(ShapeKind::from_aspect_ratio(1.05), ShapeKind::Square);
    assert_eq!(ShapeKind::from_aspect_ratio(0.95), ShapeKind::Square);
    assert_eq!(ShapeKind::from_aspect_ratio(1.0500001), ShapeKind::Rectangle);
    assert_eq!(ShapeKind::from_aspect_ratio(0.9499999), ShapeKind::Rectangle);
    assert_eq!(ShapeKind::from_aspect_ratio(2.0), ShapeKind::Rectangle);
}

#[test]
fn test_boxes_on_the_boundary_classify_as_squares() {
    // 105 / 100 and 95 / 100 sit exactly on the band edges
    let wide = rect_contour(0, 0, 105, 100);
    let narrow = rect_contour(200, 0, 95, 100);
    let shapes = classify_shapes(&[wide, narrow], DEFAULT_EPSILON_RATIO, None);

    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0].name, "Square0");
    assert_eq!(shapes[0].bbox, BoundingBox { x: 0, y: 0, width: 105, height: 100 });
    assert_eq!(shapes[1].name, "Square1");
    assert_eq!(shapes[1].bbox.width, 95);
}

#[test]
fn test_counter_skips_rejected_contours() {
    let triangle = Contour::new(vec![
        Point::new(0, 0),
        Point::new(40, 0),
        Point::new(20, 30),
    ]);
    let rectangle = rect_contour(50, 50, 80, 20);
    let square = rect_contour(10, 100, 30, 30);

    let shapes = classify_shapes(&[triangle, rectangle, square], DEFAULT_EPSILON_RATIO, None);

    let names: Vec<&str> = shapes.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Rectangle0", "Square1"]);
}

#[test]
fn test_offset_is_first_vertex() {
    let shapes = classify_shapes(&[rect_contour(12, 34, 40, 20)], DEFAULT_EPSILON_RATIO, None);

    assert_eq!(shapes.len(), 1);
    let shape = &shapes[0];
    assert_eq!(shape.vertices[0], Point::new(12, 34));
    assert_eq!(shape.offset, Position { x: 12, y: 34 });
    assert!((shape.aspect_ratio - 2.0).abs() < 1e-9);
}

#[test]
fn test_max_shapes_truncates_in_discovery_order() {
    let contours = vec![
        rect_contour(0, 0, 10, 10),
        rect_contour(20, 0, 30, 10),
        rect_contour(60, 0, 10, 10),
    ];

    let shapes = classify_shapes(&contours, DEFAULT_EPSILON_RATIO, Some(2));

    let names: Vec<&str> = shapes.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Square0", "Rectangle1"]);
}

#[test]
fn test_polygon_approximation_keeps_first_point() {
    // Start the ring halfway along the top edge
    let mut points = rect_contour(0, 0, 40, 40).points;
    points.rotate_left(20);
    let start = points[0];

    let approx = approximate_polygon(&points, 5.0);

    assert_eq!(approx[0], start);
    assert_eq!(approx.len(), 5);
}

#[test]
fn test_outline_in_edge_map_is_one_square() {
    let edges = edge_map_with_outline(100, 100, Rect::at(20, 20).of_size(60, 60));

    let contours = contours_from_edges(&edges);
    assert_eq!(contours.len(), 1, "hole border should be dropped");

    let shapes = classify_shapes(&contours, DEFAULT_EPSILON_RATIO, None);
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].name, "Square0");
    assert_eq!(shapes[0].bbox, BoundingBox { x: 20, y: 20, width: 60, height: 60 });
    assert_eq!(
        shapes[0].offset,
        Position { x: shapes[0].vertices[0].x, y: shapes[0].vertices[0].y }
    );
}

#[test]
fn test_empty_edge_map_has_no_contours() {
    let edges = image::GrayImage::new(50, 50);
    assert!(contours_from_edges(&edges).is_empty());
}
