mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from shapescan for tests
pub use shapescan::{
    AnnotatedShape, BoundingBox, Contour, DetectionPipeline, DetectionRecord, ImageSummary,
    ModelReadiness, Position, ReadinessState, Recognition, ShapeRegion, TextRecognizer,
    TriggerOutcome,
};
