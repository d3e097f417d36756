pub mod config;
pub mod detection;
pub mod models;
pub mod readiness;
pub mod server;

pub use detection::DetectionPipeline;
pub use detection::ocr::{NullRecognizer, OcrsRecognizer, Recognition, TextRecognizer};
pub use models::{AnnotatedShape, BoundingBox, Contour, DetectionRecord, ImageSummary, Position, ShapeRegion};
pub use readiness::{ModelReadiness, NotReady, ReadinessState, TriggerOutcome};
