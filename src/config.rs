use clap::{Args, Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::detection::ocr::ModelPaths;

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_MAX_BODY_MB: usize = 25;

#[derive(Parser, Debug)]
#[command(name = "shapescan")]
#[command(about = "Detect rectangles and squares in images and read the text inside them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP detection service
    Serve(ServeArgs),
    /// Run detection once on a local image and print the JSON result
    Detect(DetectArgs),
}

/// Model file locations, defaulting to the ocrs cache directory
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Path to the ocrs text detection model
    #[arg(long, env = "SHAPESCAN_DETECTION_MODEL", value_name = "FILE")]
    pub detection_model: Option<PathBuf>,

    /// Path to the ocrs text recognition model
    #[arg(long, env = "SHAPESCAN_RECOGNITION_MODEL", value_name = "FILE")]
    pub recognition_model: Option<PathBuf>,
}

impl ModelArgs {
    pub fn model_paths(&self) -> anyhow::Result<ModelPaths> {
        if let (Some(detection), Some(recognition)) = (&self.detection_model, &self.recognition_model) {
            return Ok(ModelPaths {
                detection: detection.clone(),
                recognition: recognition.clone(),
            });
        }

        let defaults = ModelPaths::default_cache()?;
        Ok(ModelPaths {
            detection: self.detection_model.clone().unwrap_or(defaults.detection),
            recognition: self.recognition_model.clone().unwrap_or(defaults.recognition),
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Start loading the OCR models at startup instead of on first use
    #[arg(long)]
    pub preload: bool,

    /// Maximum number of shapes recognized per image (unbounded if unset)
    #[arg(long, value_name = "N")]
    pub max_shapes: Option<usize>,

    /// Maximum request body size in megabytes
    #[arg(long, value_name = "MB", default_value_t = DEFAULT_MAX_BODY_MB)]
    pub max_body_mb: usize,

    #[command(flatten)]
    pub models: ModelArgs,
}

impl ServeArgs {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    pub image_path: PathBuf,

    /// Skip OCR (faster, for checking shape detection only)
    #[arg(long)]
    pub skip_ocr: bool,

    /// Maximum number of shapes recognized (unbounded if unset)
    #[arg(long, value_name = "N")]
    pub max_shapes: Option<usize>,

    #[command(flatten)]
    pub models: ModelArgs,
}
