use clap::Parser;
use image::ImageReader;
use std::sync::Arc;

use shapescan::config::{Cli, Command, DetectArgs, ServeArgs};
use shapescan::server::{self, AppState};
use shapescan::{
    DetectionPipeline, ModelReadiness, NullRecognizer, OcrsRecognizer, TextRecognizer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shapescan=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Detect(args) => detect(args),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let model_paths = args.models.model_paths()?;
    tracing::info!(
        detection = %model_paths.detection.display(),
        recognition = %model_paths.recognition.display(),
        "Using OCR models"
    );

    let readiness = ModelReadiness::new(move || {
        let recognizer = OcrsRecognizer::load(&model_paths)?;
        Ok(Arc::new(recognizer) as Arc<dyn TextRecognizer>)
    });

    if args.preload {
        readiness.trigger_load();
    }

    let pipeline = DetectionPipeline::new().with_max_shapes(args.max_shapes);
    let app = server::create_app_with_limit(
        AppState::new(readiness, pipeline),
        args.max_body_bytes(),
    );

    server::start_server(app, args.socket_addr()).await
}

fn detect(args: DetectArgs) -> anyhow::Result<()> {
    tracing::info!("Loading image: {:?}", args.image_path);

    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    tracing::info!("Image loaded: {}x{}", img.width(), img.height());

    let recognizer: Box<dyn TextRecognizer> = if args.skip_ocr {
        Box::new(NullRecognizer)
    } else {
        Box::new(OcrsRecognizer::load(&args.models.model_paths()?)?)
    };

    let pipeline = DetectionPipeline::new().with_max_shapes(args.max_shapes);
    let records = pipeline.annotate(&img, recognizer.as_ref())?;

    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}
