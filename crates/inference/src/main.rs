use anyhow::Context;
use inference::{
    Detector, DetectorConfig, YoloV4Detector, backend::InferenceBackend,
    backend::ort::OrtBackend, logging::setup_logging,
};
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    let config = DetectorConfig::from_env()?;

    setup_logging(&config);

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    let model = config.detection_model()?;

    tracing::info!("Loading inference model");
    let backend = OrtBackend::load_model(&model)?;
    tracing::info!("Model loaded successfully");

    let mut detector = YoloV4Detector::new(model, backend, config.minimum_score)?
        .with_nms_threshold(config.nms_threshold)?;

    let image_path = config
        .image_path
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("IMAGE_PATH is not set"))?;
    let image = image::open(image_path)
        .with_context(|| format!("Failed to decode image {}", image_path))?
        .to_rgb8();

    let start = Instant::now();
    let detections = detector.run_detection(&image)?;

    tracing::info!(
        image_path,
        width = image.width(),
        height = image.height(),
        detections = detections.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Detection finished"
    );

    for detection in &detections {
        println!("{}", serde_json::to_string(detection)?);
    }

    Ok(())
}
