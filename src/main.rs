use anyhow::Result;
use clap::Parser;

use movenet_viewer::app::{App, MoveNet};
use movenet_viewer::camera::{CaptureSource, OpenCvCamera};
use movenet_viewer::cli::Cli;
use movenet_viewer::config::Config;
use movenet_viewer::pose::{ModelPreset, PoseDetector};
use movenet_viewer::render::{MinifbRenderer, OverlayOptions};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    let mut config = Config::load_or_default(&args.config);
    config.apply_args(&args);

    // 不正なセレクタはカメラもウィンドウも開かずに終了
    let preset = ModelPreset::from_selector(config.model.select)?;

    log::info!("MoveNet viewer {}", env!("GIT_VERSION"));
    log::info!("Model: {}", preset);
    log::info!("Mirror: {}", if config.camera.mirror { "ON" } else { "OFF" });
    if config.render.apply_score_threshold {
        log::info!("Keypoint score threshold: {}", config.render.keypoint_score);
    }

    let source = CaptureSource::from_config(&config.camera);
    let camera = OpenCvCamera::open(
        &source,
        Some(config.camera.width),
        Some(config.camera.height),
    )?;
    let (width, height) = camera.resolution();

    let model_path = preset.model_path(&config.model.models_dir);
    log::info!("Loading model from {}...", model_path.display());
    let detector = PoseDetector::new(&model_path, &config.model)?;
    log::info!("Model loaded");

    let window = MinifbRenderer::new(
        &config.render.window_title,
        width as usize,
        height as usize,
    )?;
    log::info!("Press ESC to exit");

    let mut app = App::new(
        camera,
        MoveNet::new(detector, preset.input_size()),
        window,
        config.camera.mirror,
        OverlayOptions::from_config(&config.render),
    );
    let summary = app.run()?;

    log::info!(
        "Shutting down ({:?}, {} frames)",
        summary.reason,
        summary.frames
    );
    Ok(())
}
