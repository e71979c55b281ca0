use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::pose::InputElement;
use crate::render::KeypointSelection;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    /// カメラデバイス番号
    #[serde(default)]
    pub index: i32,
    /// 動画ファイル（指定時はカメラより優先）
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// 要求するキャプチャ幅
    #[serde(default = "default_width")]
    pub width: u32,
    /// 要求するキャプチャ高さ
    #[serde(default = "default_height")]
    pub height: u32,
    /// 左右反転して処理する
    #[serde(default)]
    pub mirror: bool,
}

fn default_width() -> u32 { 960 }
fn default_height() -> u32 { 540 }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            file: None,
            width: default_width(),
            height: default_height(),
            mirror: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// プリセット番号 (0〜3)
    #[serde(default)]
    pub select: i64,
    /// ONNXモデルの置き場所
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    #[serde(default)]
    pub input_element: InputElement,
    #[serde(default = "default_input_name")]
    pub input_name: String,
    #[serde(default = "default_output_name")]
    pub output_name: String,
}

fn default_models_dir() -> PathBuf { PathBuf::from("models") }
fn default_input_name() -> String { "serving_default_input_0".to_string() }
fn default_output_name() -> String { "StatefulPartitionedCall_0".to_string() }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            select: 0,
            models_dir: default_models_dir(),
            input_element: InputElement::default(),
            input_name: default_input_name(),
            output_name: default_output_name(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// 描画するキーポイント
    #[serde(default)]
    pub keypoints: KeypointSelection,
    /// キーポイント信頼度の閾値
    #[serde(default = "default_keypoint_score")]
    pub keypoint_score: f32,
    /// 閾値以下のキーポイントを描画しない
    #[serde(default)]
    pub apply_score_threshold: bool,
    #[serde(default = "default_window_title")]
    pub window_title: String,
}

fn default_keypoint_score() -> f32 { 0.4 }
fn default_window_title() -> String { "MoveNet(singlepose) Demo".to_string() }

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            keypoints: KeypointSelection::default(),
            keypoint_score: default_keypoint_score(),
            apply_score_threshold: false,
            window_title: default_window_title(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// ファイルが無ければデフォルト値、読めなければ警告してデフォルト値
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("{} not found, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }

    /// コマンドライン引数で上書き
    pub fn apply_args(&mut self, args: &Cli) {
        if let Some(device) = args.device {
            self.camera.index = device;
        }
        if let Some(file) = &args.file {
            self.camera.file = Some(file.clone());
        }
        if let Some(width) = args.width {
            self.camera.width = width;
        }
        if let Some(height) = args.height {
            self.camera.height = height;
        }
        if args.mirror {
            self.camera.mirror = true;
        }
        if let Some(select) = args.model_select {
            self.model.select = select;
        }
        if let Some(score) = args.keypoint_score {
            self.render.keypoint_score = score;
        }
        if args.apply_score_threshold {
            self.render.apply_score_threshold = true;
        }
        if let Some(selection) = args.draw {
            self.render.keypoints = selection;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.camera.index, 0);
        assert_eq!((config.camera.width, config.camera.height), (960, 540));
        assert!(!config.camera.mirror);
        assert_eq!(config.model.select, 0);
        assert_eq!(config.model.input_element, InputElement::U8);
        assert!((config.render.keypoint_score - 0.4).abs() < f32::EPSILON);
        assert!(!config.render.apply_score_threshold);
        assert_eq!(config.render.keypoints, KeypointSelection::Wrists);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [camera]
            width = 640
            mirror = true

            [model]
            select = 3
            input_element = "i32"

            [render]
            keypoints = "full"
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.width, 640);
        assert_eq!(config.camera.height, 540);
        assert!(config.camera.mirror);
        assert_eq!(config.model.select, 3);
        assert_eq!(config.model.input_element, InputElement::I32);
        assert_eq!(config.model.models_dir, PathBuf::from("models"));
        assert_eq!(config.render.keypoints, KeypointSelection::Full);
        assert_eq!(config.render.window_title, "MoveNet(singlepose) Demo");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("does/not/exist/config.toml");
        assert_eq!(config.camera.width, 960);
    }

    #[test]
    fn test_apply_args_overrides() {
        let mut config = Config::default();
        let args = Cli::parse_from([
            "app",
            "--file",
            "clip.mp4",
            "--width",
            "1280",
            "--mirror",
            "--model-select",
            "1",
            "--keypoint-score",
            "0.6",
            "--apply-score-threshold",
            "--draw",
            "full",
        ]);
        config.apply_args(&args);

        assert_eq!(config.camera.file, Some(PathBuf::from("clip.mp4")));
        assert_eq!(config.camera.width, 1280);
        assert_eq!(config.camera.height, 540);
        assert!(config.camera.mirror);
        assert_eq!(config.model.select, 1);
        assert!((config.render.keypoint_score - 0.6).abs() < f32::EPSILON);
        assert!(config.render.apply_score_threshold);
        assert_eq!(config.render.keypoints, KeypointSelection::Full);
    }

    #[test]
    fn test_apply_args_keeps_file_values() {
        let mut config: Config = toml::from_str("[camera]\nmirror = true\nindex = 2\n").unwrap();
        config.apply_args(&Cli::parse_from(["app"]));
        assert!(config.camera.mirror);
        assert_eq!(config.camera.index, 2);
    }
}
