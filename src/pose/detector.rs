use anyhow::{Context, Result};
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{DynValue, Tensor};
use serde::Deserialize;
use std::path::Path;

use super::keypoint::Pose;
use crate::config::ModelConfig;

/// モデルが受け付ける入力テンソルの要素型
///
/// 変換元によって MoveNet の入力型が異なる（tflite 由来は u8、SavedModel 由来は i32）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputElement {
    #[default]
    U8,
    I32,
    F32,
}

impl InputElement {
    /// u8 テンソルを要素型に合わせて ORT の値に変換
    fn to_value(self, input: Array4<u8>) -> Result<DynValue> {
        let value = match self {
            Self::U8 => Tensor::from_array(input)?.into_dyn(),
            Self::I32 => Tensor::from_array(input.mapv(i32::from))?.into_dyn(),
            Self::F32 => Tensor::from_array(input.mapv(f32::from))?.into_dyn(),
        };
        Ok(value)
    }
}

/// MoveNet を使用した姿勢検出器
pub struct PoseDetector {
    session: Session,
    input_name: String,
    output_name: String,
    input_element: InputElement,
}

impl PoseDetector {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(model_path: P, config: &ModelConfig) -> Result<Self> {
        let model_path = model_path.as_ref();
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model: {}", model_path.display()))?;

        Ok(Self {
            session,
            input_name: config.input_name.clone(),
            output_name: config.output_name.clone(),
            input_element: config.input_element,
        })
    }

    /// 前処理済みテンソルから姿勢を検出
    ///
    /// 入力: [1, size, size, 3] の u8 テンソル (RGB)
    /// 出力: Pose (17キーポイント、正規化座標)
    pub fn detect(&mut self, input: Array4<u8>) -> Result<Pose> {
        let input_value = self.input_element.to_value(input)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_value])
            .context("Inference failed")?;

        // MoveNet の出力は [1, 1, 17, 3] (y, x, confidence)
        let output: ndarray::ArrayViewD<f32> = outputs[self.output_name.as_str()]
            .try_extract_array()
            .context("Failed to extract output tensor")?;
        let values: Vec<f32> = output.iter().copied().collect();

        Pose::from_movenet_output(&values)
    }
}
