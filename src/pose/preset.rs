use anyhow::{bail, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// MoveNet SinglePose のモデル種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelVariant {
    /// 高速・低精度
    Lightning,
    /// 低速・高精度
    Thunder,
}

impl ModelVariant {
    pub fn name(self) -> &'static str {
        match self {
            Self::Lightning => "lightning",
            Self::Thunder => "thunder",
        }
    }

    /// 正方形入力の一辺
    pub fn input_size(self) -> i32 {
        match self {
            Self::Lightning => 192,
            Self::Thunder => 256,
        }
    }
}

/// 重みの量子化形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Float16,
    Int8,
}

impl Precision {
    pub fn name(self) -> &'static str {
        match self {
            Self::Float16 => "float16",
            Self::Int8 => "int8",
        }
    }
}

/// 起動時に選択するモデルプリセット（モデル種別 × 量子化）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelPreset {
    pub variant: ModelVariant,
    pub precision: Precision,
}

impl ModelPreset {
    /// セレクタ 0〜3 の順
    pub const ALL: [ModelPreset; 4] = [
        ModelPreset::new(ModelVariant::Lightning, Precision::Float16),
        ModelPreset::new(ModelVariant::Thunder, Precision::Float16),
        ModelPreset::new(ModelVariant::Lightning, Precision::Int8),
        ModelPreset::new(ModelVariant::Thunder, Precision::Int8),
    ];

    pub const fn new(variant: ModelVariant, precision: Precision) -> Self {
        Self { variant, precision }
    }

    /// `--model-select` の値からプリセットを選ぶ
    pub fn from_selector(selector: i64) -> Result<Self> {
        match usize::try_from(selector).ok().and_then(|i| Self::ALL.get(i)) {
            Some(preset) => Ok(*preset),
            None => bail!(
                "model_select {} is invalid value. Please use 0-{}.",
                selector,
                Self::ALL.len() - 1
            ),
        }
    }

    pub fn input_size(&self) -> i32 {
        self.variant.input_size()
    }

    pub fn file_name(&self) -> String {
        format!(
            "movenet_singlepose_{}_{}.onnx",
            self.variant.name(),
            self.precision.name()
        )
    }

    pub fn model_path(&self, models_dir: &Path) -> PathBuf {
        models_dir.join(self.file_name())
    }
}

impl fmt::Display for ModelPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}x{})",
            self.variant.name(),
            self.precision.name(),
            self.input_size(),
            self.input_size()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_selector_all_presets() {
        let dir = Path::new("models");
        let expected = [
            ("models/movenet_singlepose_lightning_float16.onnx", 192),
            ("models/movenet_singlepose_thunder_float16.onnx", 256),
            ("models/movenet_singlepose_lightning_int8.onnx", 192),
            ("models/movenet_singlepose_thunder_int8.onnx", 256),
        ];

        for (selector, (path, size)) in expected.iter().enumerate() {
            let preset = ModelPreset::from_selector(selector as i64).unwrap();
            assert_eq!(preset.model_path(dir), PathBuf::from(path));
            assert_eq!(preset.input_size(), *size);
        }
    }

    #[test]
    fn test_selector_one_is_thunder() {
        let preset = ModelPreset::from_selector(1).unwrap();
        assert_eq!(preset.input_size(), 256);
        assert!(preset.file_name().contains("thunder"));
    }

    #[test]
    fn test_invalid_selector() {
        let err = ModelPreset::from_selector(4).unwrap_err();
        assert_eq!(err.to_string(), "model_select 4 is invalid value. Please use 0-3.");
        assert!(ModelPreset::from_selector(-1).is_err());
        assert!(ModelPreset::from_selector(i64::MAX).is_err());
    }

    #[test]
    fn test_display() {
        let preset = ModelPreset::from_selector(2).unwrap();
        assert_eq!(preset.to_string(), "lightning (int8, 192x192)");
    }
}
