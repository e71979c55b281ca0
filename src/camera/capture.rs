use anyhow::{bail, Context, Result};
use opencv::{
    core::{self, Mat},
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureAPIs},
};
use std::fmt;
use std::path::PathBuf;

use crate::config::CameraConfig;

/// キャプチャ元（カメラ番号 or 動画ファイル）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureSource {
    Device(i32),
    File(PathBuf),
}

impl CaptureSource {
    /// ファイル指定があればそちらを優先
    pub fn from_config(config: &CameraConfig) -> Self {
        match &config.file {
            Some(path) => Self::File(path.clone()),
            None => Self::Device(config.index),
        }
    }
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(index) => write!(f, "camera {}", index),
            Self::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

/// OpenCVを使用したカメラ/動画キャプチャ
pub struct OpenCvCamera {
    capture: VideoCapture,
    width: u32,
    height: u32,
    released: bool,
}

impl OpenCvCamera {
    /// 解像度を指定してキャプチャ元を開く
    ///
    /// 解像度は要求値であり、実際の値は [`OpenCvCamera::resolution`] で確認する。
    pub fn open(source: &CaptureSource, width: Option<u32>, height: Option<u32>) -> Result<Self> {
        let api = VideoCaptureAPIs::CAP_ANY as i32;
        let mut capture = match source {
            CaptureSource::Device(index) => VideoCapture::new(*index, api),
            CaptureSource::File(path) => {
                let Some(path_str) = path.to_str() else {
                    bail!("Video path is not valid UTF-8: {}", path.display());
                };
                VideoCapture::from_file(path_str, api)
            }
        }
        .with_context(|| format!("Failed to open {}", source))?;

        if !capture.is_opened()? {
            bail!("{} is not available", source);
        }

        if let Some(w) = width {
            capture.set(videoio::CAP_PROP_FRAME_WIDTH, w as f64)?;
        }
        if let Some(h) = height {
            capture.set(videoio::CAP_PROP_FRAME_HEIGHT, h as f64)?;
        }

        let actual_width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let actual_height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
        log::info!(
            "Opened {}: {}x{} (requested {}x{})",
            source,
            actual_width,
            actual_height,
            width.map_or("-".to_string(), |w| w.to_string()),
            height.map_or("-".to_string(), |h| h.to_string()),
        );

        Ok(Self {
            capture,
            width: actual_width,
            height: actual_height,
            released: false,
        })
    }

    /// 解像度を取得
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// フレームを読み込む（BGR形式）
    ///
    /// ストリーム終端・読み込み失敗時は `None`。
    pub fn read_frame(&mut self) -> Result<Option<Mat>> {
        if self.released {
            return Ok(None);
        }

        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .context("Failed to read frame")?;

        if !grabbed || frame.empty() {
            return Ok(None);
        }

        Ok(Some(frame))
    }

    /// キャプチャハンドルを解放する。二度目以降は何もしない。
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.capture.release().context("Failed to release capture")?;
        log::debug!("Capture released");
        Ok(())
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("{:#}", e);
        }
    }
}

/// 左右反転したフレームを返す
pub fn mirror_frame(frame: &Mat) -> Result<Mat> {
    let mut flipped = Mat::default();
    core::flip(frame, &mut flipped, 1)?;
    Ok(flipped)
}
