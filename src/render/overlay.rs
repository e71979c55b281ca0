use anyhow::Result;
use clap::ValueEnum;
use opencv::{
    core::{Mat, Point, Scalar},
    imgproc,
    prelude::*,
};
use serde::Deserialize;
use std::time::Duration;

use super::skeleton::{SKELETON_CONNECTIONS, WRIST_KEYPOINTS};
use crate::config::RenderConfig;
use crate::pose::{PixelKeypoint, PixelPose};

const KEYPOINT_RADIUS: i32 = 6;
const KEYPOINT_INNER_RADIUS: i32 = 3;
const LABEL_ORIGIN: (i32, i32) = (10, 30);
const LABEL_SCALE: f64 = 0.7;

fn white() -> Scalar {
    Scalar::new(255.0, 255.0, 255.0, 0.0)
}

fn black() -> Scalar {
    Scalar::new(0.0, 0.0, 0.0, 0.0)
}

/// 描画するキーポイントの範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KeypointSelection {
    /// 左右の手首のみ
    #[default]
    Wrists,
    /// 全17点と骨格線
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    pub selection: KeypointSelection,
    /// `Some` のとき、信頼度がこの値以下のキーポイントは描画しない
    pub score_threshold: Option<f32>,
}

impl OverlayOptions {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            selection: config.keypoints,
            score_threshold: config
                .apply_score_threshold
                .then_some(config.keypoint_score),
        }
    }

    fn is_visible(&self, kp: &PixelKeypoint) -> bool {
        self.score_threshold.map_or(true, |th| kp.confidence > th)
    }
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            selection: KeypointSelection::Wrists,
            score_threshold: None,
        }
    }
}

/// 処理時間の表示文字列
pub fn elapsed_label(elapsed: Duration) -> String {
    format!("Elapsed Time : {:.1}ms", elapsed.as_secs_f64() * 1000.0)
}

/// フレームのコピーにキーポイントと処理時間を描画して返す
pub fn draw_overlay(
    frame: &Mat,
    pose: &PixelPose,
    elapsed: Duration,
    options: &OverlayOptions,
) -> Result<Mat> {
    let mut image = frame.try_clone()?;

    match options.selection {
        KeypointSelection::Wrists => {
            for index in WRIST_KEYPOINTS {
                let kp = &pose[index as usize];
                if options.is_visible(kp) {
                    draw_filled_circle(&mut image, kp, KEYPOINT_RADIUS, white())?;
                }
            }
        }
        KeypointSelection::Full => draw_skeleton(&mut image, pose, options)?,
    }

    draw_elapsed_time(&mut image, elapsed)?;
    Ok(image)
}

fn draw_skeleton(image: &mut Mat, pose: &PixelPose, options: &OverlayOptions) -> Result<()> {
    for (start_idx, end_idx) in SKELETON_CONNECTIONS.iter() {
        let start = &pose[*start_idx as usize];
        let end = &pose[*end_idx as usize];
        if options.is_visible(start) && options.is_visible(end) {
            imgproc::line(
                image,
                Point::new(start.x, start.y),
                Point::new(end.x, end.y),
                white(),
                2,
                imgproc::LINE_AA,
                0,
            )?;
        }
    }

    for kp in pose.iter().filter(|kp| options.is_visible(kp)) {
        draw_filled_circle(image, kp, KEYPOINT_RADIUS, white())?;
        draw_filled_circle(image, kp, KEYPOINT_INNER_RADIUS, black())?;
    }

    Ok(())
}

fn draw_filled_circle(image: &mut Mat, kp: &PixelKeypoint, radius: i32, color: Scalar) -> Result<()> {
    imgproc::circle(
        image,
        Point::new(kp.x, kp.y),
        radius,
        color,
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )?;
    Ok(())
}

/// 縁取り（白・太）→ 本体（黒・細）の2回描画
fn draw_elapsed_time(image: &mut Mat, elapsed: Duration) -> Result<()> {
    let label = elapsed_label(elapsed);
    let origin = Point::new(LABEL_ORIGIN.0, LABEL_ORIGIN.1);
    for (color, thickness) in [(white(), 4), (black(), 2)] {
        imgproc::put_text(
            image,
            &label,
            origin,
            imgproc::FONT_HERSHEY_SIMPLEX,
            LABEL_SCALE,
            color,
            thickness,
            imgproc::LINE_AA,
            false,
        )?;
    }
    Ok(())
}
