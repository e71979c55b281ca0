use anyhow::{bail, Result};
use ndarray::Array4;
use opencv::{
    core::{AlgorithmHint, Mat, Size, Vec3b},
    imgproc,
    prelude::*,
};

/// OpenCV Mat を MoveNet用の入力テンソルに変換
///
/// - `input_size` x `input_size` にリサイズ（アスペクト比は保持しない）
/// - BGR -> RGB
/// - [1, input_size, input_size, 3] の u8 テンソルに変換
pub fn preprocess_for_movenet(frame: &Mat, input_size: i32) -> Result<Array4<u8>> {
    if frame.empty() {
        bail!("Cannot preprocess an empty frame");
    }
    if frame.channels() != 3 {
        bail!("Expected a 3-channel BGR frame, got {} channels", frame.channels());
    }

    let mut resized = Mat::default();
    imgproc::resize(
        frame,
        &mut resized,
        Size::new(input_size, input_size),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let mut rgb = Mat::default();
    imgproc::cvt_color(
        &resized,
        &mut rgb,
        imgproc::COLOR_BGR2RGB,
        0,
        AlgorithmHint::ALGO_HINT_DEFAULT,
    )?;

    let size = input_size as usize;
    let mut tensor = Array4::<u8>::zeros((1, size, size, 3));

    for y in 0..input_size {
        for x in 0..input_size {
            let pixel = rgb.at_2d::<Vec3b>(y, x)?;
            for c in 0..3 {
                tensor[[0, y as usize, x as usize, c]] = pixel[c];
            }
        }
    }

    Ok(tensor)
}
