use anyhow::{bail, Result};

/// MoveNet の 17 キーポイントインデックス (COCO 順)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl KeypointIndex {
    pub const COUNT: usize = 17;

    /// 出力テンソル1行あたりの値の数 (y, x, score)
    pub const VALUES_PER_KEYPOINT: usize = 3;
}

/// 単一キーポイント（正規化座標）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keypoint {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0)
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// ピクセル座標に変換（小数部は切り捨て）
    pub fn to_pixel(&self, width: u32, height: u32) -> PixelKeypoint {
        PixelKeypoint {
            x: (self.x * width as f32) as i32,
            y: (self.y * height as f32) as i32,
            confidence: self.confidence,
        }
    }
}

/// ピクセル座標系のキーポイント
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelKeypoint {
    pub x: i32,
    pub y: i32,
    pub confidence: f32,
}

/// ピクセル座標系の 17 キーポイント
pub type PixelPose = [PixelKeypoint; KeypointIndex::COUNT];

/// 17キーポイントからなる姿勢
#[derive(Debug, Clone, Default)]
pub struct Pose {
    pub keypoints: [Keypoint; KeypointIndex::COUNT],
}

impl Pose {
    pub fn new(keypoints: [Keypoint; KeypointIndex::COUNT]) -> Self {
        Self { keypoints }
    }

    /// MoveNet の平坦化された出力 `[17 * (y, x, score)]` から姿勢を組み立てる
    ///
    /// 値の数が 51 以外なら出力形状の不一致としてエラー。
    pub fn from_movenet_output(values: &[f32]) -> Result<Self> {
        let expected = KeypointIndex::COUNT * KeypointIndex::VALUES_PER_KEYPOINT;
        if values.len() != expected {
            bail!(
                "Unexpected MoveNet output: expected {} values ({} keypoints), got {}",
                expected,
                KeypointIndex::COUNT,
                values.len()
            );
        }

        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        for (kp, row) in keypoints
            .iter_mut()
            .zip(values.chunks_exact(KeypointIndex::VALUES_PER_KEYPOINT))
        {
            *kp = Keypoint::new(row[1], row[0], row[2]);
        }

        Ok(Self::new(keypoints))
    }

    /// インデックスでキーポイントを取得
    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    /// 全キーポイントをフレームのピクセル座標に変換
    pub fn to_pixels(&self, width: u32, height: u32) -> PixelPose {
        self.keypoints.map(|kp| kp.to_pixel(width, height))
    }

    /// 全キーポイントの平均信頼度
    pub fn average_confidence(&self) -> f32 {
        let sum: f32 = self.keypoints.iter().map(|k| k.confidence).sum();
        sum / KeypointIndex::COUNT as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_output_with(index: KeypointIndex, y: f32, x: f32, score: f32) -> Vec<f32> {
        let mut values = vec![0.0; KeypointIndex::COUNT * 3];
        let base = index as usize * 3;
        values[base] = y;
        values[base + 1] = x;
        values[base + 2] = score;
        values
    }

    #[test]
    fn test_keypoint_index_wrists() {
        assert_eq!(KeypointIndex::LeftWrist as usize, 9);
        assert_eq!(KeypointIndex::RightWrist as usize, 10);
        assert_eq!(KeypointIndex::RightAnkle as usize, KeypointIndex::COUNT - 1);
    }

    #[test]
    fn test_keypoint_to_pixel() {
        let kp = Keypoint::new(0.5, 0.25, 1.0);
        let px = kp.to_pixel(640, 480);
        assert_eq!((px.x, px.y), (320, 120));
        assert_eq!(px.confidence, 1.0);
    }

    #[test]
    fn test_keypoint_to_pixel_truncates() {
        // 960 * 0.3337 = 320.35..., 540 * 0.999 = 539.46
        let px = Keypoint::new(0.3337, 0.999, 0.2).to_pixel(960, 540);
        assert_eq!((px.x, px.y), (320, 539));
    }

    #[test]
    fn test_from_movenet_output_swaps_yx() {
        let values = raw_output_with(KeypointIndex::LeftWrist, 0.2, 0.7, 0.9);
        let pose = Pose::from_movenet_output(&values).unwrap();

        let wrist = pose.get(KeypointIndex::LeftWrist);
        assert_eq!(wrist.x, 0.7);
        assert_eq!(wrist.y, 0.2);
        assert_eq!(wrist.confidence, 0.9);
        assert_eq!(pose.keypoints.len(), 17);
    }

    #[test]
    fn test_from_movenet_output_rejects_wrong_length() {
        assert!(Pose::from_movenet_output(&[0.0; 48]).is_err());
        assert!(Pose::from_movenet_output(&[0.0; 54]).is_err());
        assert!(Pose::from_movenet_output(&[]).is_err());
    }

    #[test]
    fn test_to_pixels_center_of_960x540() {
        let values = raw_output_with(KeypointIndex::Nose, 0.5, 0.5, 0.8);
        let pose = Pose::from_movenet_output(&values).unwrap();
        let pixels = pose.to_pixels(960, 540);

        assert_eq!(pixels.len(), 17);
        assert_eq!((pixels[0].x, pixels[0].y), (480, 270));
        // 未設定のキーポイントは原点
        assert_eq!((pixels[1].x, pixels[1].y), (0, 0));
    }

    #[test]
    fn test_to_pixels_matches_floor_for_every_keypoint() {
        let mut values = Vec::with_capacity(51);
        for i in 0..KeypointIndex::COUNT {
            let t = i as f32 / KeypointIndex::COUNT as f32;
            values.extend_from_slice(&[t, 1.0 - t, 0.5]);
        }
        let pose = Pose::from_movenet_output(&values).unwrap();
        let pixels = pose.to_pixels(1280, 720);

        for (kp, px) in pose.keypoints.iter().zip(pixels.iter()) {
            assert_eq!(px.x, (1280.0 * kp.x).floor() as i32);
            assert_eq!(px.y, (720.0 * kp.y).floor() as i32);
        }
    }

    #[test]
    fn test_pose_average_confidence() {
        let pose = Pose::new([Keypoint::new(0.0, 0.0, 0.5); KeypointIndex::COUNT]);
        assert!((pose.average_confidence() - 0.5).abs() < 0.001);
    }
}
