pub mod detector;
pub mod keypoint;
pub mod preprocess;
pub mod preset;

pub use detector::{InputElement, PoseDetector};
pub use keypoint::{Keypoint, KeypointIndex, PixelKeypoint, PixelPose, Pose};
pub use preprocess::preprocess_for_movenet;
pub use preset::{ModelPreset, ModelVariant, Precision};
