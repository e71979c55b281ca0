pub mod overlay;
pub mod skeleton;
pub mod window;

pub use overlay::{draw_overlay, elapsed_label, KeypointSelection, OverlayOptions};
pub use skeleton::{SKELETON_CONNECTIONS, WRIST_KEYPOINTS};
pub use window::MinifbRenderer;
