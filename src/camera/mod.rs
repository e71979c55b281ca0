pub mod capture;

pub use capture::{mirror_frame, CaptureSource, OpenCvCamera};
