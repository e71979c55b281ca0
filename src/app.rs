//! フレームごとの キャプチャ → 推論 → 描画 → 表示 ループ。

use anyhow::Result;
use opencv::{core::Mat, prelude::*};
use std::time::{Duration, Instant};

use crate::camera::{mirror_frame, OpenCvCamera};
use crate::pose::{preprocess_for_movenet, Pose, PoseDetector};
use crate::render::{draw_overlay, MinifbRenderer, OverlayOptions};

/// フレームの供給元
pub trait FrameSource {
    /// 次のフレーム。終端なら `None`。
    fn next_frame(&mut self) -> Result<Option<Mat>>;

    /// ハンドルを解放する
    fn release(&mut self) -> Result<()>;
}

/// フレームから姿勢を推定する
pub trait PoseEstimator {
    fn estimate(&mut self, frame: &Mat) -> Result<Pose>;
}

/// 描画済みフレームの表示先
pub trait FrameSink {
    fn show(&mut self, frame: &Mat) -> Result<()>;

    /// 終了キーが押された、またはウィンドウが閉じられた
    fn close_requested(&self) -> bool;
}

impl FrameSource for OpenCvCamera {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        self.read_frame()
    }

    fn release(&mut self) -> Result<()> {
        OpenCvCamera::release(self)
    }
}

/// 入力サイズ付きの MoveNet 推定器
pub struct MoveNet {
    detector: PoseDetector,
    input_size: i32,
}

impl MoveNet {
    pub fn new(detector: PoseDetector, input_size: i32) -> Self {
        Self {
            detector,
            input_size,
        }
    }
}

impl PoseEstimator for MoveNet {
    fn estimate(&mut self, frame: &Mat) -> Result<Pose> {
        let input = preprocess_for_movenet(frame, self.input_size)?;
        self.detector.detect(input)
    }
}

impl FrameSink for MinifbRenderer {
    fn show(&mut self, frame: &Mat) -> Result<()> {
        self.draw_frame(frame)?;
        self.update()
    }

    fn close_requested(&self) -> bool {
        !self.is_open() || self.cancel_requested()
    }
}

/// ループ終了の理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// キャプチャがフレームを返さなくなった
    EndOfStream,
    /// Esc またはウィンドウを閉じた
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub reason: StopReason,
    pub frames: u64,
}

enum Step {
    Continue,
    Stop(StopReason),
}

/// 1秒ごとの FPS / 平均信頼度
struct FrameStats {
    frames: u32,
    confidence_sum: f32,
    since: Instant,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frames: 0,
            confidence_sum: 0.0,
            since: Instant::now(),
        }
    }

    fn record(&mut self, pose: &Pose) {
        self.frames += 1;
        self.confidence_sum += pose.average_confidence();

        let elapsed = self.since.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            log::info!(
                "FPS: {:.1}, Avg confidence: {:.2}",
                self.frames as f32 / elapsed,
                self.confidence_sum / self.frames as f32
            );
            *self = Self::new();
        }
    }
}

/// キャプチャ・推定器・表示先を所有するループ本体
pub struct App<S: FrameSource, E: PoseEstimator, D: FrameSink> {
    source: S,
    estimator: E,
    sink: D,
    mirror: bool,
    overlay: OverlayOptions,
    frames: u64,
    released: bool,
    stats: FrameStats,
}

impl<S: FrameSource, E: PoseEstimator, D: FrameSink> App<S, E, D> {
    pub fn new(source: S, estimator: E, sink: D, mirror: bool, overlay: OverlayOptions) -> Self {
        Self {
            source,
            estimator,
            sink,
            mirror,
            overlay,
            frames: 0,
            released: false,
            stats: FrameStats::new(),
        }
    }

    /// 終了までループし、最後にキャプチャを解放する
    ///
    /// ループ中のエラーでも解放してからエラーを返す。
    pub fn run(&mut self) -> Result<RunSummary> {
        let outcome = self.run_loop();
        self.shutdown()?;
        let reason = outcome?;
        Ok(RunSummary {
            reason,
            frames: self.frames,
        })
    }

    fn run_loop(&mut self) -> Result<StopReason> {
        loop {
            if let Step::Stop(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    fn step(&mut self) -> Result<Step> {
        let start = Instant::now();

        let frame = match self.source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!("No more frames");
                return Ok(Step::Stop(StopReason::EndOfStream));
            }
            Err(e) => {
                log::warn!("Frame capture error: {:#}", e);
                return Ok(Step::Stop(StopReason::EndOfStream));
            }
        };
        let frame = if self.mirror {
            mirror_frame(&frame)?
        } else {
            frame
        };

        let pose = self.estimator.estimate(&frame)?;
        let pixels = pose.to_pixels(frame.cols() as u32, frame.rows() as u32);
        let elapsed = start.elapsed();
        log_frame_time(elapsed);

        let annotated = draw_overlay(&frame, &pixels, elapsed, &self.overlay)?;
        self.sink.show(&annotated)?;
        self.frames += 1;
        self.stats.record(&pose);

        if self.sink.close_requested() {
            log::info!("Cancelled by user");
            return Ok(Step::Stop(StopReason::Cancelled));
        }
        Ok(Step::Continue)
    }

    /// キャプチャを解放する。何度呼んでも解放は一度だけ。
    pub fn shutdown(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.source.release()
    }
}

fn log_frame_time(elapsed: Duration) {
    log::debug!("frame processed in {:.1}ms", elapsed.as_secs_f64() * 1000.0);
}
