use std::time::Duration;

use crate::accumulator::{Accumulator, DEFAULT_NORM, Retention};
use crate::camera::{FrameSource, normalize_frame};
use crate::display::{FrameDisplay, View, is_quit_key};
use crate::error::{AccumulatorError, Result};
use crate::transform::AffineWarp;
use crate::utils::FpsMeter;

/// Settings for one run of the loop.
#[derive(Clone, Debug)]
pub struct LoopConfig {
    pub norm: f64,
    pub retention: Retention,
    /// Key-poll timeout in milliseconds.
    pub key_delay_ms: i32,
    /// Divide the accumulator by 255 before showing it.
    pub rescale: bool,
    /// Warp each frame with [`AffineWarp::fixed`] and show it in its own window.
    pub show_warp: bool,
    /// How often to log the frame rate. Zero disables the report.
    pub fps_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            norm: DEFAULT_NORM,
            retention: Retention::Mean,
            key_delay_ms: 1,
            rescale: false,
            show_warp: false,
            fps_interval: Duration::from_secs(5),
        }
    }
}

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames blended into the accumulator.
    pub frames: u64,
    /// The raw key code that stopped the loop.
    pub quit_key: i32,
}

/// Everything that persists between iterations.
pub struct LoopState {
    accumulator: Accumulator,
    warp: Option<AffineWarp>,
    fps: FpsMeter,
}

impl LoopState {
    /// Read one frame to learn the frame shape and derive a zeroed accumulator from it. That frame
    /// is not blended.
    pub fn initialize<S: FrameSource>(source: &mut S, config: &LoopConfig) -> Result<Self> {
        let raw = source
            .read_frame()?
            .ok_or(AccumulatorError::FrameRead { frame_count: 0 })?;
        let first = normalize_frame(&raw)?;
        let accumulator = Accumulator::new(&first, config.norm, config.retention)?;
        let warp = if config.show_warp {
            Some(AffineWarp::fixed()?)
        } else {
            None
        };
        log::debug!(
            "Accumulator initialized with shape {:?}",
            accumulator.shape()?
        );
        Ok(Self {
            accumulator,
            warp,
            fps: FpsMeter::new(config.fps_interval),
        })
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    /// One iteration: read, normalize, blend, render, poll. Returns the key code if it asks the
    /// loop to quit.
    pub fn step<S: FrameSource, D: FrameDisplay>(
        &mut self,
        source: &mut S,
        display: &mut D,
        config: &LoopConfig,
    ) -> Result<Option<i32>> {
        let raw = source
            .read_frame()?
            .ok_or(AccumulatorError::FrameRead {
                frame_count: self.accumulator.blended_frames(),
            })?;
        let gray = normalize_frame(&raw)?;

        if let Some(warp) = &self.warp {
            display.show(View::Warp, &warp.warp(&gray)?)?;
        }

        self.accumulator.blend(&gray)?;
        display.show(View::Accumulator, &self.accumulator.rendered(config.rescale)?)?;

        if let Some(fps) = self.fps.tick() {
            log::info!(
                "{:.1} FPS ({} frames blended)",
                fps,
                self.accumulator.blended_frames()
            );
        }

        let key = display.poll_key(config.key_delay_ms)?;
        if is_quit_key(key) {
            log::info!(
                "Quit key received after {} frames",
                self.accumulator.blended_frames()
            );
            return Ok(Some(key));
        }
        Ok(None)
    }
}

/// Run the loop until the quit key is pressed or something fails.
///
/// `source` and `display` are consumed and dropped before this returns, on success and on error
/// alike, which releases the capture device and closes the windows.
pub fn run<S: FrameSource, D: FrameDisplay>(
    mut source: S,
    mut display: D,
    config: &LoopConfig,
) -> Result<RunSummary> {
    let mut state = LoopState::initialize(&mut source, config)?;
    loop {
        if let Some(quit_key) = state.step(&mut source, &mut display, config)? {
            return Ok(RunSummary {
                frames: state.accumulator.blended_frames(),
                quit_key,
            });
        }
    }
}
