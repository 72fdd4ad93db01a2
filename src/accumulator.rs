use opencv::{
    core::{self, CV_64F, Size},
    prelude::*,
};

use crate::error::{AccumulatorError, Result};

/// Default normalisation applied to every blend weight.
pub const DEFAULT_NORM: f64 = 25.0 / 256.0;

/// How much of the accumulator survives each blend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Retention {
    /// Keep `1 - 1/frame_count`. The accumulator is `norm` times the running mean of all frames.
    #[default]
    Mean,
    /// Keep `1 - α`. The accumulator creeps toward the input and never reaches it.
    Complement,
}

impl Retention {
    pub fn retained_weight(&self, norm: f64, frame_count: u64) -> f64 {
        match self {
            Self::Mean => 1.0 - 1.0 / frame_count as f64,
            Self::Complement => 1.0 - blend_weight(norm, frame_count),
        }
    }
}

/// The contribution α of the frame blended on iteration `frame_count` (1-based).
pub fn blend_weight(norm: f64, frame_count: u64) -> f64 {
    norm / frame_count as f64
}

/// A floating-point running average of grayscale frames.
///
/// The accumulator has the shape of the frame it was derived from, and every frame blended into
/// it must have that same shape.
pub struct Accumulator {
    sum: Mat,
    blends: u64,
    norm: f64,
    retention: Retention,
}

impl Accumulator {
    /// Derive an all-zero accumulator with the shape and channel count of `first`.
    ///
    /// `first` only provides the shape; it is not blended in.
    pub fn new(first: &Mat, norm: f64, retention: Retention) -> Result<Self> {
        if first.empty() {
            return Err(AccumulatorError::EmptyFrame);
        }
        let mut sum = Mat::default();
        first.convert_to(&mut sum, CV_64F, 0.0, 0.0)?;
        Ok(Self {
            sum,
            blends: 0,
            norm,
            retention,
        })
    }

    /// The iteration counter used in the blend weight. It is 1 before the first blend and equals
    /// the number of completed blends afterwards.
    pub fn frame_count(&self) -> u64 {
        self.blends.max(1)
    }

    /// Number of frames blended so far. Unlike [`Accumulator::frame_count`] this starts at 0.
    pub fn blended_frames(&self) -> u64 {
        self.blends
    }

    pub fn shape(&self) -> Result<(Size, i32)> {
        Ok((self.sum.size()?, self.sum.channels()))
    }

    pub fn image(&self) -> &Mat {
        &self.sum
    }

    /// Blend `frame` into the accumulator with weight `norm / frame_count`.
    pub fn blend(&mut self, frame: &Mat) -> Result<()> {
        let expected = self.shape()?;
        let actual = (frame.size()?, frame.channels());
        if expected != actual {
            return Err(AccumulatorError::DimensionMismatch { expected, actual });
        }

        let frame_count = self.blends + 1;
        let alpha = blend_weight(self.norm, frame_count);
        let retained = self.retention.retained_weight(self.norm, frame_count);

        let mut frame_f64 = Mat::default();
        frame.convert_to(&mut frame_f64, CV_64F, 1.0, 0.0)?;
        let mut blended = Mat::default();
        core::add_weighted(&frame_f64, alpha, &self.sum, retained, 0.0, &mut blended, CV_64F)?;

        self.sum = blended;
        self.blends = frame_count;
        log::trace!(
            "Blended frame {} (alpha = {:.6}, retained = {:.6})",
            frame_count,
            alpha,
            retained
        );
        Ok(())
    }

    /// The image to hand to the display. With `rescale` the samples are divided by 255 so that
    /// 8-bit intensities land in the [0, 1] range a float image is shown with.
    pub fn rendered(&self, rescale: bool) -> Result<Mat> {
        if !rescale {
            return Ok(self.sum.clone());
        }
        let mut scaled = Mat::default();
        self.sum.convert_to(&mut scaled, CV_64F, 1.0 / 255.0, 0.0)?;
        Ok(scaled)
    }
}
