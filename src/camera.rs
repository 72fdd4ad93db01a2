use opencv::{
    core::{self, AlgorithmHint},
    imgproc,
    prelude::*,
    videoio,
};

use crate::error::{AccumulatorError, Result};

/// Anything that hands out raw frames one at a time.
///
/// `Ok(None)` means the source is alive but produced no frame on this call; the run loop treats
/// that as fatal. Sources own their underlying device and must release it when dropped.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<Option<Mat>>;
}

/// A video capture device opened through OpenCV.
pub struct Camera {
    index: i32,
    cam: videoio::VideoCapture,
}

impl Camera {
    /// Open the capture device at `index`, optionally requesting a resolution. The device may
    /// ignore the request; the resolution it actually delivers is logged.
    pub fn open(index: i32, resolution: Option<(u32, u32)>) -> Result<Self> {
        let mut cam = videoio::VideoCapture::new(index, videoio::CAP_ANY)?;
        if !videoio::VideoCapture::is_opened(&cam)? {
            return Err(AccumulatorError::DeviceUnavailable { index });
        }
        if let Some((width, height)) = resolution {
            cam.set(videoio::CAP_PROP_FRAME_WIDTH, width as f64)?;
            cam.set(videoio::CAP_PROP_FRAME_HEIGHT, height as f64)?;
        }
        log::info!(
            "Camera {} opened at {}x{}",
            index,
            cam.get(videoio::CAP_PROP_FRAME_WIDTH)?,
            cam.get(videoio::CAP_PROP_FRAME_HEIGHT)?,
        );
        Ok(Self { index, cam })
    }
}

impl FrameSource for Camera {
    fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let grabbed = self.cam.read(&mut frame)?;
        if !grabbed || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        match self.cam.release() {
            Ok(()) => log::info!("Camera {} released", self.index),
            Err(e) => log::error!("Failed to release camera {}: {}", self.index, e),
        }
    }
}

/// Flip `raw` upside down and reduce it to a single-channel grayscale image.
///
/// Three-channel input is read as BGR and four-channel input as BGRA. Input that is already
/// single-channel is only flipped.
pub fn normalize_frame(raw: &Mat) -> Result<Mat> {
    if raw.empty() {
        return Err(AccumulatorError::EmptyFrame);
    }
    let mut flipped = Mat::default();
    core::flip(raw, &mut flipped, 0)?;

    let code = match flipped.channels() {
        1 => return Ok(flipped),
        4 => imgproc::COLOR_BGRA2GRAY,
        _ => imgproc::COLOR_BGR2GRAY,
    };
    let mut gray = Mat::default();
    imgproc::cvt_color(
        &flipped,
        &mut gray,
        code,
        0,
        AlgorithmHint::ALGO_HINT_ACCURATE,
    )?;
    Ok(gray)
}

#[cfg(test)]
mod tests {
    use opencv::core::{CV_8UC1, CV_8UC3, Scalar, Vec3b};

    use super::*;

    #[test]
    fn test_flip_is_vertical() {
        let mut frame = Mat::new_rows_cols_with_default(3, 2, CV_8UC1, Scalar::all(0.0)).unwrap();
        *frame.at_2d_mut::<u8>(0, 1).unwrap() = 200;

        let normalized = normalize_frame(&frame).unwrap();
        assert_eq!(normalized.channels(), 1);
        // the top row moves to the bottom, columns stay where they are
        assert_eq!(*normalized.at_2d::<u8>(2, 1).unwrap(), 200);
        assert_eq!(*normalized.at_2d::<u8>(0, 1).unwrap(), 0);
    }

    #[test]
    fn test_bgr_becomes_gray() {
        let mut frame = Mat::new_rows_cols_with_default(4, 5, CV_8UC3, Scalar::all(0.0)).unwrap();
        *frame.at_2d_mut::<Vec3b>(3, 0).unwrap() = Vec3b::all(255);

        let normalized = normalize_frame(&frame).unwrap();
        assert_eq!(normalized.channels(), 1);
        assert_eq!(normalized.rows(), 4);
        assert_eq!(normalized.cols(), 5);
        assert_eq!(*normalized.at_2d::<u8>(0, 0).unwrap(), 255);
        assert_eq!(*normalized.at_2d::<u8>(3, 0).unwrap(), 0);
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        assert!(matches!(
            normalize_frame(&Mat::default()),
            Err(AccumulatorError::EmptyFrame)
        ));
    }

    #[test]
    fn test_missing_device() {
        // no machine has a capture device at this index
        assert!(matches!(
            Camera::open(9999, None),
            Err(AccumulatorError::DeviceUnavailable { index: 9999 })
        ));
    }
}
