use std::error::Error;
use std::fmt::{Debug, Display};

use opencv::core::Size;

/// Every way the capture/accumulate/display loop can fail. None of these are retried.
pub enum AccumulatorError {
    /// The capture device at `index` could not be opened.
    DeviceUnavailable { index: i32 },

    /// The capture device returned no frame while `frame_count` frames had been blended.
    FrameRead { frame_count: u64 },

    /// An accumulator cannot be derived from an empty frame.
    EmptyFrame,

    /// The window could not be created or drawn into.
    Display {
        window: String,
        source: opencv::Error,
    },

    /// The incoming frame does not have the accumulator's shape.
    DimensionMismatch {
        expected: (Size, i32),
        actual: (Size, i32),
    },

    /// The three source points of an affine correspondence are collinear.
    DegenerateTransform,

    OpenCv(opencv::Error),
}

impl AccumulatorError {
    pub fn display<S: Into<String>>(window: S, source: opencv::Error) -> Self {
        Self::Display {
            window: window.into(),
            source,
        }
    }
}

impl Debug for AccumulatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceUnavailable { index } => {
                write!(f, "Unable to open capture device at index {}", index)
            }
            Self::FrameRead { frame_count } => write!(
                f,
                "Capture device returned no frame (after {} blended frames)",
                frame_count
            ),
            Self::EmptyFrame => write!(f, "Cannot derive an accumulator from an empty frame"),
            Self::Display { window, source } => {
                write!(f, "Display error on window \"{}\": {}", window, source)
            }
            Self::DimensionMismatch { expected, actual } => write!(
                f,
                "Frame shape mismatch! Expected {}x{} with {} channel(s), got {}x{} with {} channel(s).",
                expected.0.width,
                expected.0.height,
                expected.1,
                actual.0.width,
                actual.0.height,
                actual.1,
            ),
            Self::DegenerateTransform => {
                write!(f, "Affine correspondence points must not be collinear")
            }
            Self::OpenCv(e) => write!(f, "OpenCV error: {}", e),
        }
    }
}

impl Display for AccumulatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for AccumulatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Display { source, .. } => Some(source),
            Self::OpenCv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<opencv::Error> for AccumulatorError {
    fn from(value: opencv::Error) -> Self {
        Self::OpenCv(value)
    }
}

pub type Result<T> = std::result::Result<T, AccumulatorError>;
