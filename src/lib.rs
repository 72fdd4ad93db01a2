/// Frame acquisition from capture devices and frame normalization
pub mod camera;

/// The decaying running average of grayscale frames
pub mod accumulator;

/// Affine warps defined by point correspondences
pub mod transform;

/// Rendering surfaces and key polling
pub mod display;

/// The capture, blend and display loop
pub mod pipeline;

/// Errors shared by every module
pub mod error;

pub mod utils;
