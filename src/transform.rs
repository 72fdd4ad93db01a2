use opencv::{
    core::{BORDER_CONSTANT, CV_64FC1, Scalar},
    imgproc,
    prelude::*,
};

extern crate nalgebra as na;

use crate::error::{AccumulatorError, Result};

pub const SOURCE_POINTS: [na::Point2<f64>; 3] = [
    na::Point2::new(50.0, 50.0),
    na::Point2::new(200.0, 50.0),
    na::Point2::new(50.0, 200.0),
];

pub const TARGET_POINTS: [na::Point2<f64>; 3] = [
    na::Point2::new(10.0, 100.0),
    na::Point2::new(200.0, 50.0),
    na::Point2::new(100.0, 250.0),
];

/// Solve for the affine map $A$ with $A [x_i, y_i, 1]^T = [u_i, v_i]^T$ for three point pairs.
pub fn affine_from_points(
    src: &[na::Point2<f64>; 3],
    dst: &[na::Point2<f64>; 3],
) -> Result<na::Matrix2x3<f64>> {
    let m = na::Matrix3::new(
        src[0].x, src[0].y, 1.0,
        src[1].x, src[1].y, 1.0,
        src[2].x, src[2].y, 1.0,
    );
    if m.determinant().abs() < 1e-9 {
        return Err(AccumulatorError::DegenerateTransform);
    }
    let m_inv = m.try_inverse().ok_or(AccumulatorError::DegenerateTransform)?;
    let row_x = m_inv * na::Vector3::new(dst[0].x, dst[1].x, dst[2].x);
    let row_y = m_inv * na::Vector3::new(dst[0].y, dst[1].y, dst[2].y);
    Ok(na::Matrix2x3::from_rows(&[row_x.transpose(), row_y.transpose()]))
}

/// An affine warp defined by three point correspondences. The matrix is solved once on
/// construction.
pub struct AffineWarp {
    matrix: na::Matrix2x3<f64>,
    matrix_mat: Mat,
}

impl AffineWarp {
    pub fn new(src: &[na::Point2<f64>; 3], dst: &[na::Point2<f64>; 3]) -> Result<Self> {
        let matrix = affine_from_points(src, dst)?;
        let mut matrix_mat = Mat::new_rows_cols_with_default(2, 3, CV_64FC1, Scalar::all(0.0))?;
        for r in 0..2 {
            for c in 0..3 {
                *matrix_mat.at_2d_mut::<f64>(r as i32, c as i32)? = matrix[(r, c)];
            }
        }
        Ok(Self { matrix, matrix_mat })
    }

    /// The warp between [`SOURCE_POINTS`] and [`TARGET_POINTS`].
    pub fn fixed() -> Result<Self> {
        Self::new(&SOURCE_POINTS, &TARGET_POINTS)
    }

    pub fn matrix_mat(&self) -> &Mat {
        &self.matrix_mat
    }

    pub fn map_point(&self, p: &na::Point2<f64>) -> na::Point2<f64> {
        na::Point2::from(self.matrix * p.to_homogeneous())
    }

    /// Warp `frame` into an output of the same size. Pixels mapped from outside the frame are
    /// black.
    pub fn warp(&self, frame: &Mat) -> Result<Mat> {
        let mut warped = Mat::default();
        imgproc::warp_affine(
            frame,
            &mut warped,
            &self.matrix_mat,
            frame.size()?,
            imgproc::INTER_LINEAR,
            BORDER_CONSTANT,
            Scalar::default(),
        )?;
        Ok(warped)
    }
}
