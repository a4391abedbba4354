//! Quaternion-based orientation comparison of paired point sets.
//!
//! The best-fit rotation between two paired point sets is recovered with
//! Horn's closed-form method: the unit quaternion is the eigenvector belonging
//! to the largest eigenvalue of a 4x4 symmetric matrix assembled from the
//! cross-covariance of the two sets. The eigenvector is only defined up to
//! sign, so the rotation angle derived from it spans [0, 2π].

use super::geometry::{GeometryError, center_points};
use nalgebra::{Matrix3, Matrix4, Point3, Quaternion, SymmetricEigen};
use std::f64::consts::PI;

/// Best-fit rotation (as a possibly sign-flipped quaternion) taking `moved` onto `fixed`.
///
/// The sets are used exactly as given: callers that need a rotation about the
/// centroids must center them first (see [`orientation_angle`]).
pub fn relative_orientation(
    fixed: &[Point3<f64>],
    moved: &[Point3<f64>],
) -> Result<Quaternion<f64>, GeometryError> {
    if fixed.len() != moved.len() {
        return Err(GeometryError::LengthMismatch {
            left: fixed.len(),
            right: moved.len(),
        });
    }
    if fixed.is_empty() {
        return Err(GeometryError::TooFewPoints {
            required: 1,
            found: 0,
        });
    }

    // s[(a, b)] = sum over pairs of moved_a * fixed_b
    let mut s = Matrix3::zeros();
    for (f, m) in fixed.iter().zip(moved.iter()) {
        s += m.coords * f.coords.transpose();
    }
    let (sxx, sxy, sxz) = (s[(0, 0)], s[(0, 1)], s[(0, 2)]);
    let (syx, syy, syz) = (s[(1, 0)], s[(1, 1)], s[(1, 2)]);
    let (szx, szy, szz) = (s[(2, 0)], s[(2, 1)], s[(2, 2)]);

    #[rustfmt::skip]
    let n = Matrix4::new(
        sxx + syy + szz, syz - szy,        szx - sxz,        sxy - syx,
        syz - szy,       sxx - syy - szz,  sxy + syx,        szx + sxz,
        szx - sxz,       sxy + syx,        -sxx + syy - szz, syz + szy,
        sxy - syx,       szx + sxz,        syz + szy,        -sxx - syy + szz,
    );

    let eigen = SymmetricEigen::new(n);
    let dominant = eigen.eigenvalues.imax();
    let q = eigen.eigenvectors.column(dominant);

    Ok(Quaternion::new(q[0], q[1], q[2], q[3]).normalize())
}

/// Rotation angle encoded by a unit quaternion, in [0, 2π].
///
/// No sign canonicalisation is applied: `q` and `-q` describe the same
/// rotation but yield `θ` and `2π - θ` respectively.
pub fn rotation_angle(q: &Quaternion<f64>) -> f64 {
    let angle = 2.0 * q.imag().norm().atan2(q.scalar());
    angle.clamp(0.0, 2.0 * PI)
}

/// Raw angle of the best-fit rotation between two paired point sets, in [0, 2π].
///
/// When `centered` is false the sets are centered on copies before fitting,
/// so only their relative orientation contributes. When `centered` is true
/// the coordinates are taken as-is.
pub fn orientation_angle(
    fixed: &[Point3<f64>],
    moved: &[Point3<f64>],
    centered: bool,
) -> Result<f64, GeometryError> {
    let q = if centered {
        relative_orientation(fixed, moved)?
    } else {
        relative_orientation(&center_points(fixed), &center_points(moved))?
    };
    Ok(rotation_angle(&q))
}
