use nalgebra::{Isometry3, Matrix3, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GeometryError {
    #[error("Point sets differ in size ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    #[error("At least {required} points are required, found {found}")]
    TooFewPoints { required: usize, found: usize },
    #[error("Singular value decomposition did not produce both factors")]
    Decomposition,
}

/// A least-squares rigid-body fit of one point set onto another.
#[derive(Debug, Clone, PartialEq)]
pub struct Superposition {
    pub transform: Isometry3<f64>, // Maps the moved set onto the fixed set
    pub rmsd: f64,                 // RMSD after the transform is applied
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Some(Point3::from(sum / points.len() as f64))
}

pub fn center_points(points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    match centroid(points) {
        Some(c) => points.iter().map(|p| Point3::from(p - c)).collect(),
        None => Vec::new(),
    }
}

pub fn transform_points(transform: &Isometry3<f64>, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    points.iter().map(|p| transform.transform_point(p)).collect()
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// Computes the rigid transform that best superposes `moved` onto `fixed` (Kabsch).
///
/// Point `i` of `moved` is paired with point `i` of `fixed`. The returned
/// transform is a proper rotation (reflections are corrected) followed by a
/// translation.
///
/// # Errors
///
/// Returns [`GeometryError::LengthMismatch`] for unequal sets and
/// [`GeometryError::TooFewPoints`] when fewer than three pairs are given.
pub fn superpose(
    fixed: &[Point3<f64>],
    moved: &[Point3<f64>],
) -> Result<Superposition, GeometryError> {
    if fixed.len() != moved.len() {
        return Err(GeometryError::LengthMismatch {
            left: fixed.len(),
            right: moved.len(),
        });
    }
    if fixed.len() < 3 {
        return Err(GeometryError::TooFewPoints {
            required: 3,
            found: fixed.len(),
        });
    }

    let (Some(fixed_center), Some(moved_center)) = (centroid(fixed), centroid(moved)) else {
        return Err(GeometryError::TooFewPoints {
            required: 3,
            found: 0,
        });
    };

    let mut covariance = Matrix3::zeros();
    for (f, m) in fixed.iter().zip(moved.iter()) {
        covariance += (m - moved_center) * (f - fixed_center).transpose();
    }

    let svd = covariance.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        return Err(GeometryError::Decomposition);
    };
    let v = v_t.transpose();

    let d = if (v * u.transpose()).determinant() < 0.0 {
        -1.0
    } else {
        1.0
    };
    let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, d));
    let rotation_matrix = v * correction * u.transpose();

    let rotation =
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(rotation_matrix));
    let translation = fixed_center.coords - rotation * moved_center.coords;
    let transform = Isometry3::from_parts(Translation3::from(translation), rotation);

    let rmsd = calculate_rmsd(fixed, &transform_points(&transform, moved)).unwrap_or(0.0);

    Ok(Superposition { transform, rmsd })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn tetrahedron() -> Vec<Point3<f64>> {
        vec![
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(4.0, 0.5, -1.0),
            Point3::new(-2.0, 1.0, 0.0),
            Point3::new(0.0, -3.0, 2.5),
            Point3::new(2.2, 2.2, -2.2),
        ]
    }

    #[test]
    fn centroid_of_empty_set_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn center_points_moves_centroid_to_origin() {
        let centered = center_points(&tetrahedron());
        let c = centroid(&centered).unwrap();
        assert!(c.coords.norm() < 1e-12);
    }

    #[test]
    fn rmsd_requires_equal_non_empty_sets() {
        let a = tetrahedron();
        assert!(calculate_rmsd(&a, &a[..2]).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
        assert_eq!(calculate_rmsd(&a, &a), Some(0.0));
    }

    #[test]
    fn superpose_recovers_known_isometry() {
        let fixed = tetrahedron();
        let known = Isometry3::from_parts(
            Translation3::new(5.0, -2.0, 7.5),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let moved = transform_points(&known.inverse(), &fixed);

        let fit = superpose(&fixed, &moved).unwrap();
        assert!(fit.rmsd < 1e-9, "rmsd was {}", fit.rmsd);
        let restored = transform_points(&fit.transform, &moved);
        for (a, b) in restored.iter().zip(fixed.iter()) {
            assert!((a - b).norm() < 1e-9);
        }
    }

    #[test]
    fn superpose_never_returns_a_reflection() {
        let fixed = tetrahedron();
        let mirrored: Vec<_> = fixed.iter().map(|p| Point3::new(-p.x, p.y, p.z)).collect();
        let fit = superpose(&fixed, &mirrored).unwrap();
        let det = fit.transform.rotation.to_rotation_matrix().matrix().determinant();
        assert!((det - 1.0).abs() < 1e-9);
        assert!(fit.rmsd > 0.1);
    }

    #[test]
    fn superpose_rejects_mismatched_and_tiny_sets() {
        let a = tetrahedron();
        assert_eq!(
            superpose(&a, &a[..4]),
            Err(GeometryError::LengthMismatch { left: 5, right: 4 })
        );
        assert_eq!(
            superpose(&a[..2], &a[..2]),
            Err(GeometryError::TooFewPoints {
                required: 3,
                found: 2
            })
        );
    }
}
