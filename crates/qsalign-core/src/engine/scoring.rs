use super::error::EngineError;
use super::result::AlignmentResult;
use crate::core::utils::geometry::{GeometryError, transform_points};
use crate::core::utils::quaternions::orientation_angle;
use nalgebra::{Isometry3, Point3};
use std::f64::consts::PI;
use tracing::{debug, instrument};

/// Residual orientation of one mapped subunit pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairOrientation {
    pub query: String,  // Name of the query subunit
    pub target: String, // Name of the target subunit
    pub angle: f64,     // Radians, in [0, π]
}

/// Folds a raw quaternion angle in [0, 2π] onto [0, π].
///
/// A rotation by `r` and by `2π - r` are equally misoriented, so the smaller
/// of the two is kept.
pub fn normalize_orientation_angle(raw: f64) -> f64 {
    debug_assert!(
        (-1e-9..=2.0 * PI + 1e-9).contains(&raw),
        "raw quaternion angle {raw} outside [0, 2π]"
    );
    (2.0 * PI - raw).abs().min(raw)
}

/// Orientation angle between a query point set and a target point set after
/// `transform` has been applied to the target.
///
/// Point `i` of one set pairs with point `i` of the other. Both sets are
/// centered on their own centroids before fitting, so the angle measures the
/// rotation of the subunit about itself and ignores any residual offset.
pub fn pair_orientation_angle(
    query_points: &[Point3<f64>],
    target_points: &[Point3<f64>],
    transform: &Isometry3<f64>,
) -> Result<f64, GeometryError> {
    let moved = transform_points(transform, target_points);
    let raw = orientation_angle(query_points, &moved, false)?;
    Ok(normalize_orientation_angle(raw))
}

/// Computes one orientation angle per entry of the subunit map, in map order.
///
/// # Errors
///
/// Returns [`EngineError::InvalidCorrespondence`] when a pair's aligned point
/// sets are empty or differ in size, or when the result carries no global
/// transform for a non-empty correspondence.
#[instrument(skip_all, name = "orientation_scoring")]
pub fn score(result: &AlignmentResult) -> Result<Vec<PairOrientation>, EngineError> {
    let map = result.subunit_map();
    let mut orientations = Vec::with_capacity(map.len());

    for (q, t) in map.iter() {
        let query = result.subunits1()[q].name().to_string();
        let target = result.subunits2()[t].name().to_string();

        let Some(transform) = result.alignment().global_transform() else {
            return Err(EngineError::InvalidCorrespondence {
                query,
                target,
                reason: "alignment carries no target-to-query transform".to_string(),
            });
        };

        let aligned1 = result.aligned_points_for_subunit1(q);
        let aligned2 = result.aligned_points_for_subunit2(t);
        if aligned1.is_empty() || aligned2.is_empty() {
            return Err(EngineError::InvalidCorrespondence {
                query,
                target,
                reason: "aligned point set is empty".to_string(),
            });
        }
        if aligned1.len() != aligned2.len() {
            return Err(EngineError::InvalidCorrespondence {
                query,
                target,
                reason: format!(
                    "aligned point sets differ in size ({} vs {})",
                    aligned1.len(),
                    aligned2.len()
                ),
            });
        }

        let angle = pair_orientation_angle(&aligned1, &aligned2, transform)?;
        debug!("Orientation {}-{}: {:.4} rad", query, target, angle);
        orientations.push(PairOrientation {
            query,
            target,
            angle,
        });
    }

    Ok(orientations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::subunit::Subunit;
    use crate::engine::result::{Block, BlockSet, Relation, StructuralAlignment, SubunitMap};
    use nalgebra::{Translation3, UnitQuaternion, Vector3};

    fn shape(offset: f64) -> Vec<Point3<f64>> {
        vec![
            Point3::new(offset, 0.0, 0.0),
            Point3::new(offset + 1.5, 0.0, 0.0),
            Point3::new(offset, 2.0, 0.0),
            Point3::new(offset, 0.0, 2.5),
            Point3::new(offset + 0.7, -1.0, 1.2),
        ]
    }

    fn full_block(q: usize, t: usize, n: usize) -> Block {
        Block {
            query_subunit: q,
            target_subunit: t,
            aligned_residues: (0..n).map(|i| (i, i)).collect(),
        }
    }

    fn result_with(
        query: Vec<Subunit>,
        target: Vec<Subunit>,
        pairs: &[(usize, usize)],
        global: Isometry3<f64>,
    ) -> AlignmentResult {
        let blocks = pairs
            .iter()
            .map(|&(q, t)| full_block(q, t, query[q].len().min(target[t].len())))
            .collect();
        let alignment = StructuralAlignment::new(vec![BlockSet {
            transformations: vec![Isometry3::identity(), global],
            blocks,
        }]);
        AlignmentResult::new(
            query,
            target,
            SubunitMap::from_pairs(pairs.iter().copied()).unwrap(),
            Relation::Equivalent,
            0.0,
            alignment,
        )
        .unwrap()
    }

    #[test]
    fn normalization_keeps_angles_below_pi() {
        assert!((normalize_orientation_angle(1.0) - 1.0).abs() < 1e-12);
        assert!(normalize_orientation_angle(0.0).abs() < 1e-12);
    }

    #[test]
    fn normalization_folds_angles_above_pi() {
        let raw = 5.0;
        assert!((normalize_orientation_angle(raw) - (2.0 * PI - raw)).abs() < 1e-12);
        assert!(normalize_orientation_angle(2.0 * PI).abs() < 1e-12);
        assert!((normalize_orientation_angle(PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn empty_map_scores_to_empty_sequence() {
        let result = AlignmentResult::new(
            vec![Subunit::new("A", "q", "AAAAA", shape(0.0))],
            vec![Subunit::new("X", "t", "AAAAA", shape(0.0))],
            SubunitMap::new(),
            Relation::Different,
            0.0,
            StructuralAlignment::empty(),
        )
        .unwrap();
        assert!(score(&result).unwrap().is_empty());
    }

    #[test]
    fn identical_sets_under_identity_score_zero() {
        let result = result_with(
            vec![
                Subunit::new("A", "q", "AAAAA", shape(0.0)),
                Subunit::new("B", "q", "AAAAA", shape(10.0)),
            ],
            vec![
                Subunit::new("X", "t", "AAAAA", shape(0.0)),
                Subunit::new("Y", "t", "AAAAA", shape(10.0)),
            ],
            &[(0, 0), (1, 1)],
            Isometry3::identity(),
        );

        let angles = score(&result).unwrap();
        assert_eq!(angles.len(), 2);
        assert_eq!((angles[0].query.as_str(), angles[0].target.as_str()), ("A", "X"));
        assert_eq!((angles[1].query.as_str(), angles[1].target.as_str()), ("B", "Y"));
        assert!(angles.iter().all(|a| a.angle.abs() < 1e-6));
    }

    #[test]
    fn global_transform_is_applied_before_measuring() {
        let global = Isometry3::from_parts(
            Translation3::new(3.0, -1.0, 2.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1.1),
        );
        let target_points: Vec<_> = shape(0.0)
            .iter()
            .map(|p| global.inverse_transform_point(p))
            .collect();
        let result = result_with(
            vec![Subunit::new("A", "q", "AAAAA", shape(0.0))],
            vec![Subunit::new("X", "t", "AAAAA", target_points)],
            &[(0, 0)],
            global,
        );

        let angles = score(&result).unwrap();
        assert!(angles[0].angle.abs() < 1e-6, "angle was {}", angles[0].angle);
    }

    #[test]
    fn residual_rotation_is_reported_within_bounds() {
        let residual = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.5);
        let target_points: Vec<_> = shape(0.0).iter().map(|p| residual * p).collect();
        let result = result_with(
            vec![Subunit::new("A", "q", "AAAAA", shape(0.0))],
            vec![Subunit::new("X", "t", "AAAAA", target_points)],
            &[(0, 0)],
            Isometry3::identity(),
        );

        let angle = score(&result).unwrap()[0].angle;
        assert!((angle - 0.5).abs() < 1e-6);
        assert!((0.0..=PI).contains(&angle));
    }

    #[test]
    fn rotation_is_measured_about_the_subunit_centroid() {
        let query_points: Vec<_> = (0..20)
            .map(|i| {
                let a = i as f64 * 0.9;
                Point3::new(40.0 + 2.0 * a.cos(), 10.0 + 2.0 * a.sin(), 1.2 * i as f64)
            })
            .collect();
        let center = crate::core::utils::geometry::centroid(&query_points).unwrap();
        let spin = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.3);
        let target_points: Vec<_> = query_points
            .iter()
            .map(|p| center + spin * (p - center))
            .collect();

        let result = result_with(
            vec![Subunit::new("A", "q", &"A".repeat(20), query_points)],
            vec![Subunit::new("X", "t", &"A".repeat(20), target_points)],
            &[(0, 0)],
            Isometry3::identity(),
        );

        let angle = score(&result).unwrap()[0].angle;
        assert!((angle - 0.3).abs() < 1e-6, "angle was {angle}");
    }

    #[test]
    fn residual_translation_does_not_count_as_rotation() {
        let target_points: Vec<_> = shape(25.0)
            .iter()
            .map(|p| p + Vector3::new(0.0, 3.0, -2.0))
            .collect();
        let result = result_with(
            vec![Subunit::new("A", "q", "AAAAA", shape(25.0))],
            vec![Subunit::new("X", "t", "AAAAA", target_points)],
            &[(0, 0)],
            Isometry3::identity(),
        );

        assert!(score(&result).unwrap()[0].angle.abs() < 1e-6);
    }

    #[test]
    fn angles_follow_map_insertion_order() {
        let query = vec![
            Subunit::new("A", "q", "AAAAA", shape(0.0)),
            Subunit::new("B", "q", "AAAAA", shape(10.0)),
        ];
        let target = vec![
            Subunit::new("X", "t", "AAAAA", shape(0.0)),
            Subunit::new("Y", "t", "AAAAA", shape(10.0)),
        ];

        let forward = score(&result_with(
            query.clone(),
            target.clone(),
            &[(0, 0), (1, 1)],
            Isometry3::identity(),
        ))
        .unwrap();
        let reversed = score(&result_with(
            query,
            target,
            &[(1, 1), (0, 0)],
            Isometry3::identity(),
        ))
        .unwrap();

        let names = |v: &[PairOrientation]| -> Vec<String> {
            v.iter().map(|p| format!("{}-{}", p.query, p.target)).collect()
        };
        assert_eq!(names(&forward), vec!["A-X", "B-Y"]);
        assert_eq!(names(&reversed), vec!["B-Y", "A-X"]);
    }

    #[test]
    fn mismatched_aligned_sizes_are_invalid_correspondence() {
        // Query subunit 0 is aligned over 4 residues, target subunit 0 over 5.
        let alignment = StructuralAlignment::new(vec![BlockSet {
            transformations: vec![Isometry3::identity(), Isometry3::identity()],
            blocks: vec![
                Block {
                    query_subunit: 0,
                    target_subunit: 1,
                    aligned_residues: (0..4).map(|i| (i, i)).collect(),
                },
                full_block(1, 0, 5),
            ],
        }]);

        let result = AlignmentResult::new(
            vec![
                Subunit::new("A", "q", "AAAAA", shape(0.0)),
                Subunit::new("B", "q", "AAAAA", shape(10.0)),
            ],
            vec![
                Subunit::new("X", "t", "AAAAA", shape(0.0)),
                Subunit::new("Y", "t", "AAAAA", shape(10.0)),
            ],
            SubunitMap::from_pairs([(0, 0)]).unwrap(),
            Relation::PartialIncomplete,
            0.0,
            alignment,
        )
        .unwrap();

        match score(&result) {
            Err(EngineError::InvalidCorrespondence {
                query,
                target,
                reason,
            }) => {
                assert_eq!((query.as_str(), target.as_str()), ("A", "X"));
                assert!(reason.contains("4 vs 5"), "reason was {reason}");
            }
            other => panic!("expected InvalidCorrespondence, got {:?}", other),
        }
    }

    #[test]
    fn missing_aligned_points_are_invalid_correspondence() {
        let result = AlignmentResult::new(
            vec![Subunit::new("A", "q", "AAAAA", shape(0.0))],
            vec![Subunit::new("X", "t", "AAAAA", shape(0.0))],
            SubunitMap::from_pairs([(0, 0)]).unwrap(),
            Relation::Equivalent,
            0.0,
            StructuralAlignment::new(vec![BlockSet {
                transformations: vec![Isometry3::identity(), Isometry3::identity()],
                blocks: Vec::new(),
            }]),
        )
        .unwrap();
        assert!(matches!(
            score(&result),
            Err(EngineError::InvalidCorrespondence { .. })
        ));
    }

    #[test]
    fn missing_global_transform_is_invalid_correspondence() {
        let result = AlignmentResult::new(
            vec![Subunit::new("A", "q", "AAAAA", shape(0.0))],
            vec![Subunit::new("X", "t", "AAAAA", shape(0.0))],
            SubunitMap::from_pairs([(0, 0)]).unwrap(),
            Relation::Equivalent,
            0.0,
            StructuralAlignment::empty(),
        )
        .unwrap();
        assert!(matches!(
            score(&result),
            Err(EngineError::InvalidCorrespondence { reason, .. }) if reason.contains("transform")
        ));
    }
}
