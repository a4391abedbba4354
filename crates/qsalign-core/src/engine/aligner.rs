use super::cluster::{cluster_subunits, extract_subunits};
use super::config::QsAlignConfig;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::result::{AlignmentResult, Block, BlockSet, Relation, StructuralAlignment, SubunitMap};
use super::scoring::normalize_orientation_angle;
use crate::core::models::structure::Structure;
use crate::core::models::subunit::Subunit;
use crate::core::utils::geometry::{GeometryError, centroid, superpose, transform_points};
use crate::core::utils::quaternions::orientation_angle;
use itertools::Itertools;
use nalgebra::{Isometry3, Point3};
use rayon::prelude::*;
use std::cmp::Reverse;
use tracing::{debug, info, instrument};

/// RMSD differences below this are treated as ties between candidate alignments.
const RMSD_RESOLUTION: f64 = 1e-6;

/// Computes the subunit correspondence and global superposition of two assemblies.
pub trait QuaternaryAligner {
    fn align(
        &self,
        query: &Structure,
        target: &Structure,
        config: &QsAlignConfig,
    ) -> Result<AlignmentResult, EngineError>;
}

#[derive(Debug, Clone)]
struct Candidate {
    seed: usize,
    pairs: Vec<(usize, usize)>,
    transform: Isometry3<f64>,
    rmsd: f64,
}

impl Candidate {
    fn rank(&self) -> (Reverse<usize>, i64, usize) {
        (
            Reverse(self.pairs.len()),
            (self.rmsd / RMSD_RESOLUTION).round() as i64,
            self.seed,
        )
    }
}

/// Seed-and-extend quaternary aligner.
///
/// Every pair of subunits sharing a sequence cluster is tried as a seed: the
/// seed superposition places the remaining target subunits, which are then
/// paired greedily with the nearest compatible query subunit. The candidate
/// mapping the most subunits wins, ties going to the lower RMSD and then to
/// the earlier seed, so the outcome does not depend on thread scheduling.
#[derive(Default)]
pub struct QsAligner<'a> {
    reporter: Option<&'a ProgressReporter<'a>>,
}

impl<'a> QsAligner<'a> {
    pub fn new() -> Self {
        Self { reporter: None }
    }

    pub fn with_reporter(reporter: &'a ProgressReporter<'a>) -> Self {
        Self {
            reporter: Some(reporter),
        }
    }

    fn report(&self, event: Progress) {
        if let Some(reporter) = self.reporter {
            reporter.report(event);
        }
    }
}

fn residue_pairs(s1: &Subunit, s2: &Subunit) -> Vec<(usize, usize)> {
    (0..s1.len().min(s2.len())).map(|i| (i, i)).collect()
}

fn paired_points(
    subunits1: &[Subunit],
    subunits2: &[Subunit],
    pairs: &[(usize, usize)],
) -> (Vec<Point3<f64>>, Vec<Point3<f64>>) {
    let mut fixed = Vec::new();
    let mut moved = Vec::new();
    for &(q, t) in pairs {
        let (s1, s2) = (&subunits1[q], &subunits2[t]);
        let residues = residue_pairs(s1, s2);
        fixed.extend(s1.points_at(residues.iter().map(|&(r, _)| r)));
        moved.extend(s2.points_at(residues.iter().map(|&(_, r)| r)));
    }
    (fixed, moved)
}

fn to_alignment_failure(err: GeometryError) -> EngineError {
    EngineError::AlignmentFailure(err.to_string())
}

struct SeedContext<'s> {
    subunits1: &'s [Subunit],
    subunits2: &'s [Subunit],
    clusters1: &'s [usize],
    clusters2: &'s [usize],
    centroids1: Vec<Point3<f64>>,
    config: &'s QsAlignConfig,
}

impl SeedContext<'_> {
    fn extend(&self, seed: usize, q0: usize, t0: usize) -> Result<Option<Candidate>, EngineError> {
        let params = &self.config.align;
        let (fixed, moved) = paired_points(self.subunits1, self.subunits2, &[(q0, t0)]);
        let seed_fit = superpose(&fixed, &moved).map_err(to_alignment_failure)?;

        let mut pairs = vec![(q0, t0)];
        let mut used = vec![false; self.subunits2.len()];
        used[t0] = true;

        for q in (0..self.subunits1.len()).filter(|&q| q != q0) {
            let mut best: Option<(usize, f64)> = None;
            for t in 0..self.subunits2.len() {
                if used[t] || self.clusters1[q] != self.clusters2[t] {
                    continue;
                }
                let placed = transform_points(&seed_fit.transform, self.subunits2[t].points());
                let Some(placed_centroid) = centroid(&placed) else {
                    continue;
                };
                let distance = (placed_centroid - self.centroids1[q]).norm();
                if distance > params.distance_cutoff {
                    continue;
                }

                let n = self.subunits1[q].len().min(placed.len());
                let raw = orientation_angle(&self.subunits1[q].points()[..n], &placed[..n], false)
                    .map_err(to_alignment_failure)?;
                if normalize_orientation_angle(raw) > params.max_orientation_angle {
                    continue;
                }

                if best.is_none_or(|(_, d)| distance < d) {
                    best = Some((t, distance));
                }
            }
            if let Some((t, _)) = best {
                used[t] = true;
                pairs.push((q, t));
            }
        }

        let (fixed, moved) = paired_points(self.subunits1, self.subunits2, &pairs);
        let global_fit = superpose(&fixed, &moved).map_err(to_alignment_failure)?;
        if global_fit.rmsd > params.max_rmsd {
            debug!(
                "Seed {} rejected: RMSD {:.3} exceeds {:.3}",
                seed, global_fit.rmsd, params.max_rmsd
            );
            return Ok(None);
        }

        Ok(Some(Candidate {
            seed,
            pairs,
            transform: global_fit.transform,
            rmsd: global_fit.rmsd,
        }))
    }
}

impl QuaternaryAligner for QsAligner<'_> {
    #[instrument(skip_all, name = "quaternary_alignment")]
    fn align(
        &self,
        query: &Structure,
        target: &Structure,
        config: &QsAlignConfig,
    ) -> Result<AlignmentResult, EngineError> {
        config.validate()?;

        let subunits1 = extract_subunits(query, &config.cluster);
        let subunits2 = extract_subunits(target, &config.cluster);
        for (structure, subunits) in [(query, &subunits1), (target, &subunits2)] {
            if subunits.is_empty() {
                return Err(EngineError::AlignmentFailure(format!(
                    "'{}' has no subunit of at least {} residues",
                    structure.identifier(),
                    config.cluster.min_sequence_length
                )));
            }
        }

        let all: Vec<&Subunit> = subunits1.iter().chain(subunits2.iter()).collect();
        let clusters = cluster_subunits(&all, &config.cluster);
        let (clusters1, clusters2) = clusters.split_at(subunits1.len());

        let seeds: Vec<(usize, usize)> = (0..subunits1.len())
            .cartesian_product(0..subunits2.len())
            .filter(|&(q, t)| clusters1[q] == clusters2[t])
            .collect();
        info!(
            "Aligning {} query and {} target subunits over {} seed pair(s).",
            subunits1.len(),
            subunits2.len(),
            seeds.len()
        );

        let context = SeedContext {
            subunits1: &subunits1,
            subunits2: &subunits2,
            clusters1,
            clusters2,
            centroids1: subunits1
                .iter()
                .map(|s| centroid(s.points()).unwrap_or_else(Point3::origin))
                .collect(),
            config,
        };

        self.report(Progress::SeedsQueued {
            seeds: seeds.len() as u64,
        });
        let candidates = seeds
            .par_iter()
            .enumerate()
            .map(|(seed, &(q, t))| {
                let candidate = context.extend(seed, q, t);
                self.report(Progress::SeedEvaluated {
                    extended: matches!(candidate, Ok(Some(_))),
                });
                candidate
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.report(Progress::SeedsDone {
            candidates: candidates.iter().filter(|c| c.is_some()).count(),
        });

        let best = candidates
            .into_iter()
            .flatten()
            .min_by_key(|candidate| candidate.rank());

        let Some(best) = best else {
            info!("No subunit pair could be superposed within the thresholds.");
            return AlignmentResult::new(
                subunits1,
                subunits2,
                SubunitMap::new(),
                Relation::Different,
                0.0,
                StructuralAlignment::empty(),
            );
        };

        let subunit_map = SubunitMap::from_pairs(best.pairs.iter().copied())
            .map_err(|e| EngineError::AlignmentFailure(e.to_string()))?;
        let blocks = best
            .pairs
            .iter()
            .map(|&(q, t)| Block {
                query_subunit: q,
                target_subunit: t,
                aligned_residues: residue_pairs(&subunits1[q], &subunits2[t]),
            })
            .collect();
        let alignment = StructuralAlignment::new(vec![BlockSet {
            transformations: vec![Isometry3::identity(), best.transform],
            blocks,
        }]);
        let relation = Relation::classify(subunit_map.len(), subunits1.len(), subunits2.len());

        info!(
            "Best alignment from seed {}: {} pair(s), RMSD {:.3}, relation {}.",
            best.seed,
            subunit_map.len(),
            best.rmsd,
            relation
        );

        AlignmentResult::new(
            subunits1,
            subunits2,
            subunit_map,
            relation,
            best.rmsd,
            alignment,
        )
    }
}
