use super::error::EngineError;
use crate::core::models::subunit::Subunit;
use indexmap::IndexMap;
use nalgebra::{Isometry3, Point3};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Topological relation between two assemblies, judged by subunit coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Every subunit of both assemblies is mapped.
    Equivalent,
    /// Every subunit of one assembly is mapped, but not of the other.
    PartialComplete,
    /// Some, but not all, subunits of each assembly are mapped.
    PartialIncomplete,
    /// No subunit is mapped.
    Different,
}

impl Relation {
    pub fn classify(mapped: usize, query_subunits: usize, target_subunits: usize) -> Self {
        if mapped == 0 {
            Relation::Different
        } else if mapped == query_subunits && mapped == target_subunits {
            Relation::Equivalent
        } else if mapped == query_subunits || mapped == target_subunits {
            Relation::PartialComplete
        } else {
            Relation::PartialIncomplete
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown relation label '{0}'")]
pub struct ParseRelationError(pub String);

impl FromStr for Relation {
    type Err = ParseRelationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EQUIVALENT" => Ok(Relation::Equivalent),
            "PARTIAL_COMPLETE" => Ok(Relation::PartialComplete),
            "PARTIAL_INCOMPLETE" => Ok(Relation::PartialIncomplete),
            "DIFFERENT" => Ok(Relation::Different),
            _ => Err(ParseRelationError(s.to_string())),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Relation::Equivalent => "EQUIVALENT",
                Relation::PartialComplete => "PARTIAL_COMPLETE",
                Relation::PartialIncomplete => "PARTIAL_INCOMPLETE",
                Relation::Different => "DIFFERENT",
            }
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubunitMapError {
    #[error("Query subunit {0} is already mapped")]
    DuplicateQuery(usize),
    #[error("Target subunit {0} is already mapped")]
    DuplicateTarget(usize),
}

/// Ordered one-to-one correspondence from query subunit index to target subunit index.
///
/// Iteration follows insertion order, which is the order in which the aligner
/// discovered each pair and the column order of the report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubunitMap {
    entries: IndexMap<usize, usize>,
}

impl SubunitMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, query: usize, target: usize) -> Result<(), SubunitMapError> {
        if self.entries.contains_key(&query) {
            return Err(SubunitMapError::DuplicateQuery(query));
        }
        if self.entries.values().any(|&t| t == target) {
            return Err(SubunitMapError::DuplicateTarget(target));
        }
        self.entries.insert(query, target);
        Ok(())
    }

    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, SubunitMapError> {
        let mut map = Self::new();
        for (query, target) in pairs {
            map.insert(query, target)?;
        }
        Ok(map)
    }

    pub fn get(&self, query: usize) -> Option<usize> {
        self.entries.get(&query).copied()
    }

    pub fn contains_target(&self, target: usize) -> bool {
        self.entries.values().any(|&t| t == target)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().map(|(&q, &t)| (q, t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Residue-level alignment of one mapped subunit pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub query_subunit: usize,
    pub target_subunit: usize,
    pub aligned_residues: Vec<(usize, usize)>, // (query residue index, target residue index)
}

impl Block {
    pub fn len(&self) -> usize {
        self.aligned_residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned_residues.is_empty()
    }
}

/// A group of blocks sharing one set of superposition transforms.
///
/// `transformations[0]` is the identity (the query is the reference frame) and
/// `transformations[1]` brings the target onto the query.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSet {
    pub transformations: Vec<Isometry3<f64>>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuralAlignment {
    pub block_sets: Vec<BlockSet>,
}

impl StructuralAlignment {
    pub fn new(block_sets: Vec<BlockSet>) -> Self {
        Self { block_sets }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of aligned residue pairs across all blocks.
    pub fn length(&self) -> usize {
        self.blocks().map(Block::len).sum()
    }

    pub fn block_set(&self, index: usize) -> Option<&BlockSet> {
        self.block_sets.get(index)
    }

    /// The transform that superposes the target assembly onto the query assembly.
    pub fn global_transform(&self) -> Option<&Isometry3<f64>> {
        self.block_set(0)?.transformations.get(1)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.block_sets.iter().flat_map(|set| set.blocks.iter())
    }
}

/// Outcome of one quaternary alignment between a query and a target assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentResult {
    subunits1: Vec<Subunit>,
    subunits2: Vec<Subunit>,
    subunit_map: SubunitMap,
    relation: Relation,
    rmsd: f64,
    alignment: StructuralAlignment,
}

impl AlignmentResult {
    /// Assembles a result, checking that every index it carries is in range.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCorrespondence`] if a mapped or aligned
    /// subunit index, or an aligned residue index, does not exist, and
    /// [`EngineError::AlignmentFailure`] if the RMSD is negative or not finite.
    pub fn new(
        subunits1: Vec<Subunit>,
        subunits2: Vec<Subunit>,
        subunit_map: SubunitMap,
        relation: Relation,
        rmsd: f64,
        alignment: StructuralAlignment,
    ) -> Result<Self, EngineError> {
        if !(rmsd.is_finite() && rmsd >= 0.0) {
            return Err(EngineError::AlignmentFailure(format!(
                "RMSD must be a non-negative number, got {rmsd}"
            )));
        }

        let name_of = |subunits: &[Subunit], index: usize| {
            subunits
                .get(index)
                .map_or_else(|| format!("#{index}"), |s| s.name().to_string())
        };
        let invalid = |q: usize, t: usize, reason: String| EngineError::InvalidCorrespondence {
            query: name_of(&subunits1, q),
            target: name_of(&subunits2, t),
            reason,
        };

        for (q, t) in subunit_map.iter() {
            if q >= subunits1.len() {
                return Err(invalid(q, t, format!("query subunit index {q} does not exist")));
            }
            if t >= subunits2.len() {
                return Err(invalid(q, t, format!("target subunit index {t} does not exist")));
            }
        }

        for block in alignment.blocks() {
            let (q, t) = (block.query_subunit, block.target_subunit);
            let (Some(s1), Some(s2)) = (subunits1.get(q), subunits2.get(t)) else {
                return Err(invalid(q, t, "alignment block references a missing subunit".into()));
            };
            let out_of_range = block
                .aligned_residues
                .iter()
                .any(|&(r1, r2)| r1 >= s1.len() || r2 >= s2.len());
            if out_of_range {
                return Err(invalid(q, t, "aligned residue index out of range".into()));
            }
        }

        Ok(Self {
            subunits1,
            subunits2,
            subunit_map,
            relation,
            rmsd,
            alignment,
        })
    }

    pub fn subunits1(&self) -> &[Subunit] {
        &self.subunits1
    }

    pub fn subunits2(&self) -> &[Subunit] {
        &self.subunits2
    }

    pub fn subunit_map(&self) -> &SubunitMap {
        &self.subunit_map
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn rmsd(&self) -> f64 {
        self.rmsd
    }

    pub fn alignment(&self) -> &StructuralAlignment {
        &self.alignment
    }

    /// Number of subunit pairs in the correspondence.
    pub fn length(&self) -> usize {
        self.subunit_map.len()
    }

    /// Mapped query subunits, in correspondence order.
    pub fn aligned_subunits1(&self) -> Vec<&Subunit> {
        self.subunit_map
            .iter()
            .filter_map(|(q, _)| self.subunits1.get(q))
            .collect()
    }

    /// Mapped target subunits, in correspondence order.
    pub fn aligned_subunits2(&self) -> Vec<&Subunit> {
        self.subunit_map
            .iter()
            .filter_map(|(_, t)| self.subunits2.get(t))
            .collect()
    }

    /// Points of query subunit `index` that took part in the superposition.
    pub fn aligned_points_for_subunit1(&self, index: usize) -> Vec<Point3<f64>> {
        let Some(subunit) = self.subunits1.get(index) else {
            return Vec::new();
        };
        self.alignment
            .blocks()
            .find(|b| b.query_subunit == index)
            .map(|b| subunit.points_at(b.aligned_residues.iter().map(|&(r, _)| r)))
            .unwrap_or_default()
    }

    /// Points of target subunit `index` that took part in the superposition.
    pub fn aligned_points_for_subunit2(&self, index: usize) -> Vec<Point3<f64>> {
        let Some(subunit) = self.subunits2.get(index) else {
            return Vec::new();
        };
        self.alignment
            .blocks()
            .find(|b| b.target_subunit == index)
            .map(|b| subunit.points_at(b.aligned_residues.iter().map(|&(_, r)| r)))
            .unwrap_or_default()
    }
}
