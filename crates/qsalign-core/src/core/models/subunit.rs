use super::structure::Chain;
use nalgebra::Point3;

/// A named rigid unit of an assembly, reduced to its representative atom positions.
///
/// Identity is the pair (`structure`, `name`). Subunits are built once by the
/// clusterer and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Subunit {
    name: String,
    structure: String,
    sequence: String,
    points: Vec<Point3<f64>>,
}

impl Subunit {
    pub fn new(name: &str, structure: &str, sequence: &str, points: Vec<Point3<f64>>) -> Self {
        Self {
            name: name.to_string(),
            structure: structure.to_string(),
            sequence: sequence.to_string(),
            points,
        }
    }

    pub fn from_chain(chain: &Chain, structure: &str) -> Self {
        Self::new(
            &chain.id,
            structure,
            &chain.sequence(),
            chain.representative_points(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn structure(&self) -> &str {
        &self.structure
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Collects the points at the given residue positions, skipping indices out of range.
    pub fn points_at(&self, positions: impl IntoIterator<Item = usize>) -> Vec<Point3<f64>> {
        positions
            .into_iter()
            .filter_map(|i| self.points.get(i).copied())
            .collect()
    }
}
