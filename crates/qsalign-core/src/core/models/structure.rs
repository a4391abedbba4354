use nalgebra::Point3;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolymerType {
    Protein,
    NucleicAcid,
}

impl fmt::Display for PolymerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PolymerType::Protein => "Protein",
                PolymerType::NucleicAcid => "NucleicAcid",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub number: isize,                  // Residue sequence number from source file
    pub insertion_code: Option<char>,   // PDB insertion code, if any
    pub name: String,                   // Three-letter residue name (e.g., "ALA")
    pub code: char,                     // One-letter code, 'X' when unknown
    pub polymer_type: PolymerType,      // Kind of polymer this residue belongs to
    pub representative: Point3<f64>,    // CA for amino acids, P for nucleotides
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub id: String,
    pub(crate) residues: Vec<Residue>,
}

impl Chain {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            residues: Vec::new(),
        }
    }

    pub fn push_residue(&mut self, residue: Residue) {
        self.residues.push(residue);
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn sequence(&self) -> String {
        self.residues.iter().map(|r| r.code).collect()
    }

    pub fn representative_points(&self) -> Vec<Point3<f64>> {
        self.residues.iter().map(|r| r.representative).collect()
    }
}

/// An identifiable, ordered collection of chains.
///
/// The identifier is the string the structure was resolved from; it is echoed
/// verbatim into reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    identifier: String,
    chains: Vec<Chain>,
}

impl Structure {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            chains: Vec::new(),
        }
    }

    pub fn with_chains(identifier: &str, chains: Vec<Chain>) -> Self {
        Self {
            identifier: identifier.to_string(),
            chains,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn set_identifier(&mut self, identifier: &str) {
        self.identifier = identifier.to_string();
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn chain(&self, id: &str) -> Option<&Chain> {
        self.chains.iter().find(|c| c.id == id)
    }

    /// Returns the chain with the given id, appending a new empty one if absent.
    pub fn chain_mut_or_insert(&mut self, id: &str) -> &mut Chain {
        let index = match self.chains.iter().position(|c| c.id == id) {
            Some(index) => index,
            None => {
                self.chains.push(Chain::new(id));
                self.chains.len() - 1
            }
        };
        &mut self.chains[index]
    }

    pub fn residue_count(&self) -> usize {
        self.chains.iter().map(Chain::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residue(number: isize, code: char) -> Residue {
        Residue {
            number,
            insertion_code: None,
            name: "ALA".to_string(),
            code,
            polymer_type: PolymerType::Protein,
            representative: Point3::new(number as f64, 0.0, 0.0),
        }
    }

    #[test]
    fn chain_reports_sequence_and_points_in_order() {
        let mut chain = Chain::new("A");
        chain.push_residue(residue(1, 'A'));
        chain.push_residue(residue(2, 'G'));

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.sequence(), "AG");
        assert_eq!(
            chain.representative_points(),
            vec![Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)]
        );
    }

    #[test]
    fn chain_mut_or_insert_preserves_first_seen_order() {
        let mut structure = Structure::new("1abc");
        structure.chain_mut_or_insert("B").push_residue(residue(1, 'A'));
        structure.chain_mut_or_insert("A").push_residue(residue(1, 'A'));
        structure.chain_mut_or_insert("B").push_residue(residue(2, 'A'));

        let ids: Vec<&str> = structure.chains().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(structure.chain("B").unwrap().len(), 2);
        assert_eq!(structure.residue_count(), 3);
    }

    #[test]
    fn chain_lookup_returns_none_for_unknown_id() {
        let structure = Structure::with_chains("1abc", vec![Chain::new("A")]);
        assert!(structure.chain("Z").is_none());
        assert_eq!(structure.identifier(), "1abc");
    }
}
