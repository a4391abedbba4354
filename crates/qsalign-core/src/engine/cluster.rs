use super::config::ClusterParams;
use crate::core::models::structure::Structure;
use crate::core::models::subunit::Subunit;
use tracing::debug;

/// Builds one subunit per chain long enough to take part in the alignment.
///
/// Chain order is preserved, so subunit indices follow the order in which
/// chains appear in the structure.
pub fn extract_subunits(structure: &Structure, params: &ClusterParams) -> Vec<Subunit> {
    structure
        .chains()
        .iter()
        .filter(|chain| {
            let keep = chain.len() >= params.min_sequence_length;
            if !keep {
                debug!(
                    "Skipping chain {} of '{}': {} residues < minimum {}",
                    chain.id,
                    structure.identifier(),
                    chain.len(),
                    params.min_sequence_length
                );
            }
            keep
        })
        .map(|chain| Subunit::from_chain(chain, structure.identifier()))
        .collect()
}

/// Ungapped identity: identical positions divided by the longer sequence length.
pub fn sequence_identity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    let identical = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    identical as f64 / longest as f64
}

/// Assigns each subunit a cluster id.
///
/// Subunits are visited in order; each joins the first existing cluster whose
/// representative (its first member) reaches the identity threshold, or opens
/// a new cluster. Cluster ids are dense and follow first appearance.
pub fn cluster_subunits(subunits: &[&Subunit], params: &ClusterParams) -> Vec<usize> {
    let mut representatives: Vec<&Subunit> = Vec::new();
    let mut assignments = Vec::with_capacity(subunits.len());

    for &subunit in subunits {
        let existing = representatives.iter().position(|rep| {
            sequence_identity(rep.sequence(), subunit.sequence())
                >= params.sequence_identity_threshold
        });
        let cluster = match existing {
            Some(id) => id,
            None => {
                representatives.push(subunit);
                representatives.len() - 1
            }
        };
        assignments.push(cluster);
    }

    debug!(
        "Clustered {} subunits into {} cluster(s)",
        subunits.len(),
        representatives.len()
    );
    assignments
}
