use phf::{Map, Set, phf_map, phf_set};

pub static AMINO_ACID_CODES: Map<&'static str, char> = phf_map! {
    // --- Standard ---
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',

    // --- Protonation variants ---
    "HSE" => 'H', "HSD" => 'H', "HSP" => 'H', "HID" => 'H', "HIE" => 'H', "HIP" => 'H',
    "ASH" => 'D', "GLH" => 'E', "LYN" => 'K', "CYX" => 'C',

    // --- Common modified residues ---
    "MSE" => 'M', "SEC" => 'U', "PYL" => 'O',
};

pub static NUCLEOTIDE_CODES: Map<&'static str, char> = phf_map! {
    "A" => 'A', "C" => 'C', "G" => 'G', "U" => 'U', "I" => 'I',
    "DA" => 'A', "DC" => 'C', "DG" => 'G', "DT" => 'T', "DU" => 'U', "DI" => 'I',
};

/// Residue names accepted from `HETATM` records.
pub static POLYMER_HETERO_RESIDUES: Set<&'static str> = phf_set! {
    "MSE", "SEC", "PYL",
};
