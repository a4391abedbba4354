use super::codes::{AMINO_ACID_CODES, NUCLEOTIDE_CODES, POLYMER_HETERO_RESIDUES};
use super::traits::StructureFile;
use crate::core::models::structure::{PolymerType, Residue, Structure};
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("No representative atoms (CA or P) found in structure '{0}'")]
    Empty(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_coordinate(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn classify(residue_name: &str, atom_name: &str) -> Option<(PolymerType, char)> {
    match atom_name {
        "CA" => Some((
            PolymerType::Protein,
            AMINO_ACID_CODES.get(residue_name).copied().unwrap_or('X'),
        )),
        "P" => NUCLEOTIDE_CODES
            .get(residue_name)
            .map(|&code| (PolymerType::NucleicAcid, code)),
        _ => None,
    }
}

/// Reader for the coordinate section of PDB files.
///
/// Only the first model is read, and each residue is reduced to its
/// representative atom: `CA` for amino acids and `P` for nucleotides. When an
/// atom carries alternate locations the first one encountered wins.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead, identifier: &str) -> Result<Structure, Self::Error> {
        let mut structure = Structure::new(identifier);

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "ENDMDL" => break,
                "ATOM" | "HETATM" => {}
                _ => continue,
            }

            if line.len() < 54 {
                return Err(PdbError::Parse {
                    line: line_num,
                    kind: PdbParseErrorKind::LineTooShort,
                });
            }

            let atom_name = slice_and_trim(&line, 12, 16);
            let res_name = slice_and_trim(&line, 17, 20);
            if record_type == "HETATM" && !POLYMER_HETERO_RESIDUES.contains(res_name) {
                continue;
            }
            let Some((polymer_type, code)) = classify(res_name, atom_name) else {
                continue;
            };

            let chain_id = match slice_and_trim(&line, 21, 22) {
                "" => "A",
                id => id,
            };
            let res_seq_str = slice_and_trim(&line, 22, 26);
            let number: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "23-26".into(),
                    value: res_seq_str.into(),
                },
            })?;
            let insertion_code = slice_and_trim(&line, 26, 27).chars().next();

            let chain = structure.chain_mut_or_insert(chain_id);
            let already_seen = chain
                .residues()
                .last()
                .is_some_and(|r| r.number == number && r.insertion_code == insertion_code);
            if already_seen {
                continue;
            }

            let x = parse_coordinate(&line, line_num, 30, 38)?;
            let y = parse_coordinate(&line, line_num, 38, 46)?;
            let z = parse_coordinate(&line, line_num, 46, 54)?;

            chain.push_residue(Residue {
                number,
                insertion_code,
                name: res_name.to_string(),
                code,
                polymer_type,
                representative: Point3::new(x, y, z),
            });
        }

        if structure.residue_count() == 0 {
            return Err(PdbError::Empty(identifier.to_string()));
        }
        Ok(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn atom(serial: usize, name: &str, res: &str, chain: char, seq: isize, xyz: [f64; 3]) -> String {
        format!(
            "ATOM  {:>5} {:<4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00 20.00           C",
            serial, name, res, chain, seq, xyz[0], xyz[1], xyz[2]
        )
    }

    fn read(content: &str) -> Result<Structure, PdbError> {
        let mut reader = Cursor::new(content.as_bytes());
        PdbFile::read_from(&mut reader, "test")
    }

    #[test]
    fn reads_ca_atoms_grouped_by_chain() {
        let content = [
            atom(1, " N", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            atom(2, " CA", "ALA", 'A', 1, [1.0, 2.0, 3.0]),
            atom(3, " CA", "GLY", 'A', 2, [4.0, 5.0, 6.0]),
            atom(4, " CA", "LYS", 'B', 1, [7.0, 8.0, 9.0]),
        ]
        .join("\n");

        let structure = read(&content).unwrap();
        assert_eq!(structure.identifier(), "test");
        assert_eq!(structure.chains().len(), 2);
        let chain_a = structure.chain("A").unwrap();
        assert_eq!(chain_a.sequence(), "AG");
        assert_eq!(
            chain_a.residues()[0].representative,
            Point3::new(1.0, 2.0, 3.0)
        );
        assert_eq!(structure.chain("B").unwrap().sequence(), "K");
    }

    #[test]
    fn stops_after_first_model_and_skips_alternate_locations() {
        let mut alt = atom(3, " CA", "SER", 'A', 2, [9.0, 9.0, 9.0]);
        alt.replace_range(16..17, "B");
        let content = [
            "MODEL        1".to_string(),
            atom(1, " CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            atom(2, " CA", "SER", 'A', 2, [1.0, 1.0, 1.0]),
            alt,
            "ENDMDL".to_string(),
            "MODEL        2".to_string(),
            atom(4, " CA", "TRP", 'A', 3, [2.0, 2.0, 2.0]),
        ]
        .join("\n");

        let structure = read(&content).unwrap();
        let chain = structure.chain("A").unwrap();
        assert_eq!(chain.sequence(), "AS");
        assert_eq!(chain.residues()[1].representative, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn keeps_selenomethionine_but_ignores_other_hetero_groups() {
        let mse = atom(1, " CA", "MSE", 'A', 1, [0.0, 0.0, 0.0]).replacen("ATOM  ", "HETATM", 1);
        let calcium = atom(2, "CA", " CA", 'A', 500, [5.0, 5.0, 5.0]).replacen("ATOM  ", "HETATM", 1);
        let content = [mse, calcium].join("\n");

        let structure = read(&content).unwrap();
        assert_eq!(structure.chain("A").unwrap().sequence(), "M");
    }

    #[test]
    fn reads_phosphorus_of_nucleotides() {
        let content = [
            atom(1, " P", "DA", 'C', 1, [0.0, 0.0, 0.0]),
            atom(2, " C1'", "DA", 'C', 1, [1.0, 0.0, 0.0]),
            atom(3, " P", "DT", 'C', 2, [2.0, 0.0, 0.0]),
        ]
        .join("\n");

        let structure = read(&content).unwrap();
        let chain = structure.chain("C").unwrap();
        assert_eq!(chain.sequence(), "AT");
        assert_eq!(chain.residues()[0].polymer_type, PolymerType::NucleicAcid);
    }

    #[test]
    fn invalid_coordinate_reports_line_number() {
        let mut bad = atom(1, " CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]);
        bad.replace_range(30..38, "   abcde");
        let content = format!("HEADER    TEST\n{}", bad);

        match read(&content) {
            Err(PdbError::Parse {
                line: 2,
                kind: PdbParseErrorKind::InvalidFloat { columns, .. },
            }) => assert_eq!(columns, "31-38"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn file_without_representative_atoms_is_empty_error() {
        let content = atom(1, " N", "ALA", 'A', 1, [0.0, 0.0, 0.0]);
        assert!(matches!(read(&content), Err(PdbError::Empty(id)) if id == "test"));
    }
}
