//! Input/output streams for molecule files
//!
//! Formats are inferred from the file extension. Readers are lazy: one
//! molecule is materialized at a time, in input order.

mod smiles;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;
use thiserror::Error;

use crate::atom::{Atom, Element};
use crate::molecule::Molecule;

pub use smiles::parse_smiles;

/// Errors that can occur during file I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Structure file formats recognized by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// MDL SDF/MOL (V2000)
    Sdf,
    /// SMILES lines, one molecule per line
    Smiles,
    /// PDB macromolecular format
    Pdb,
}

impl Format {
    /// Infer the format from a path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "sdf" | "sd" | "mol" => Ok(Format::Sdf),
            "smi" | "smiles" | "ism" => Ok(Format::Smiles),
            "pdb" | "ent" => Ok(Format::Pdb),
            _ => Err(IoError::UnsupportedFormat(
                path.as_ref().display().to_string(),
            )),
        }
    }
}

/// A lazy, sequential reader over the molecules in a file
pub struct MoleculeReader {
    lines: Lines<BufReader<File>>,
    format: Format,
    line_number: usize,
    done: bool,
}

impl MoleculeReader {
    /// Open a molecule file; the format is inferred from the extension
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let format = Format::from_path(&path)?;
        let file = File::open(path.as_ref())?;

        Ok(Self {
            lines: BufReader::new(file).lines(),
            format,
            line_number: 0,
            done: false,
        })
    }

    fn next_line(&mut self) -> Option<Result<String, std::io::Error>> {
        self.line_number += 1;
        self.lines.next()
    }

    fn next_sdf(&mut self) -> Option<Result<Molecule, IoError>> {
        // Collect one record, terminated by "$$$$" or EOF
        let mut block: Vec<String> = Vec::new();
        let start_line = self.line_number + 1;

        loop {
            match self.next_line() {
                Some(Ok(line)) => {
                    if line.trim_start().starts_with("$$$$") {
                        break;
                    }
                    block.push(line);
                }
                Some(Err(e)) => return Some(Err(e.into())),
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if block.iter().all(|l| l.trim().is_empty()) {
            return if self.done { None } else { self.next_sdf() };
        }

        Some(parse_sdf_block(&block, start_line))
    }

    fn next_smiles(&mut self) -> Option<Result<Molecule, IoError>> {
        loop {
            match self.next_line() {
                Some(Ok(line)) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }

                    let mut parts = trimmed.splitn(2, char::is_whitespace);
                    let smiles = parts.next().unwrap_or_default();
                    let title = parts.next().map(str::trim).unwrap_or(smiles);

                    return Some(parse_smiles(smiles, title).map_err(|message| IoError::Parse {
                        line: self.line_number,
                        message,
                    }));
                }
                Some(Err(e)) => return Some(Err(e.into())),
                None => return None,
            }
        }
    }

    fn next_pdb(&mut self) -> Option<Result<Molecule, IoError>> {
        // PDB input holds a single top-level structure
        if self.done {
            return None;
        }
        self.done = true;

        let mut molecule = Molecule::new("");

        loop {
            match self.next_line() {
                Some(Ok(line)) => {
                    if line.starts_with("ATOM") || line.starts_with("HETATM") {
                        match parse_pdb_atom(&line, self.line_number) {
                            Ok(atom) => {
                                molecule.add_atom(atom);
                            }
                            Err(e) => return Some(Err(e)),
                        }
                    } else if line.starts_with("TITLE") && molecule.title.is_empty() {
                        molecule.title = line[5..].trim().to_string();
                    } else if line.starts_with("ENDMDL") || line.starts_with("END ") {
                        break;
                    } else if line.trim() == "END" {
                        break;
                    }
                    // Other record types are ignored
                }
                Some(Err(e)) => return Some(Err(e.into())),
                None => break,
            }
        }

        if molecule.atoms.is_empty() {
            return Some(Err(IoError::InvalidFormat(
                "no ATOM/HETATM records found".to_string(),
            )));
        }

        // Small hetero-only structures get a bond graph inferred from
        // distances; large complexes don't need one for splitting.
        if molecule.atoms.len() <= 256 && molecule.atoms.iter().all(|a| a.hetero) {
            infer_bonds(&mut molecule);
        }

        Some(Ok(molecule))
    }
}

impl Iterator for MoleculeReader {
    type Item = Result<Molecule, IoError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.format {
            Format::Sdf => self.next_sdf(),
            Format::Smiles => self.next_smiles(),
            Format::Pdb => self.next_pdb(),
        }
    }
}

/// Read the single top-level molecule from a structure file
pub fn read_single_molecule<P: AsRef<Path>>(path: P) -> Result<Molecule, IoError> {
    let mut reader = MoleculeReader::open(&path)?;
    reader.next().unwrap_or_else(|| {
        Err(IoError::InvalidFormat(format!(
            "{} contains no molecules",
            path.as_ref().display()
        )))
    })
}

fn parse_sdf_block(block: &[String], start_line: usize) -> Result<Molecule, IoError> {
    if block.len() < 4 {
        return Err(IoError::Parse {
            line: start_line,
            message: "SDF record too short for header".to_string(),
        });
    }

    let mut molecule = Molecule::new(block[0].trim());

    // Counts line: natoms in columns 0..3, nbonds in 3..6
    let counts = &block[3];
    let (natoms, nbonds) = if counts.len() >= 6 {
        (
            counts[0..3].trim().parse::<usize>(),
            counts[3..6].trim().parse::<usize>(),
        )
    } else {
        let mut it = counts.split_whitespace();
        (
            it.next().unwrap_or("").parse::<usize>(),
            it.next().unwrap_or("").parse::<usize>(),
        )
    };

    let natoms = natoms.map_err(|_| IoError::Parse {
        line: start_line + 3,
        message: format!("invalid atom count: {}", counts),
    })?;
    let nbonds = nbonds.map_err(|_| IoError::Parse {
        line: start_line + 3,
        message: format!("invalid bond count: {}", counts),
    })?;

    let atom_start = 4;
    let bond_start = atom_start + natoms;
    if block.len() < bond_start + nbonds {
        return Err(IoError::Parse {
            line: start_line + 3,
            message: "SDF record shorter than declared atom/bond block".to_string(),
        });
    }

    for (i, line) in block[atom_start..bond_start].iter().enumerate() {
        let mut cols = line.split_whitespace();
        let err = |msg: &str| IoError::Parse {
            line: start_line + atom_start + i,
            message: msg.to_string(),
        };

        let x = cols
            .next()
            .and_then(|t| t.parse::<f64>().ok())
            .ok_or_else(|| err("invalid x coordinate"))?;
        let y = cols
            .next()
            .and_then(|t| t.parse::<f64>().ok())
            .ok_or_else(|| err("invalid y coordinate"))?;
        let z = cols
            .next()
            .and_then(|t| t.parse::<f64>().ok())
            .ok_or_else(|| err("invalid z coordinate"))?;
        let symbol = cols.next().ok_or_else(|| err("missing element symbol"))?;

        molecule.add_atom(Atom::bare(
            Element::from_symbol(symbol),
            nalgebra::Vector3::new(x, y, z),
            (i + 1) as u32,
        ));
    }

    for (i, line) in block[bond_start..bond_start + nbonds].iter().enumerate() {
        let (a, b, order) = if line.len() >= 9 {
            (
                line[0..3].trim().parse::<usize>(),
                line[3..6].trim().parse::<usize>(),
                line[6..9].trim().parse::<u8>(),
            )
        } else {
            let mut it = line.split_whitespace();
            (
                it.next().unwrap_or("").parse::<usize>(),
                it.next().unwrap_or("").parse::<usize>(),
                it.next().unwrap_or("1").parse::<u8>(),
            )
        };

        let (a, b) = match (a, b) {
            (Ok(a), Ok(b)) if a >= 1 && b >= 1 => (a - 1, b - 1),
            _ => {
                return Err(IoError::Parse {
                    line: start_line + bond_start + i,
                    message: format!("invalid bond record: {}", line),
                })
            }
        };

        molecule
            .add_bond(a, b, order.unwrap_or(1))
            .map_err(|e| IoError::Parse {
                line: start_line + bond_start + i,
                message: e.to_string(),
            })?;
    }

    // SD tags follow "M  END": "> <name>" header then value lines until blank
    let mut idx = bond_start + nbonds;
    while idx < block.len() && !block[idx].starts_with("M  END") {
        idx += 1;
    }
    idx += 1;

    while idx < block.len() {
        let line = block[idx].trim();
        if let Some(name) = extract_tag_name(line) {
            let mut value_lines = Vec::new();
            idx += 1;
            while idx < block.len() && !block[idx].trim().is_empty() {
                value_lines.push(block[idx].trim_end().to_string());
                idx += 1;
            }
            molecule.set_sd_tag(&name, &value_lines.join("\n"));
        }
        idx += 1;
    }

    Ok(molecule)
}

fn extract_tag_name(line: &str) -> Option<String> {
    if !line.starts_with('>') {
        return None;
    }
    let open = line.find('<')?;
    let close = line.rfind('>')?;
    if close <= open {
        return None;
    }
    Some(line[open + 1..close].to_string())
}

/// Parse an ATOM/HETATM record from a PDB file
fn parse_pdb_atom(line: &str, line_number: usize) -> Result<Atom, IoError> {
    if line.len() < 54 {
        return Err(IoError::Parse {
            line: line_number,
            message: format!("line too short for atom record: {}", line),
        });
    }

    let serial = line[6..11]
        .trim()
        .parse::<u32>()
        .map_err(|_| IoError::Parse {
            line: line_number,
            message: format!("invalid atom serial number: {}", &line[6..11]),
        })?;

    let name = line[12..16].trim().to_string();
    let residue_name = line[17..20].trim().to_string();
    let chain_id = line[21..22].chars().next().unwrap_or(' ');

    let residue_num = line[22..26]
        .trim()
        .parse::<u32>()
        .map_err(|_| IoError::Parse {
            line: line_number,
            message: format!("invalid residue number: {}", &line[22..26]),
        })?;

    let parse_coord = |range: std::ops::Range<usize>, label: &str| {
        line[range.clone()]
            .trim()
            .parse::<f64>()
            .map_err(|_| IoError::Parse {
                line: line_number,
                message: format!("invalid {} coordinate: {}", label, &line[range]),
            })
    };

    let x = parse_coord(30..38, "x")?;
    let y = parse_coord(38..46, "y")?;
    let z = parse_coord(46..54, "z")?;

    // Element column when present, otherwise derive from the atom name
    let element = if line.len() >= 78 && !line[76..78].trim().is_empty() {
        Element::from_symbol(line[76..78].trim())
    } else {
        element_from_atom_name(&name)
    };

    Ok(Atom {
        element,
        coordinates: nalgebra::Vector3::new(x, y, z),
        name,
        serial,
        residue_name,
        residue_num,
        chain_id,
        hetero: line.starts_with("HETATM"),
        charge: 0.0,
    })
}

fn element_from_atom_name(name: &str) -> Element {
    let alpha: String = name
        .chars()
        .skip_while(|c| c.is_ascii_digit())
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    match alpha.chars().next() {
        Some(first) => Element::from_symbol(&first.to_string()),
        None => Element::Unknown,
    }
}

/// Infer bonds from interatomic distances when the input carries no bond block
pub fn infer_bonds(molecule: &mut Molecule) {
    let n = molecule.atoms.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let a = &molecule.atoms[i];
            let b = &molecule.atoms[j];

            let threshold = 1.25 * a.element.bond_length(&b.element);
            if a.distance(b) < threshold {
                let _ = molecule.add_bond(i, j, 1);
            }
        }
    }
}

/// A sequential writer for docked molecules; the format is inferred from the
/// extension. Only SDF output is supported: poses carry SD tags.
pub struct MoleculeWriter {
    writer: BufWriter<File>,
}

impl MoleculeWriter {
    /// Create (or overwrite) the output file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        match Format::from_path(&path)? {
            Format::Sdf => {}
            _ => {
                return Err(IoError::UnsupportedFormat(format!(
                    "{}: docked output must be an SD file",
                    path.as_ref().display()
                )))
            }
        }

        let file = File::create(path.as_ref())?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append one molecule record to the output stream
    pub fn write_molecule(&mut self, molecule: &Molecule) -> Result<(), IoError> {
        let w = &mut self.writer;

        writeln!(w, "{}", molecule.title)?;
        writeln!(w, "  hybriddock")?;
        writeln!(w)?;
        writeln!(
            w,
            "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
            molecule.atoms.len(),
            molecule.bonds.len()
        )?;

        for atom in &molecule.atoms {
            writeln!(
                w,
                "{:>10.4}{:>10.4}{:>10.4} {:<3} 0  0  0  0  0  0  0  0  0  0  0  0",
                atom.coordinates.x,
                atom.coordinates.y,
                atom.coordinates.z,
                atom.element.symbol()
            )?;
        }

        for bond in &molecule.bonds {
            writeln!(
                w,
                "{:>3}{:>3}{:>3}  0",
                bond.atom1_idx + 1,
                bond.atom2_idx + 1,
                bond.order
            )?;
        }

        writeln!(w, "M  END")?;

        for (name, value) in &molecule.sd_tags {
            writeln!(w, "> <{}>", name)?;
            writeln!(w, "{}", value)?;
            writeln!(w)?;
        }

        writeln!(w, "$$$$")?;
        Ok(())
    }

    /// Flush the underlying stream
    pub fn flush(&mut self) -> Result<(), IoError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path("a/b/out.sdf").unwrap(), Format::Sdf);
        assert_eq!(Format::from_path("mols.SMI").unwrap(), Format::Smiles);
        assert_eq!(Format::from_path("complex.pdb").unwrap(), Format::Pdb);
        assert!(Format::from_path("weird.xyz").is_err());
    }

    #[test]
    fn test_smiles_reader_titles_and_laziness() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mols.smi");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "CCO ethanol").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "CC(=O)O acetic_acid").unwrap();
        writeln!(f, "CCC").unwrap();
        drop(f);

        let mols: Vec<_> = MoleculeReader::open(&path)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(mols.len(), 3);
        assert_eq!(mols[0].title, "ethanol");
        assert_eq!(mols[1].title, "acetic_acid");
        // Unnamed molecules fall back to the SMILES string
        assert_eq!(mols[2].title, "CCC");
        assert_eq!(mols[0].atoms.len(), 3);
        assert_eq!(mols[0].bonds.len(), 2);
    }

    #[test]
    fn test_sdf_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.sdf");

        let mut mol = parse_smiles("CCO", "ethanol").unwrap();
        mol.set_sd_tag("Hybrid2", "-3.25");

        let mut writer = MoleculeWriter::create(&path).unwrap();
        writer.write_molecule(&mol).unwrap();
        writer.write_molecule(&mol).unwrap();
        writer.flush().unwrap();
        drop(writer);

        let back: Vec<_> = MoleculeReader::open(&path)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(back.len(), 2);
        assert_eq!(back[0].title, "ethanol");
        assert_eq!(back[0].atoms.len(), 3);
        assert_eq!(back[0].bonds.len(), 2);
        assert_eq!(back[0].sd_tag("Hybrid2"), Some("-3.25"));
    }

    #[test]
    fn test_writer_rejects_unsupported_output() {
        let dir = tempdir().unwrap();
        assert!(MoleculeWriter::create(dir.path().join("out.pdb")).is_err());
    }

    #[test]
    fn test_pdb_reader_single_structure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mini.pdb");
        let mut f = File::create(&path).unwrap();
        writeln!(
            f,
            "ATOM      1  N   ALA A   1      11.104   6.134  -6.504  1.00  0.00           N"
        )
        .unwrap();
        writeln!(
            f,
            "ATOM      2  CA  ALA A   1      11.639   6.071  -5.147  1.00  0.00           C"
        )
        .unwrap();
        writeln!(f, "END").unwrap();
        drop(f);

        let mut reader = MoleculeReader::open(&path).unwrap();
        let mol = reader.next().unwrap().unwrap();
        assert!(reader.next().is_none());

        assert_eq!(mol.atoms.len(), 2);
        assert_eq!(mol.atoms[0].residue_name, "ALA");
        assert_eq!(mol.atoms[0].chain_id, 'A');
        assert_eq!(mol.atoms[0].element, Element::Nitrogen);
        assert!(!mol.atoms[0].hetero);
    }

    #[test]
    fn test_read_single_molecule_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.sdf");
        File::create(&path).unwrap();

        assert!(read_single_molecule(&path).is_err());
    }
}
