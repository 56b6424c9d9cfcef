//! Receptor preparation: complex splitting, receptor construction and
//! persistence in the native (JSON) receptor format

use log::warn;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

use crate::atom::Atom;
use crate::molecule::Molecule;

/// Residues treated as protein (standard amino acids plus common variants)
const AMINO_ACIDS: [&str; 30] = [
    "ALA", "ARG", "ASN", "ASP", "CYS", "GLN", "GLU", "GLY", "HIS", "ILE", "LEU", "LYS", "MET",
    "PHE", "PRO", "SER", "THR", "TRP", "TYR", "VAL", "MSE", "SEC", "PYL", "HID", "HIE", "HIP",
    "CYX", "ASH", "GLH", "LYN",
];

/// Residues treated as water
const WATERS: [&str; 6] = ["HOH", "WAT", "H2O", "DOD", "TIP", "SPC"];

/// Ions and crystallization additives: never the reference ligand
const ADDITIVES: [&str; 16] = [
    "NA", "CL", "K", "MG", "ZN", "CA", "MN", "FE", "SO4", "PO4", "GOL", "EDO", "PEG", "ACT",
    "DMS", "NO3",
];

/// Padding added around the reference ligand to form the binding site box
const SITE_PADDING: f64 = 4.0;

/// Protein atoms within this distance of any reference-ligand atom form the pocket
const POCKET_CUTOFF: f64 = 8.0;

/// Errors that can occur during receptor preparation
#[derive(Error, Debug)]
pub enum ReceptorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a prepared receptor: {0}")]
    InvalidReceptor(#[from] serde_json::Error),

    #[error("could not split complex into components: {0}")]
    SplitFailed(String),

    #[error("molecule error: {0}")]
    Molecule(#[from] crate::molecule::MoleculeError),
}

/// The binding site box, centered on the reference ligand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// Center of the site in Angstroms
    pub center: Vector3<f64>,

    /// Full edge lengths of the site box
    pub extent: Vector3<f64>,
}

impl Site {
    /// Check whether a point lies inside the site box
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        let half = self.extent * 0.5;
        (point.x - self.center.x).abs() <= half.x
            && (point.y - self.center.y).abs() <= half.y
            && (point.z - self.center.z).abs() <= half.z
    }
}

/// A prepared docking target: pocket geometry plus the reference site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receptor {
    /// Binding site definition
    pub site: Site,

    /// Protein atoms lining the site
    pub pocket: Vec<Atom>,

    /// Reference ligand atoms defining the site shape
    pub reference: Vec<Atom>,
}

/// The four disjoint components of a protein-ligand complex
#[derive(Debug)]
pub struct ComplexParts {
    pub ligand: Molecule,
    pub protein: Molecule,
    pub water: Molecule,
    pub other: Molecule,
}

/// Load a prepared receptor from the native JSON format.
/// Fails on anything that is not a receptor file; the orchestrator treats
/// that failure as the cue to fall back to complex splitting.
pub fn load_receptor<P: AsRef<Path>>(path: P) -> Result<Receptor, ReceptorError> {
    let file = File::open(path.as_ref())?;
    let receptor = serde_json::from_reader(BufReader::new(file))?;
    Ok(receptor)
}

/// Persist a prepared receptor so later runs can skip complex splitting
pub fn write_receptor<P: AsRef<Path>>(receptor: &Receptor, path: P) -> Result<(), ReceptorError> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer(BufWriter::new(file), receptor)?;
    Ok(())
}

/// Split a complex into {ligand, protein, water, other} by residue identity.
/// The largest unclassified hetero group becomes the ligand; everything else
/// hetero that isn't water lands in `other`.
pub fn split_complex(complex: &Molecule) -> Result<ComplexParts, ReceptorError> {
    let mut protein = Molecule::new(&format!("{} protein", complex.title));
    let mut water = Molecule::new(&format!("{} water", complex.title));
    let mut other = Molecule::new(&format!("{} other", complex.title));

    // Hetero groups keyed by (chain, residue number, residue name)
    let mut hetero_groups: HashMap<(char, u32, String), Vec<Atom>> = HashMap::new();

    for atom in &complex.atoms {
        let res = atom.residue_name.to_uppercase();

        if WATERS.contains(&res.as_str()) {
            water.add_atom(atom.clone());
        } else if AMINO_ACIDS.contains(&res.as_str()) || !atom.hetero {
            protein.add_atom(atom.clone());
        } else if ADDITIVES.contains(&res.as_str()) {
            other.add_atom(atom.clone());
        } else {
            hetero_groups
                .entry((atom.chain_id, atom.residue_num, res))
                .or_default()
                .push(atom.clone());
        }
    }

    // Largest hetero group wins; ties broken by key order for determinism
    let mut groups: Vec<_> = hetero_groups.into_iter().collect();
    groups.sort_by(|a, b| {
        b.1.len()
            .cmp(&a.1.len())
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut ligand = Molecule::new(&format!("{} ligand", complex.title));
    for (i, (_, atoms)) in groups.into_iter().enumerate() {
        let target = if i == 0 { &mut ligand } else { &mut other };
        for atom in atoms {
            target.add_atom(atom);
        }
    }

    if ligand.atoms.is_empty() {
        return Err(ReceptorError::SplitFailed(
            "no ligand component found".to_string(),
        ));
    }
    if protein.atoms.is_empty() {
        return Err(ReceptorError::SplitFailed(
            "no protein component found".to_string(),
        ));
    }

    Ok(ComplexParts {
        ligand,
        protein,
        water,
        other,
    })
}

/// Construct a receptor from a protein using a bound ligand as the
/// binding-site reference
pub fn make_receptor(protein: &Molecule, ligand: &Molecule) -> Result<Receptor, ReceptorError> {
    let center = ligand.centroid()?;
    let (min, max) = ligand.bounding_box()?;
    let extent = (max - min) + Vector3::repeat(2.0 * SITE_PADDING);

    let pocket: Vec<Atom> = protein
        .atoms
        .iter()
        .filter(|p| {
            ligand
                .atoms
                .iter()
                .any(|l| (p.coordinates - l.coordinates).norm() <= POCKET_CUTOFF)
        })
        .cloned()
        .collect();

    if pocket.is_empty() {
        warn!("no protein atoms within {} A of the reference ligand", POCKET_CUTOFF);
    }

    Ok(Receptor {
        site: Site { center, extent },
        pocket,
        reference: ligand.atoms.clone(),
    })
}
