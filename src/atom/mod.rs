//! Atom representation and element classification

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chemical elements relevant to protein-ligand docking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Hydrogen,   // H
    Carbon,     // C
    Nitrogen,   // N
    Oxygen,     // O
    Sulfur,     // S
    Phosphorus, // P
    Fluorine,   // F
    Chlorine,   // Cl
    Bromine,    // Br
    Iodine,     // I

    // Metals commonly found in binding sites
    Zinc,      // Zn
    Calcium,   // Ca
    Manganese, // Mn
    Magnesium, // Mg
    Iron,      // Fe
    Sodium,    // Na
    Potassium, // K

    // For atoms that don't match any of the above
    Unknown,
}

impl Element {
    /// Returns the van der Waals radius of the element in Angstroms
    pub fn radius(&self) -> f64 {
        match self {
            Element::Hydrogen => 1.1,
            Element::Carbon => 1.7,
            Element::Nitrogen => 1.55,
            Element::Oxygen => 1.52,
            Element::Sulfur => 1.8,
            Element::Phosphorus => 1.8,
            Element::Fluorine => 1.47,
            Element::Chlorine => 1.75,
            Element::Bromine => 1.85,
            Element::Iodine => 1.98,
            Element::Zinc => 1.39,
            Element::Calcium => 1.97,
            Element::Manganese => 1.61,
            Element::Magnesium => 1.73,
            Element::Iron => 1.56,
            Element::Sodium => 2.27,
            Element::Potassium => 2.75,
            Element::Unknown => 1.7, // Default radius
        }
    }

    /// Parse an element from a symbol as written in PDB, SDF or SMILES input.
    /// Lowercase aromatic SMILES symbols are accepted.
    pub fn from_symbol(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "H" => Element::Hydrogen,
            "C" => Element::Carbon,
            "N" => Element::Nitrogen,
            "O" => Element::Oxygen,
            "S" => Element::Sulfur,
            "P" => Element::Phosphorus,
            "F" => Element::Fluorine,
            "CL" => Element::Chlorine,
            "BR" => Element::Bromine,
            "I" => Element::Iodine,
            "ZN" => Element::Zinc,
            "CA" => Element::Calcium,
            "MN" => Element::Manganese,
            "MG" => Element::Magnesium,
            "FE" => Element::Iron,
            "NA" => Element::Sodium,
            "K" => Element::Potassium,
            _ => Element::Unknown,
        }
    }

    /// Symbol used when writing the element to structure files
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::Hydrogen => "H",
            Element::Carbon => "C",
            Element::Nitrogen => "N",
            Element::Oxygen => "O",
            Element::Sulfur => "S",
            Element::Phosphorus => "P",
            Element::Fluorine => "F",
            Element::Chlorine => "Cl",
            Element::Bromine => "Br",
            Element::Iodine => "I",
            Element::Zinc => "Zn",
            Element::Calcium => "Ca",
            Element::Manganese => "Mn",
            Element::Magnesium => "Mg",
            Element::Iron => "Fe",
            Element::Sodium => "Na",
            Element::Potassium => "K",
            Element::Unknown => "X",
        }
    }

    /// Typical single-bond length to another element, used for bond inference
    /// and for the deterministic SMILES embedding
    pub fn bond_length(&self, other: &Element) -> f64 {
        // Covalent-ish approximation derived from the vdW radii
        0.55 * (self.radius() + other.radius())
    }
}

/// Represents an atom in 3D space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atom {
    /// Element of the atom
    pub element: Element,

    /// 3D coordinates (in Angstroms)
    pub coordinates: Vector3<f64>,

    /// Atom name from the source record (e.g., "CA", "N1", "O")
    pub name: String,

    /// Atom serial number from the source record
    pub serial: u32,

    /// Residue name this atom belongs to
    pub residue_name: String,

    /// Residue number this atom belongs to
    pub residue_num: u32,

    /// Chain identifier
    pub chain_id: char,

    /// Whether the atom came from a HETATM record
    pub hetero: bool,

    /// Partial charge
    pub charge: f64,
}

impl Atom {
    /// Create a new atom with no residue context (e.g., from SDF or SMILES input)
    pub fn bare(element: Element, coordinates: Vector3<f64>, serial: u32) -> Self {
        Self {
            element,
            coordinates,
            name: element.symbol().to_string(),
            serial,
            residue_name: "LIG".to_string(),
            residue_num: 1,
            chain_id: ' ',
            hetero: true,
            charge: 0.0,
        }
    }

    /// Calculate distance to another atom
    pub fn distance(&self, other: &Atom) -> f64 {
        (self.coordinates - other.coordinates).norm()
    }

    /// Check if this atom can donate a hydrogen bond.
    /// Heavy-atom approximation: N and O are assumed protonated donors.
    pub fn is_h_bond_donor(&self) -> bool {
        matches!(self.element, Element::Nitrogen | Element::Oxygen)
    }

    /// Check if this atom can accept a hydrogen bond
    pub fn is_h_bond_acceptor(&self) -> bool {
        matches!(
            self.element,
            Element::Nitrogen | Element::Oxygen | Element::Fluorine
        )
    }

    /// Check if this atom contributes to hydrophobic contacts
    pub fn is_hydrophobic(&self) -> bool {
        matches!(
            self.element,
            Element::Carbon | Element::Chlorine | Element::Bromine | Element::Iodine
        )
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}, {}) [{}]",
            self.element.symbol(),
            self.coordinates.x,
            self.coordinates.y,
            self.coordinates.z,
            self.charge
        )
    }
}
