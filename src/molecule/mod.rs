//! Molecule representation and related functionality

use crate::atom::Atom;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with molecules
#[derive(Error, Debug)]
pub enum MoleculeError {
    #[error("Invalid bond: atom index {0} or {1} not found")]
    InvalidBond(usize, usize),

    #[error("No atoms in molecule")]
    EmptyMolecule,
}

/// Represents a chemical bond between two atoms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bond {
    /// Index of the first atom
    pub atom1_idx: usize,

    /// Index of the second atom
    pub atom2_idx: usize,

    /// Bond order (1 = single, 2 = double, 3 = triple; aromatic stored as 1)
    pub order: u8,
}

/// Represents a molecule read from an input stream or produced by docking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Molecule {
    /// Title/identifier of the molecule, preserved from input to output
    pub title: String,

    /// List of atoms in the molecule
    pub atoms: Vec<Atom>,

    /// List of bonds between atoms
    pub bonds: Vec<Bond>,

    /// SD tags attached to the molecule, in insertion order
    pub sd_tags: Vec<(String, String)>,
}

impl Molecule {
    /// Create a new empty molecule
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            atoms: Vec::new(),
            bonds: Vec::new(),
            sd_tags: Vec::new(),
        }
    }

    /// Add an atom to the molecule, returning its index
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        idx
    }

    /// Add a bond between two atoms
    pub fn add_bond(
        &mut self,
        atom1_idx: usize,
        atom2_idx: usize,
        order: u8,
    ) -> Result<usize, MoleculeError> {
        if atom1_idx >= self.atoms.len() || atom2_idx >= self.atoms.len() {
            return Err(MoleculeError::InvalidBond(atom1_idx, atom2_idx));
        }

        let idx = self.bonds.len();
        self.bonds.push(Bond {
            atom1_idx,
            atom2_idx,
            order,
        });

        Ok(idx)
    }

    /// Get the geometric center of the molecule
    pub fn centroid(&self) -> Result<Vector3<f64>, MoleculeError> {
        if self.atoms.is_empty() {
            return Err(MoleculeError::EmptyMolecule);
        }

        let sum = self
            .atoms
            .iter()
            .fold(Vector3::zeros(), |acc, atom| acc + atom.coordinates);

        Ok(sum / self.atoms.len() as f64)
    }

    /// Get the bounding box of the molecule as (min corner, max corner)
    pub fn bounding_box(&self) -> Result<(Vector3<f64>, Vector3<f64>), MoleculeError> {
        if self.atoms.is_empty() {
            return Err(MoleculeError::EmptyMolecule);
        }

        let mut min = Vector3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Vector3::new(f64::MIN, f64::MIN, f64::MIN);

        for atom in &self.atoms {
            min.x = min.x.min(atom.coordinates.x);
            min.y = min.y.min(atom.coordinates.y);
            min.z = min.z.min(atom.coordinates.z);

            max.x = max.x.max(atom.coordinates.x);
            max.y = max.y.max(atom.coordinates.y);
            max.z = max.z.max(atom.coordinates.z);
        }

        Ok((min, max))
    }

    /// Translate every atom by the given vector
    pub fn translate(&mut self, translation: &Vector3<f64>) {
        for atom in &mut self.atoms {
            atom.coordinates += translation;
        }
    }

    /// Rotate the molecule around its centroid
    pub fn rotate_about_centroid(&mut self, rotation: &UnitQuaternion<f64>) {
        let center = match self.centroid() {
            Ok(c) => c,
            Err(_) => return, // No atoms in molecule
        };

        for atom in &mut self.atoms {
            let pos = atom.coordinates - center;
            atom.coordinates = rotation.transform_vector(&pos) + center;
        }
    }

    /// Set an SD tag, replacing an existing tag of the same name
    pub fn set_sd_tag(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.sd_tags.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_string();
        } else {
            self.sd_tags.push((name.to_string(), value.to_string()));
        }
    }

    /// Look up an SD tag by name
    pub fn sd_tag(&self, name: &str) -> Option<&str> {
        self.sd_tags
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Element;
    use nalgebra::{Unit, UnitQuaternion, Vector3};
    use std::f64::consts::PI;

    fn two_atom_molecule() -> Molecule {
        let mut mol = Molecule::new("test");
        mol.add_atom(Atom::bare(Element::Carbon, Vector3::new(0.0, 0.0, 0.0), 1));
        mol.add_atom(Atom::bare(Element::Oxygen, Vector3::new(2.0, 0.0, 0.0), 2));
        mol
    }

    #[test]
    fn test_centroid() {
        let mol = two_atom_molecule();
        let c = mol.centroid().unwrap();
        assert_eq!(c, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_centroid_empty() {
        let mol = Molecule::new("empty");
        assert!(mol.centroid().is_err());
    }

    #[test]
    fn test_bounding_box() {
        let mol = two_atom_molecule();
        let (min, max) = mol.bounding_box().unwrap();
        assert_eq!(min, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Vector3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_translate() {
        let mut mol = two_atom_molecule();
        mol.translate(&Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(mol.atoms[0].coordinates, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(mol.atoms[1].coordinates, Vector3::new(3.0, 2.0, 3.0));
    }

    #[test]
    fn test_rotate_preserves_centroid() {
        let mut mol = two_atom_molecule();
        let before = mol.centroid().unwrap();

        let axis = Unit::new_normalize(Vector3::new(0.0, 0.0, 1.0));
        let rot = UnitQuaternion::from_axis_angle(&axis, PI / 2.0);
        mol.rotate_about_centroid(&rot);

        let after = mol.centroid().unwrap();
        assert!((before - after).norm() < 1e-9);

        // Atoms rotated 90 degrees about z through the centroid
        assert!((mol.atoms[0].coordinates - Vector3::new(1.0, -1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_add_bond_invalid_index() {
        let mut mol = two_atom_molecule();
        assert!(mol.add_bond(0, 5, 1).is_err());
        assert!(mol.add_bond(0, 1, 1).is_ok());
    }

    #[test]
    fn test_sd_tags_replace_and_lookup() {
        let mut mol = two_atom_molecule();
        mol.set_sd_tag("Hybrid2", "-4.2");
        mol.set_sd_tag("Hybrid2", "-5.0");
        mol.set_sd_tag("method", "hybrid");

        assert_eq!(mol.sd_tag("Hybrid2"), Some("-5.0"));
        assert_eq!(mol.sd_tag("method"), Some("hybrid"));
        assert_eq!(mol.sd_tag("missing"), None);
        assert_eq!(mol.sd_tags.len(), 2);
    }
}
