//! Minimal SMILES reader with a deterministic 3D embedding
//!
//! Covers the organic subset (including aromatic lowercase symbols),
//! branches, ring closures and bracket atoms. Stereo markers, isotopes and
//! charges are accepted and ignored. The embedding is a deterministic
//! chain layout, not a conformer search; the docking engine searches
//! orientations, not internal geometry.

use nalgebra::Vector3;
use std::collections::HashMap;

use crate::atom::{Atom, Element};
use crate::molecule::Molecule;

/// Parse one SMILES string into a molecule with embedded 3D coordinates
pub fn parse_smiles(smiles: &str, title: &str) -> Result<Molecule, String> {
    let mut molecule = Molecule::new(title);

    let chars: Vec<char> = smiles.chars().collect();
    let mut i = 0;

    let mut prev_atom: Option<usize> = None;
    let mut branch_stack: Vec<Option<usize>> = Vec::new();
    let mut ring_openings: HashMap<u32, (usize, u8)> = HashMap::new();
    let mut next_bond_order: u8 = 1;

    while i < chars.len() {
        let c = chars[i];

        match c {
            '-' | '/' | '\\' => {
                next_bond_order = 1;
                i += 1;
            }
            '=' => {
                next_bond_order = 2;
                i += 1;
            }
            '#' => {
                next_bond_order = 3;
                i += 1;
            }
            ':' => {
                // Aromatic bond, stored as single
                next_bond_order = 1;
                i += 1;
            }
            '(' => {
                branch_stack.push(prev_atom);
                i += 1;
            }
            ')' => {
                prev_atom = branch_stack
                    .pop()
                    .ok_or_else(|| format!("unbalanced ')' in SMILES: {}", smiles))?;
                i += 1;
            }
            '.' => {
                // Fragment separator: next atom starts unbonded
                prev_atom = None;
                i += 1;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|&c| c == ']')
                    .map(|p| i + p)
                    .ok_or_else(|| format!("unterminated bracket atom in SMILES: {}", smiles))?;

                let element = bracket_element(&chars[i + 1..close])
                    .ok_or_else(|| format!("unreadable bracket atom in SMILES: {}", smiles))?;

                let idx = push_atom(&mut molecule, element);
                bond_to_previous(&mut molecule, prev_atom, idx, next_bond_order);
                prev_atom = Some(idx);
                next_bond_order = 1;
                i = close + 1;
            }
            '0'..='9' | '%' => {
                let (ring_num, consumed) = read_ring_number(&chars[i..])
                    .ok_or_else(|| format!("invalid ring closure in SMILES: {}", smiles))?;

                let current = prev_atom
                    .ok_or_else(|| format!("ring closure before any atom in SMILES: {}", smiles))?;

                if let Some((open_idx, order)) = ring_openings.remove(&ring_num) {
                    let order = order.max(next_bond_order);
                    molecule
                        .add_bond(open_idx, current, order)
                        .map_err(|e| e.to_string())?;
                } else {
                    ring_openings.insert(ring_num, (current, next_bond_order));
                }
                next_bond_order = 1;
                i += consumed;
            }
            _ if c.is_ascii_alphabetic() => {
                let (element, consumed) = organic_element(&chars[i..])
                    .ok_or_else(|| format!("unrecognized atom symbol '{}' in SMILES: {}", c, smiles))?;

                let idx = push_atom(&mut molecule, element);
                bond_to_previous(&mut molecule, prev_atom, idx, next_bond_order);
                prev_atom = Some(idx);
                next_bond_order = 1;
                i += consumed;
            }
            _ => {
                return Err(format!(
                    "unexpected character '{}' in SMILES: {}",
                    c, smiles
                ));
            }
        }
    }

    if !branch_stack.is_empty() {
        return Err(format!("unbalanced '(' in SMILES: {}", smiles));
    }
    if !ring_openings.is_empty() {
        return Err(format!("unclosed ring bond in SMILES: {}", smiles));
    }
    if molecule.atoms.is_empty() {
        return Err(format!("SMILES contains no atoms: {}", smiles));
    }

    embed(&mut molecule);
    Ok(molecule)
}

fn push_atom(molecule: &mut Molecule, element: Element) -> usize {
    let serial = (molecule.atoms.len() + 1) as u32;
    molecule.add_atom(Atom::bare(element, Vector3::zeros(), serial))
}

fn bond_to_previous(molecule: &mut Molecule, prev: Option<usize>, current: usize, order: u8) {
    if let Some(p) = prev {
        // Both indices come from push_atom, so this cannot fail
        let _ = molecule.add_bond(p, current, order);
    }
}

/// Organic-subset symbol at the head of the slice: Cl/Br, or one of
/// B C N O P S F I (upper- or lowercase aromatic). Returns chars consumed.
fn organic_element(chars: &[char]) -> Option<(Element, usize)> {
    if chars.len() >= 2 {
        let two: String = chars[0..2].iter().collect();
        if two == "Cl" || two == "Br" {
            return Some((Element::from_symbol(&two), 2));
        }
    }

    match chars[0] {
        'C' | 'c' => Some((Element::Carbon, 1)),
        'N' | 'n' => Some((Element::Nitrogen, 1)),
        'O' | 'o' => Some((Element::Oxygen, 1)),
        'S' | 's' => Some((Element::Sulfur, 1)),
        'P' | 'p' => Some((Element::Phosphorus, 1)),
        'F' => Some((Element::Fluorine, 1)),
        'I' => Some((Element::Iodine, 1)),
        'B' => Some((Element::Unknown, 1)), // bare boron: carried as Unknown
        _ => None,
    }
}

/// Element inside a bracket atom, e.g. [NH3+], [C@@H], [nH], [Fe]
fn bracket_element(inner: &[char]) -> Option<Element> {
    // Skip isotope digits
    let start = inner.iter().position(|c| !c.is_ascii_digit())?;
    let rest = &inner[start..];

    if rest.is_empty() || !rest[0].is_ascii_alphabetic() {
        return None;
    }

    if rest.len() >= 2 && rest[0].is_ascii_uppercase() && rest[1].is_ascii_lowercase() {
        let two: String = rest[0..2].iter().collect();
        let element = Element::from_symbol(&two);
        if element != Element::Unknown {
            return Some(element);
        }
    }

    Some(Element::from_symbol(&rest[0].to_string()))
}

/// Ring-closure label: a single digit, or %nn. Returns (label, chars consumed).
fn read_ring_number(chars: &[char]) -> Option<(u32, usize)> {
    if chars[0] == '%' {
        if chars.len() >= 3 && chars[1].is_ascii_digit() && chars[2].is_ascii_digit() {
            let n = chars[1].to_digit(10)? * 10 + chars[2].to_digit(10)?;
            return Some((n, 3));
        }
        return None;
    }
    chars[0].to_digit(10).map(|n| (n, 1))
}

// Candidate growth directions, tried in order for each newly placed atom
const DIRECTIONS: [[f64; 3]; 10] = [
    [1.0, 0.0, 0.0],
    [0.5, 0.866, 0.0],
    [0.5, -0.866, 0.0],
    [0.0, 0.5, 0.866],
    [0.0, 0.5, -0.866],
    [-0.5, 0.866, 0.0],
    [-0.5, -0.866, 0.0],
    [0.0, -0.5, 0.866],
    [0.0, -0.5, -0.866],
    [-1.0, 0.0, 0.0],
];

const MIN_SEPARATION: f64 = 1.0;

/// Deterministic chain embedding: breadth-first over the bond graph, each
/// atom placed one bond length from its parent in the first direction that
/// keeps it clear of already-placed atoms.
fn embed(molecule: &mut Molecule) {
    let n = molecule.atoms.len();
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
    for bond in &molecule.bonds {
        neighbors[bond.atom1_idx].push(bond.atom2_idx);
        neighbors[bond.atom2_idx].push(bond.atom1_idx);
    }

    let mut placed = vec![false; n];
    let mut queue = std::collections::VecDeque::new();
    let mut fragment = 0u32;

    for root in 0..n {
        if placed[root] {
            continue;
        }

        // Disconnected fragments start on a shifted origin
        let offset = 10.0 * fragment as f64;
        fragment += 1;
        molecule.atoms[root].coordinates = Vector3::new(offset, 0.0, 0.0);
        placed[root] = true;
        queue.push_back(root);

        while let Some(parent) = queue.pop_front() {
            let parent_pos = molecule.atoms[parent].coordinates;

            for &child in &neighbors[parent] {
                if placed[child] {
                    continue;
                }

                let length = molecule.atoms[parent]
                    .element
                    .bond_length(&molecule.atoms[child].element);

                let mut position = parent_pos + Vector3::new(length, 0.0, 0.0);
                'search: for scale in 1..=3 {
                    for dir in &DIRECTIONS {
                        let d = Vector3::new(dir[0], dir[1], dir[2]);
                        let candidate = parent_pos + d * (length * scale as f64);

                        let clear = molecule
                            .atoms
                            .iter()
                            .enumerate()
                            .filter(|(k, _)| placed[*k])
                            .all(|(_, a)| (a.coordinates - candidate).norm() >= MIN_SEPARATION);

                        if clear {
                            position = candidate;
                            break 'search;
                        }
                    }
                }

                molecule.atoms[child].coordinates = position;
                placed[child] = true;
                queue.push_back(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_chain() {
        let mol = parse_smiles("CCO", "ethanol").unwrap();
        assert_eq!(mol.atoms.len(), 3);
        assert_eq!(mol.bonds.len(), 2);
        assert_eq!(mol.atoms[2].element, Element::Oxygen);
        assert_eq!(mol.title, "ethanol");
    }

    #[test]
    fn test_branch_and_double_bond() {
        let mol = parse_smiles("CC(=O)O", "acetic acid").unwrap();
        assert_eq!(mol.atoms.len(), 4);
        assert_eq!(mol.bonds.len(), 3);
        assert!(mol.bonds.iter().any(|b| b.order == 2));
    }

    #[test]
    fn test_aromatic_ring() {
        let mol = parse_smiles("c1ccccc1", "benzene").unwrap();
        assert_eq!(mol.atoms.len(), 6);
        // Ring closure adds the sixth bond
        assert_eq!(mol.bonds.len(), 6);
        assert!(mol.atoms.iter().all(|a| a.element == Element::Carbon));
    }

    #[test]
    fn test_bracket_atoms() {
        let mol = parse_smiles("C[NH3+]", "methylammonium").unwrap();
        assert_eq!(mol.atoms.len(), 2);
        assert_eq!(mol.atoms[1].element, Element::Nitrogen);

        let mol = parse_smiles("[Fe]", "iron").unwrap();
        assert_eq!(mol.atoms[0].element, Element::Iron);
    }

    #[test]
    fn test_two_letter_halogen() {
        let mol = parse_smiles("ClCBr", "halide").unwrap();
        assert_eq!(mol.atoms.len(), 3);
        assert_eq!(mol.atoms[0].element, Element::Chlorine);
        assert_eq!(mol.atoms[2].element, Element::Bromine);
    }

    #[test]
    fn test_malformed_smiles() {
        assert!(parse_smiles("C(C", "bad").is_err());
        assert!(parse_smiles("C1CC", "unclosed ring").is_err());
        assert!(parse_smiles("", "empty").is_err());
        assert!(parse_smiles("C[N", "bracket").is_err());
    }

    #[test]
    fn test_embedding_is_deterministic_and_separated() {
        let a = parse_smiles("CC(=O)Oc1ccccc1C(=O)O", "aspirin").unwrap();
        let b = parse_smiles("CC(=O)Oc1ccccc1C(=O)O", "aspirin").unwrap();

        for (x, y) in a.atoms.iter().zip(&b.atoms) {
            assert_eq!(x.coordinates, y.coordinates);
        }

        for i in 0..a.atoms.len() {
            for j in (i + 1)..a.atoms.len() {
                assert!(a.atoms[i].distance(&a.atoms[j]) >= 0.9);
            }
        }
    }
}
