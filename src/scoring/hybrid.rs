//! Hybrid scoring: shape overlap with a reference ligand combined with
//! chemistry terms against the pocket

use crate::molecule::Molecule;
use crate::receptor::Receptor;
use crate::scoring::{ScoreComponents, ScoringFunction};

/// Parameters for the hybrid scoring function
#[derive(Debug, Clone)]
pub struct HybridParams {
    // Weights for each component of the scoring function
    pub weight_shape: f64,
    pub weight_hbond: f64,
    pub weight_hydrophobic: f64,
    pub weight_clash: f64,

    /// Width of the Gaussian used for shape overlap
    pub shape_sigma: f64,

    /// Hydrogen bond distance cutoff and optimum
    pub hbond_dist_cutoff: f64,
    pub hbond_optimal_dist: f64,

    /// Hydrophobic contact window
    pub hydrophobic_min: f64,
    pub hydrophobic_max: f64,

    /// Fraction of summed vdW radii below which atoms clash
    pub clash_tolerance: f64,

    /// Pairs beyond this distance contribute nothing
    pub interaction_cutoff: f64,
}

impl Default for HybridParams {
    fn default() -> Self {
        Self {
            weight_shape: -0.8,
            weight_hbond: -0.587,
            weight_hydrophobic: -0.12,
            weight_clash: 0.84,

            shape_sigma: 1.5,

            hbond_dist_cutoff: 4.0,
            hbond_optimal_dist: 1.9,

            hydrophobic_min: 0.5,
            hydrophobic_max: 4.5,

            clash_tolerance: 0.75,

            interaction_cutoff: 8.0,
        }
    }
}

/// Implementation of the hybrid (shape + chemistry) scoring function
#[derive(Debug, Clone, Default)]
pub struct HybridScore {
    pub params: HybridParams,
}

impl HybridScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: HybridParams) -> Self {
        Self { params }
    }

    /// Gaussian overlap of one ligand atom with the reference ligand
    fn shape_overlap(&self, distance: f64) -> f64 {
        let sigma = self.params.shape_sigma;
        (-(distance * distance) / (2.0 * sigma * sigma)).exp()
    }

    /// Distance-ramped hydrogen bond strength in [0, 1]
    fn hbond_strength(&self, distance: f64) -> f64 {
        if distance > self.params.hbond_dist_cutoff {
            return 0.0;
        }
        if distance <= self.params.hbond_optimal_dist {
            return 1.0;
        }
        1.0 - (distance - self.params.hbond_optimal_dist)
            / (self.params.hbond_dist_cutoff - self.params.hbond_optimal_dist)
    }

    /// Linear hydrophobic contact factor in [0, 1]
    fn hydrophobic_factor(&self, distance: f64) -> f64 {
        if distance < self.params.hydrophobic_min || distance > self.params.hydrophobic_max {
            return 0.0;
        }
        (self.params.hydrophobic_max - distance)
            / (self.params.hydrophobic_max - self.params.hydrophobic_min)
    }
}

impl ScoringFunction for HybridScore {
    fn name(&self) -> &'static str {
        "Hybrid"
    }

    fn score_pose(&self, ligand: &Molecule, receptor: &Receptor) -> ScoreComponents {
        let mut components = ScoreComponents::default();
        let cutoff = self.params.interaction_cutoff;

        for lig_atom in &ligand.atoms {
            // Shape term against the reference ligand
            for ref_atom in &receptor.reference {
                let distance = lig_atom.distance(ref_atom);
                if distance < cutoff {
                    components.shape += self.params.weight_shape * self.shape_overlap(distance);
                }
            }

            // Chemistry terms against the pocket
            for pocket_atom in &receptor.pocket {
                let distance = lig_atom.distance(pocket_atom);
                if distance >= cutoff {
                    continue;
                }

                let h_bonded = (lig_atom.is_h_bond_donor() && pocket_atom.is_h_bond_acceptor())
                    || (lig_atom.is_h_bond_acceptor() && pocket_atom.is_h_bond_donor());
                if h_bonded {
                    components.hbond += self.params.weight_hbond * self.hbond_strength(distance);
                }

                if lig_atom.is_hydrophobic() && pocket_atom.is_hydrophobic() {
                    components.hydrophobic +=
                        self.params.weight_hydrophobic * self.hydrophobic_factor(distance);
                }

                let contact = self.params.clash_tolerance
                    * (lig_atom.element.radius() + pocket_atom.element.radius());
                if distance < contact {
                    let overlap = contact - distance;
                    components.clash += self.params.weight_clash * overlap * overlap;
                }
            }
        }

        components
    }
}
