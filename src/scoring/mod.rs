//! Scoring functions for docked poses

pub mod hybrid;

use crate::molecule::Molecule;
use crate::receptor::Receptor;

pub use hybrid::{HybridParams, HybridScore};

/// Per-term breakdown of a pose score
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreComponents {
    /// Shape overlap with the reference ligand (favorable, negative)
    pub shape: f64,

    /// Hydrogen-bond complementarity with pocket atoms (favorable, negative)
    pub hbond: f64,

    /// Hydrophobic contact with pocket atoms (favorable, negative)
    pub hydrophobic: f64,

    /// Steric clash with pocket atoms (penalty, positive)
    pub clash: f64,
}

impl ScoreComponents {
    /// Total score; lower is better
    pub fn total(&self) -> f64 {
        self.shape + self.hbond + self.hydrophobic + self.clash
    }

    /// Named terms, in reporting order
    pub fn terms(&self) -> [(&'static str, f64); 4] {
        [
            ("shape", self.shape),
            ("hbond", self.hbond),
            ("hydrophobic", self.hydrophobic),
            ("clash", self.clash),
        ]
    }
}

/// Trait representing a scoring function over a posed ligand and a receptor
pub trait ScoringFunction {
    /// Get the name of the scoring function
    fn name(&self) -> &'static str;

    /// Score a ligand pose against the receptor
    fn score_pose(&self, ligand: &Molecule, receptor: &Receptor) -> ScoreComponents;
}
