//! The capability contract between the orchestrator and the chemistry stack
//!
//! The orchestrator depends only on these traits; `HybridToolkit` is the
//! concrete adapter wired to the io, receptor and engine modules.

use std::path::Path;

use crate::engine::{DockMethod, DockedPose, EngineError, HybridEngine, SearchResolution};
use crate::io::{IoError, MoleculeReader, MoleculeWriter};
use crate::molecule::Molecule;
use crate::receptor::{self, ComplexParts, Receptor, ReceptorError};

/// A docking engine bound to one receptor per run
pub trait DockEngine {
    /// Bind the engine to a receptor
    fn initialize(&mut self, receptor: Receptor);

    /// Dock one molecule, returning its best pose
    fn dock_multi_conformer(&self, input: &Molecule) -> Result<DockedPose, EngineError>;

    /// Attach the pose score under the method's tag name
    fn set_sd_score(&self, molecule: &mut Molecule, pose: &DockedPose);

    /// Attach pose annotation metadata
    fn annotate_pose(&self, molecule: &mut Molecule, pose: &DockedPose);
}

/// An append-only output stream for docked molecules
pub trait PoseWriter {
    fn write_molecule(&mut self, molecule: &Molecule) -> Result<(), IoError>;
    fn flush(&mut self) -> Result<(), IoError>;
}

/// The toolkit surface the orchestrator drives
pub trait Toolkit {
    type Engine: DockEngine;
    type Reader: Iterator<Item = Result<Molecule, IoError>>;
    type Writer: PoseWriter;

    /// Load a pre-prepared receptor file
    fn read_receptor_file(&self, path: &Path) -> Result<Receptor, ReceptorError>;

    /// Read the single top-level structure from a complex file
    fn read_complex(&self, path: &Path) -> Result<Molecule, IoError>;

    /// Partition a complex into {ligand, protein, water, other}
    fn split_mol_complex(&self, complex: &Molecule) -> Result<ComplexParts, ReceptorError>;

    /// Build a receptor from a protein and a reference ligand
    fn make_receptor(
        &self,
        protein: &Molecule,
        ligand: &Molecule,
    ) -> Result<Receptor, ReceptorError>;

    /// Create an unbound docking engine
    fn create_engine(&self, method: DockMethod, resolution: SearchResolution) -> Self::Engine;

    /// Open a lazy molecule input stream
    fn open_molecule_input(&self, path: &Path) -> Result<Self::Reader, IoError>;

    /// Create/overwrite a molecule output stream
    fn open_molecule_output(&self, path: &Path) -> Result<Self::Writer, IoError>;
}

impl DockEngine for HybridEngine {
    fn initialize(&mut self, receptor: Receptor) {
        HybridEngine::initialize(self, receptor);
    }

    fn dock_multi_conformer(&self, input: &Molecule) -> Result<DockedPose, EngineError> {
        HybridEngine::dock_multi_conformer(self, input)
    }

    fn set_sd_score(&self, molecule: &mut Molecule, pose: &DockedPose) {
        HybridEngine::set_sd_score(self, molecule, pose);
    }

    fn annotate_pose(&self, molecule: &mut Molecule, pose: &DockedPose) {
        HybridEngine::annotate_pose(self, molecule, pose);
    }
}

impl PoseWriter for MoleculeWriter {
    fn write_molecule(&mut self, molecule: &Molecule) -> Result<(), IoError> {
        MoleculeWriter::write_molecule(self, molecule)
    }

    fn flush(&mut self) -> Result<(), IoError> {
        MoleculeWriter::flush(self)
    }
}

/// The in-tree chemistry backend
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridToolkit;

impl Toolkit for HybridToolkit {
    type Engine = HybridEngine;
    type Reader = MoleculeReader;
    type Writer = MoleculeWriter;

    fn read_receptor_file(&self, path: &Path) -> Result<Receptor, ReceptorError> {
        receptor::load_receptor(path)
    }

    fn read_complex(&self, path: &Path) -> Result<Molecule, IoError> {
        crate::io::read_single_molecule(path)
    }

    fn split_mol_complex(&self, complex: &Molecule) -> Result<ComplexParts, ReceptorError> {
        receptor::split_complex(complex)
    }

    fn make_receptor(
        &self,
        protein: &Molecule,
        ligand: &Molecule,
    ) -> Result<Receptor, ReceptorError> {
        receptor::make_receptor(protein, ligand)
    }

    fn create_engine(&self, method: DockMethod, resolution: SearchResolution) -> Self::Engine {
        HybridEngine::new(method, resolution)
    }

    fn open_molecule_input(&self, path: &Path) -> Result<Self::Reader, IoError> {
        MoleculeReader::open(path)
    }

    fn open_molecule_output(&self, path: &Path) -> Result<Self::Writer, IoError> {
        MoleculeWriter::create(path)
    }
}
