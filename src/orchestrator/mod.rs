//! The docking orchestrator: receptor acquisition, then one pass over the
//! input molecule stream, writing one scored pose per molecule

use log::{info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::{DockMethod, SearchResolution};
use crate::io::IoError;
use crate::receptor::Receptor;
use crate::toolkit::{DockEngine, PoseWriter, Toolkit};

/// Fatal errors for a docking run
#[derive(Error, Debug)]
pub enum DockError {
    /// Neither direct load nor complex-split-and-build produced a receptor
    #[error("no receptor could be loaded or derived from {path}: {reason}")]
    ReceptorUnavailable { path: PathBuf, reason: String },

    /// The output destination could not be opened
    #[error("output destination {path} is not writable: {source}")]
    OutputUnwritable { path: PathBuf, source: IoError },

    /// A molecule failed to parse or dock; aborts the whole run
    #[error("failed to dock molecule '{title}': {reason}")]
    MoleculeDockFailure { title: String, reason: String },

    /// Requested pose count is out of range
    #[error("pose count must be at least 1, got {0}")]
    InvalidPoseCount(usize),

    /// Writing to an already-open output stream failed
    #[error("error writing docked molecules: {0}")]
    Output(#[from] IoError),
}

/// How the receptor for this run was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceptorOrigin {
    /// Loaded directly from a prepared receptor file
    Loaded,
    /// Derived by splitting a complex and building from protein + ligand
    DerivedFromComplex,
}

/// Progress hook; implementations must not fail
pub trait Progress {
    /// A pipeline phase started or finished
    fn phase(&self, message: &str);

    /// One molecule was docked and written
    fn molecule_docked(&self, title: &str, score: f64);
}

/// Default progress reporting through the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn phase(&self, message: &str) {
        info!("{}", message);
    }

    fn molecule_docked(&self, title: &str, score: f64) {
        info!("docked '{}' (score {:.4})", title, score);
    }
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct DockReport {
    pub receptor_origin: ReceptorOrigin,
    pub molecules_docked: usize,
    pub pose_count: usize,
}

/// Dock every molecule in `molecules_source` against the receptor obtained
/// from `receptor_source`, appending scored poses to `output_destination`.
///
/// `pose_count` is accepted for API compatibility but only single-pose
/// output is produced; values above 1 are flagged and ignored.
pub fn dock<T: Toolkit, P: Progress>(
    toolkit: &T,
    receptor_source: &Path,
    molecules_source: &Path,
    output_destination: &Path,
    pose_count: usize,
    progress: &P,
) -> Result<DockReport, DockError> {
    if pose_count == 0 {
        return Err(DockError::InvalidPoseCount(pose_count));
    }
    if pose_count > 1 {
        warn!(
            "pose_count {} requested, but only single-pose output is supported; docking 1 pose per molecule",
            pose_count
        );
    }

    let (receptor, origin) = load_or_derive_receptor(toolkit, receptor_source, progress)?;

    // Output is opened only once a receptor exists, so a failed receptor
    // phase leaves no output file behind
    let mut writer = toolkit
        .open_molecule_output(output_destination)
        .map_err(|source| DockError::OutputUnwritable {
            path: output_destination.to_path_buf(),
            source,
        })?;

    let mut engine = toolkit.create_engine(DockMethod::Hybrid2, SearchResolution::Standard);
    engine.initialize(receptor);

    progress.phase(&format!(
        "docking molecules from {}",
        molecules_source.display()
    ));

    let reader = toolkit
        .open_molecule_input(molecules_source)
        .map_err(|e| DockError::MoleculeDockFailure {
            title: molecules_source.display().to_string(),
            reason: e.to_string(),
        })?;

    let mut molecules_docked = 0;
    for result in reader {
        let molecule = result.map_err(|e| DockError::MoleculeDockFailure {
            title: format!("record {}", molecules_docked + 1),
            reason: e.to_string(),
        })?;

        let pose = engine
            .dock_multi_conformer(&molecule)
            .map_err(|e| DockError::MoleculeDockFailure {
                title: molecule.title.clone(),
                reason: e.to_string(),
            })?;

        let mut docked = pose.molecule.clone();
        engine.set_sd_score(&mut docked, &pose);
        engine.annotate_pose(&mut docked, &pose);
        writer.write_molecule(&docked)?;

        progress.molecule_docked(&docked.title, pose.score);
        molecules_docked += 1;
    }

    writer.flush()?;
    progress.phase(&format!(
        "finished: {} molecules docked to {}",
        molecules_docked,
        output_destination.display()
    ));

    Ok(DockReport {
        receptor_origin: origin,
        molecules_docked,
        pose_count,
    })
}

/// Obtain the receptor: direct load first, complex splitting as fallback.
/// First success wins; both failing is fatal.
fn load_or_derive_receptor<T: Toolkit, P: Progress>(
    toolkit: &T,
    receptor_source: &Path,
    progress: &P,
) -> Result<(Receptor, ReceptorOrigin), DockError> {
    progress.phase(&format!(
        "attempting to load receptor from {}",
        receptor_source.display()
    ));

    match toolkit.read_receptor_file(receptor_source) {
        Ok(receptor) => return Ok((receptor, ReceptorOrigin::Loaded)),
        Err(e) => {
            info!(
                "{} is not a prepared receptor ({}); treating it as a complex",
                receptor_source.display(),
                e
            );
        }
    }

    let unavailable = |reason: String| DockError::ReceptorUnavailable {
        path: receptor_source.to_path_buf(),
        reason,
    };

    let complex = toolkit
        .read_complex(receptor_source)
        .map_err(|e| unavailable(e.to_string()))?;

    progress.phase("attempting to split complex into components");
    let parts = toolkit
        .split_mol_complex(&complex)
        .map_err(|e| unavailable(e.to_string()))?;

    progress.phase("creating receptor using reference ligand");
    let receptor = toolkit
        .make_receptor(&parts.protein, &parts.ligand)
        .map_err(|e| unavailable(e.to_string()))?;

    Ok((receptor, ReceptorOrigin::DerivedFromComplex))
}
