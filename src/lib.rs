//! hybriddock: automated hybrid docking of small molecules to a receptor
//!
//! The pipeline loads (or derives, by splitting a protein-ligand complex) a
//! prepared receptor, then docks each molecule from a lazy input stream with
//! a deterministic hybrid shape + chemistry engine, writing one scored,
//! annotated pose per input molecule.

pub mod atom;
pub mod engine;
pub mod io;
pub mod molecule;
pub mod orchestrator;
pub mod receptor;
pub mod scoring;
pub mod toolkit;

// Re-export commonly used types and functions
pub use atom::{Atom, Element};
pub use engine::{DockMethod, DockedPose, HybridEngine, SearchResolution};
pub use molecule::Molecule;
pub use orchestrator::{dock, DockError, DockReport, LogProgress, Progress};
pub use receptor::Receptor;
pub use toolkit::{HybridToolkit, Toolkit};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
