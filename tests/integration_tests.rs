//! Integration tests for the hybriddock docking pipeline

use std::path::PathBuf;
use tempfile::tempdir;

use hybriddock::io::MoleculeReader;
use hybriddock::orchestrator::{dock, DockError, LogProgress, ReceptorOrigin};
use hybriddock::receptor::{make_receptor, split_complex, write_receptor};
use hybriddock::toolkit::HybridToolkit;

/// Get the path to test data directory
fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test_data")
}

#[test]
fn test_derive_receptor_and_dock_smiles() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = dir.path().join("out.sdf");

    let report = dock(
        &HybridToolkit,
        &test_data_dir().join("complex.pdb"),
        &test_data_dir().join("ligands.smi"),
        &out,
        1,
        &LogProgress,
    )
    .expect("docking should succeed");

    assert_eq!(report.receptor_origin, ReceptorOrigin::DerivedFromComplex);
    assert_eq!(report.molecules_docked, 3);

    let records: Vec<_> = MoleculeReader::open(&out)
        .expect("output should be readable")
        .collect::<Result<Vec<_>, _>>()
        .expect("output records should parse");

    assert_eq!(records.len(), 3, "one record per input molecule");

    let titles: Vec<_> = records.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["ethanol", "acetic_acid", "phenol"]);

    for record in &records {
        let score = record
            .sd_tag("Hybrid2")
            .expect("each record carries a Hybrid2 score tag");
        let score: f64 = score.parse().expect("score should be numeric");
        assert!(score.is_finite());

        // Pose annotation rides along with the score
        assert!(record.sd_tag("Hybrid2 shape").is_some());
        assert!(record.sd_tag("Hybrid2 clash").is_some());
    }
}

#[test]
fn test_prepared_receptor_takes_direct_load_path() {
    let dir = tempdir().expect("Failed to create temp dir");

    // Prepare a receptor once and persist it in the native format
    let complex = hybriddock::io::read_single_molecule(test_data_dir().join("complex.pdb"))
        .expect("complex should parse");
    let parts = split_complex(&complex).expect("complex should split");
    let receptor = make_receptor(&parts.protein, &parts.ligand).expect("receptor should build");

    let receptor_path = dir.path().join("receptor.json");
    write_receptor(&receptor, &receptor_path).expect("receptor should persist");

    let out = dir.path().join("out.sdf");
    let report = dock(
        &HybridToolkit,
        &receptor_path,
        &test_data_dir().join("ligands.smi"),
        &out,
        1,
        &LogProgress,
    )
    .expect("docking should succeed");

    assert_eq!(report.receptor_origin, ReceptorOrigin::Loaded);
    assert_eq!(report.molecules_docked, 3);
}

#[test]
fn test_protein_only_complex_fails_before_output() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = dir.path().join("out.sdf");

    let apo = test_data_dir().join("apo.pdb");
    let result = dock(
        &HybridToolkit,
        &apo,
        &test_data_dir().join("ligands.smi"),
        &out,
        1,
        &LogProgress,
    );

    match result {
        Err(DockError::ReceptorUnavailable { path, .. }) => {
            assert_eq!(path, apo, "error names the offending path");
        }
        other => panic!("expected ReceptorUnavailable, got {:?}", other.map(|_| ())),
    }

    assert!(!out.exists(), "no output file on receptor failure");
}

#[test]
fn test_empty_molecules_file_produces_empty_output() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mols = dir.path().join("none.smi");
    std::fs::write(&mols, "").expect("fixture write");
    let out = dir.path().join("out.sdf");

    let report = dock(
        &HybridToolkit,
        &test_data_dir().join("complex.pdb"),
        &mols,
        &out,
        1,
        &LogProgress,
    )
    .expect("empty input is not an error");

    assert_eq!(report.molecules_docked, 0);
    assert!(out.exists(), "output file is still created");

    let records = MoleculeReader::open(&out)
        .expect("output should open")
        .count();
    assert_eq!(records, 0);
}

#[test]
fn test_docking_is_idempotent() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out1 = dir.path().join("out1.sdf");
    let out2 = dir.path().join("out2.sdf");

    for out in [&out1, &out2] {
        dock(
            &HybridToolkit,
            &test_data_dir().join("complex.pdb"),
            &test_data_dir().join("ligands.smi"),
            out,
            1,
            &LogProgress,
        )
        .expect("docking should succeed");
    }

    let a = std::fs::read_to_string(&out1).expect("read first output");
    let b = std::fs::read_to_string(&out2).expect("read second output");
    assert_eq!(a, b, "identical inputs produce identical poses and scores");
}

#[test]
fn test_unwritable_output_is_fatal() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = dir.path().join("missing").join("out.sdf");

    let result = dock(
        &HybridToolkit,
        &test_data_dir().join("complex.pdb"),
        &test_data_dir().join("ligands.smi"),
        &out,
        1,
        &LogProgress,
    );

    assert!(matches!(result, Err(DockError::OutputUnwritable { .. })));
}

#[test]
fn test_zero_pose_count_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = dir.path().join("out.sdf");

    let result = dock(
        &HybridToolkit,
        &test_data_dir().join("complex.pdb"),
        &test_data_dir().join("ligands.smi"),
        &out,
        0,
        &LogProgress,
    );

    assert!(matches!(result, Err(DockError::InvalidPoseCount(0))));
}

#[test]
fn test_malformed_molecule_aborts_run() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mols = dir.path().join("bad.smi");
    std::fs::write(&mols, "CCO ethanol\nC(C broken\n").expect("fixture write");
    let out = dir.path().join("out.sdf");

    let result = dock(
        &HybridToolkit,
        &test_data_dir().join("complex.pdb"),
        &mols,
        &out,
        1,
        &LogProgress,
    );

    assert!(matches!(result, Err(DockError::MoleculeDockFailure { .. })));
}
