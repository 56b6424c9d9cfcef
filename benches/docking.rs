//! Benchmark for the hybrid docking engine

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Vector3;

use hybriddock::atom::{Atom, Element};
use hybriddock::engine::{DockMethod, HybridEngine, SearchResolution};
use hybriddock::io::parse_smiles;
use hybriddock::receptor::{Receptor, Site};

fn bench_receptor() -> Receptor {
    let reference = vec![
        Atom::bare(Element::Carbon, Vector3::new(0.0, 0.0, 0.0), 1),
        Atom::bare(Element::Carbon, Vector3::new(1.5, 0.0, 0.0), 2),
        Atom::bare(Element::Oxygen, Vector3::new(3.0, 0.5, 0.0), 3),
        Atom::bare(Element::Nitrogen, Vector3::new(-1.2, 1.0, 0.5), 4),
    ];
    let pocket = vec![
        Atom::bare(Element::Nitrogen, Vector3::new(4.5, 1.0, 0.0), 5),
        Atom::bare(Element::Oxygen, Vector3::new(-2.5, 2.0, 0.0), 6),
        Atom::bare(Element::Carbon, Vector3::new(0.0, -3.0, 1.0), 7),
        Atom::bare(Element::Carbon, Vector3::new(2.0, 3.0, -1.0), 8),
    ];
    Receptor {
        site: Site {
            center: Vector3::new(1.0, 0.5, 0.0),
            extent: Vector3::repeat(16.0),
        },
        pocket,
        reference,
    }
}

fn bench_dock_single_molecule(c: &mut Criterion) {
    let mut engine = HybridEngine::new(DockMethod::Hybrid2, SearchResolution::Standard);
    engine.initialize(bench_receptor());

    let ligand = parse_smiles("CC(=O)Oc1ccccc1C(=O)O", "aspirin").unwrap();

    c.bench_function("dock_single_molecule", |b| {
        b.iter(|| engine.dock_multi_conformer(&ligand).unwrap())
    });
}

fn bench_dock_low_resolution(c: &mut Criterion) {
    let mut engine = HybridEngine::new(DockMethod::Hybrid2, SearchResolution::Low);
    engine.initialize(bench_receptor());

    let ligand = parse_smiles("CCO", "ethanol").unwrap();

    c.bench_function("dock_low_resolution", |b| {
        b.iter(|| engine.dock_multi_conformer(&ligand).unwrap())
    });
}

criterion_group!(benches, bench_dock_single_molecule, bench_dock_low_resolution);
criterion_main!(benches);
