use pedersen::harness::TestVector;
use pedersen::{Committer, CommitterConfig};
use primitives::{encode_hex, encode_point, encode_scalar, RootHash, Scalar};
use std::sync::Arc;

fn write_vectors(name: &str, vectors: &[TestVector]) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("verkle-vectors-{}-{name}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string(vectors).unwrap()).unwrap();
    path
}

#[test]
fn pedersen_file_reports_each_case() {
    let committer = vectors::committer_for(CommitterConfig::default());
    let scalars = [Scalar::from(1u64), Scalar::from(2u64), Scalar::from(3u64)];
    let good = TestVector {
        frs: scalars.iter().map(|s| encode_hex(&encode_scalar(s))).collect(),
        expected: encode_hex(&encode_point(&committer.commit(&scalars))),
    };
    let mut bad = good.clone();
    bad.frs.pop();

    let path = write_vectors("mixed", &[good, bad]);
    let report = vectors::run_pedersen_file(&committer, &path).unwrap();
    std::fs::remove_file(&path).ok();

    let lines = vectors::render_report(&report);
    assert_eq!(lines[0], "Test[0] OK");
    assert!(lines[1].starts_with("Test[1] ERR actual="));
    assert!(!report.is_success());
}

#[test]
fn missing_file_is_an_error() {
    let committer = Committer::default_shared();
    let missing = std::path::Path::new("/nonexistent/vectors.json");
    let err = vectors::run_pedersen_file(&committer, missing).unwrap_err();
    assert!(err.to_string().contains("reading"));
}

#[test]
fn default_config_reuses_shared_committer() {
    let a = vectors::committer_for(CommitterConfig::default());
    assert!(Arc::ptr_eq(&a, &Committer::default_shared()));
    let b = vectors::committer_for(CommitterConfig { seed: "x".into(), width: 256 });
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn scenario_root_is_stable() {
    let committer = Committer::default_shared();
    let pairs = vectors::default_scenario();
    let first = vectors::root_hash(committer.clone(), &pairs).unwrap();
    assert_ne!(first, RootHash([0; 32]));
    // the scenario inserts the same pair twice
    let doubled: Vec<_> = pairs.iter().chain(pairs.iter()).copied().collect();
    assert_eq!(vectors::root_hash(committer, &doubled).unwrap(), first);
}

#[test]
fn scenario_root_matches_known_hex() {
    let root = vectors::root_hash(Committer::default_shared(), &vectors::default_scenario()).unwrap();
    assert_eq!(root.to_string(), "99df4b4920b3204428c5631218b36aa7b84afe304283451b6a1f9171affa1e06");
}

#[test]
fn known_pedersen_fixture_passes() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../pedersen/tests/fixtures/pedersen_vectors.json");
    let report = vectors::run_pedersen_file(&Committer::default_shared(), &path).unwrap();
    assert!(report.is_success());
    assert!(vectors::render_report(&report).iter().all(|line| line.ends_with(" OK")));
}

#[test]
fn narrow_basis_cannot_build_a_trie() {
    let committer = vectors::committer_for(CommitterConfig { width: 16, ..Default::default() });
    assert!(vectors::root_hash(committer, &vectors::default_scenario()).is_err());
}

#[test]
fn chunkify_prints_hex_chunks() {
    let chunks = vectors::chunkify_hex("0x6001").unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(&chunks[0][..6], "006001");
    assert_eq!(chunks[0].len(), 64);
    assert!(vectors::chunkify_hex("zz").is_err());
}
