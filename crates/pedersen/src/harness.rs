//! Test-vector verification of the committer.
//!
//! A vector file is a JSON list of `{ "frs": [hex scalar, ..], "expected": hex point }`
//! records. Every record is decoded up front, so malformed data fails before
//! any commitment is computed. Mismatches are then catalogued per case and
//! never abort the run.

use primitives::{decode_hex_fixed, encode_hex, encode_point, scalar_from_hex, CodecError, Scalar, POINT_LEN};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::Committer;

/// One record of a vector file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestVector {
    pub frs: Vec<String>,
    pub expected: String,
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("malformed vector file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("case {case}: scalar {index}: {source}")]
    Scalar { case: usize, index: usize, #[source] source: CodecError },
    #[error("case {case}: expected commitment: {source}")]
    Expected { case: usize, #[source] source: CodecError },
    #[error("case {case}: {len} scalars exceed basis width {width}")]
    TooLong { case: usize, len: usize, width: usize },
}

/// A record after hex decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedVector {
    pub scalars: Vec<Scalar>,
    pub expected: [u8; POINT_LEN],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseOutcome {
    Pass,
    Mismatch { actual: String, expected: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub index: usize,
    pub outcome: CaseOutcome,
}

/// Per-case results in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub cases: Vec<CaseReport>,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome == CaseOutcome::Pass).count()
    }

    pub fn failed(&self) -> usize { self.cases.len() - self.passed() }

    pub fn is_success(&self) -> bool { self.failed() == 0 }

    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases.iter().filter(|c| c.outcome != CaseOutcome::Pass)
    }
}

pub fn parse_vectors(json: &str) -> Result<Vec<TestVector>, HarnessError> {
    Ok(serde_json::from_str(json)?)
}

pub fn decode_vector(case: usize, vector: &TestVector, width: usize) -> Result<DecodedVector, HarnessError> {
    if vector.frs.len() > width {
        return Err(HarnessError::TooLong { case, len: vector.frs.len(), width });
    }
    let scalars = vector
        .frs
        .iter()
        .enumerate()
        .map(|(index, s)| scalar_from_hex(s).map_err(|source| HarnessError::Scalar { case, index, source }))
        .collect::<Result<Vec<_>, _>>()?;
    let expected = decode_hex_fixed::<POINT_LEN>(&vector.expected)
        .map_err(|source| HarnessError::Expected { case, source })?;
    Ok(DecodedVector { scalars, expected })
}

/// Commit to one decoded case and compare byte-for-byte.
pub fn check_case(committer: &Committer, index: usize, case: &DecodedVector) -> CaseReport {
    let actual = encode_point(&committer.commit(&case.scalars));
    let outcome = if actual == case.expected {
        CaseOutcome::Pass
    } else {
        CaseOutcome::Mismatch { actual: encode_hex(&actual), expected: encode_hex(&case.expected) }
    };
    CaseReport { index, outcome }
}

/// Decode every vector, then check all of them.
pub fn run_vectors(committer: &Committer, vectors: &[TestVector]) -> Result<Report, HarnessError> {
    let decoded = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| decode_vector(i, v, committer.width()))
        .collect::<Result<Vec<_>, _>>()?;

    let cases: Vec<CaseReport> = decoded
        .par_iter()
        .enumerate()
        .map(|(i, d)| check_case(committer, i, d))
        .collect();
    let report = Report { cases };

    for failure in report.failures() {
        if let CaseOutcome::Mismatch { actual, expected } = &failure.outcome {
            warn!(case = failure.index, %actual, %expected, "commitment mismatch");
        }
    }
    info!(passed = report.passed(), failed = report.failed(), "pedersen vectors checked");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommitterConfig;
    use primitives::encode_scalar;

    fn committer() -> Committer {
        Committer::new(CommitterConfig { width: 4, ..Default::default() })
    }

    fn vector_for(c: &Committer, scalars: &[Scalar]) -> TestVector {
        TestVector {
            frs: scalars.iter().map(|s| encode_hex(&encode_scalar(s))).collect(),
            expected: encode_hex(&encode_point(&c.commit(scalars))),
        }
    }

    #[test]
    fn mismatch_does_not_stop_later_cases() {
        let c = committer();
        let good = vector_for(&c, &[Scalar::from(1u64), Scalar::from(2u64)]);
        let mut bad = vector_for(&c, &[Scalar::from(3u64)]);
        bad.expected = good.expected.clone();
        let also_good = vector_for(&c, &[]);

        let report = run_vectors(&c, &[good, bad, also_good]).unwrap();
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 1);
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.index, 1);
        match &failure.outcome {
            CaseOutcome::Mismatch { actual, expected } => assert_ne!(actual, expected),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn malformed_scalar_fails_before_commitment() {
        let c = committer();
        let mut v = vector_for(&c, &[Scalar::from(1u64)]);
        v.frs.push("not-hex".into());
        let err = run_vectors(&c, &[v]).unwrap_err();
        assert!(matches!(err, HarnessError::Scalar { case: 0, index: 1, .. }));
    }

    #[test]
    fn short_expected_point_is_rejected() {
        let c = committer();
        let v = TestVector { frs: vec![], expected: "00".into() };
        assert!(matches!(run_vectors(&c, &[v]), Err(HarnessError::Expected { case: 0, .. })));
    }

    #[test]
    fn too_many_scalars_is_rejected() {
        let c = committer();
        let long = TestVector { frs: vec![encode_hex(&[0u8; 32]); 5], expected: encode_hex(&[0u8; 32]) };
        assert!(matches!(run_vectors(&c, &[long]), Err(HarnessError::TooLong { len: 5, width: 4, .. })));
    }

    #[test]
    fn parses_json_records() {
        let json = r#"[{"frs": ["00"], "expected": "11"}]"#;
        let parsed = parse_vectors(json).unwrap();
        assert_eq!(parsed[0].frs, vec!["00".to_string()]);
        assert!(matches!(parse_vectors("{"), Err(HarnessError::Json(_))));
    }
}
