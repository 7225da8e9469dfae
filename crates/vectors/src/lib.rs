//! Drivers behind the `verkle-vectors` binary.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use pedersen::harness::{self, CaseOutcome, Report};
use pedersen::{Committer, CommitterConfig};
use primitives::{decode_hex, encode_hex, Key, RootHash, Value};
use tracing::info;
use verkle::{code, VerkleTrie};

/// Committer for the requested basis, reusing the shared one for defaults.
pub fn committer_for(config: CommitterConfig) -> Arc<Committer> {
    if config == CommitterConfig::default() {
        Committer::default_shared()
    } else {
        Arc::new(Committer::new(config))
    }
}

pub fn run_pedersen_file(committer: &Committer, path: &Path) -> Result<Report> {
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let vectors = harness::parse_vectors(&json).with_context(|| format!("parsing {}", path.display()))?;
    info!(cases = vectors.len(), file = %path.display(), "running pedersen vectors");
    Ok(harness::run_vectors(committer, &vectors)?)
}

/// One line per case: `Test[i] OK` or `Test[i] ERR` with both encodings.
pub fn render_report(report: &Report) -> Vec<String> {
    report
        .cases
        .iter()
        .map(|case| match &case.outcome {
            CaseOutcome::Pass => format!("Test[{}] OK", case.index),
            CaseOutcome::Mismatch { actual, expected } => {
                format!("Test[{}] ERR actual={actual} expected={expected}", case.index)
            }
        })
        .collect()
}

/// Parse a `KEY=VALUE` pair of 32-byte hex strings.
pub fn parse_kv(s: &str) -> Result<(Key, Value)> {
    let Some((k, v)) = s.split_once('=') else {
        bail!("expected KEY=VALUE, got {s:?}");
    };
    let key = Key::try_from(decode_hex(k)?.as_slice()).context("key")?;
    let value = Value::try_from(decode_hex(v)?.as_slice()).context("value")?;
    Ok((key, value))
}

/// The single-value scenario: key `00112233..eeff00112233..eeff`, value
/// `0x10` followed by zeros.
pub fn default_scenario() -> Vec<(Key, Value)> {
    let mut key = [0u8; 32];
    for (i, b) in key.iter_mut().enumerate() {
        *b = (i % 16) as u8 * 0x11;
    }
    let mut value = [0u8; 32];
    value[0] = 0x10;
    vec![(Key(key), Value(value))]
}

pub fn root_hash(committer: Arc<Committer>, pairs: &[(Key, Value)]) -> Result<RootHash> {
    let mut trie = VerkleTrie::new(committer)?;
    trie.insert_batch(pairs.iter().copied());
    let root = trie.root_hash()?;
    info!(entries = trie.len(), nodes = trie.node_count(), "computed root hash");
    Ok(root)
}

pub fn chunkify_hex(code_hex: &str) -> Result<Vec<String>> {
    let code = decode_hex(code_hex.trim()).context("bytecode")?;
    Ok(code::chunkify_code(&code).iter().map(|c| encode_hex(c)).collect())
}
