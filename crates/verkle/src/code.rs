//! Contract code chunking.

use pedersen::PedersenError;
use primitives::{Key, Value};

use crate::keys::{Address, TreeKeyDeriver};

pub const CHUNK_LEN: usize = 32;
/// Code bytes carried per chunk after the leading pushdata count.
pub const CHUNK_CODE_LEN: usize = CHUNK_LEN - 1;

const PUSH_OFFSET: u8 = 95;
const PUSH1: u8 = PUSH_OFFSET + 1;
const PUSH32: u8 = PUSH_OFFSET + 32;

/// Split bytecode into 32-byte chunks. Byte 0 of each chunk counts the
/// leading bytes that are PUSH data rather than opcodes (capped at 31).
pub fn chunkify_code(code: &[u8]) -> Vec<[u8; CHUNK_LEN]> {
    let padded_len = code.len().div_ceil(CHUNK_CODE_LEN) * CHUNK_CODE_LEN;
    let mut padded = code.to_vec();
    padded.resize(padded_len, 0);

    // Remaining pushdata bytes at and after each position.
    let mut pushdata_left = vec![0u8; padded_len + CHUNK_LEN];
    let mut pos = 0;
    while pos < padded.len() {
        let op = padded[pos];
        pos += 1;
        if (PUSH1..=PUSH32).contains(&op) {
            let n = op - PUSH_OFFSET;
            for x in 0..n {
                pushdata_left[pos + x as usize] = n - x;
            }
            pos += n as usize;
        }
    }

    padded
        .chunks(CHUNK_CODE_LEN)
        .enumerate()
        .map(|(i, code)| {
            let mut chunk = [0u8; CHUNK_LEN];
            chunk[0] = pushdata_left[i * CHUNK_CODE_LEN].min(CHUNK_CODE_LEN as u8);
            chunk[1..].copy_from_slice(code);
            chunk
        })
        .collect()
}

/// Trie entries storing `code` for `address`, one per chunk.
pub fn code_entries(
    deriver: &TreeKeyDeriver,
    address: &Address,
    code: &[u8],
) -> Result<Vec<(Key, Value)>, PedersenError> {
    chunkify_code(code)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| Ok((deriver.code_chunk_key(address, i as u64)?, Value(chunk))))
        .collect()
}
