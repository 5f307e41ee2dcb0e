// Proof of work
//
// Brute-force nonce search: a nonce is valid when the hash of the candidate
// block {nonce, previous hash, transactions} starts with `difficulty` zero hex
// characters.

use super::block::{hash_content, BlockError, BlockHash};
use super::transaction::Transaction;

/// Number of leading zero hex characters a block hash must have
pub const MINING_DIFFICULTY: usize = 3;

/// Checks whether `nonce` solves the puzzle for the given block content
pub fn valid_proof(
    nonce: u64,
    previous_hash: &BlockHash,
    transactions: &[Transaction],
    difficulty: usize,
) -> Result<bool, BlockError> {
    let hash = hash_content(nonce, previous_hash, transactions)?;
    Ok(hash.meets_difficulty(difficulty))
}

/// Searches nonces from zero upwards until one satisfies `difficulty`.
///
/// There is no iteration bound; callers on an async runtime should run this
/// on a blocking worker.
pub fn find_nonce(
    previous_hash: &BlockHash,
    transactions: &[Transaction],
    difficulty: usize,
) -> Result<u64, BlockError> {
    let mut nonce = 0;
    while !valid_proof(nonce, previous_hash, transactions, difficulty)? {
        nonce += 1;
    }

    Ok(nonce)
}
