use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use utoipa::ToSchema;

use std::fmt;

use super::transaction::Transaction;

/// Errors that can occur while hashing a block
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),
}

/// A SHA-256 block digest, rendered as lowercase hex on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockHash(pub [u8; 32]);

impl BlockHash {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, BlockError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| BlockError::InvalidHash(e.to_string()))?;
        Ok(BlockHash(bytes))
    }

    /// Returns true if the hex form starts with `difficulty` zero characters
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        let hex = self.to_hex();
        difficulty <= hex.len() && hex[..difficulty].bytes().all(|c| c == b'0')
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for BlockHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BlockHash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Fields that make up a block hash; the timestamp is not among them
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashedContent<'a> {
    nonce: u64,
    previous_hash: &'a BlockHash,
    transactions: &'a [Transaction],
}

/// Hashes a (possibly hypothetical) block from its content
pub fn hash_content(
    nonce: u64,
    previous_hash: &BlockHash,
    transactions: &[Transaction],
) -> Result<BlockHash, BlockError> {
    let content = HashedContent {
        nonce,
        previous_hash,
        transactions,
    };
    let bytes = serde_json::to_vec(&content)?;

    Ok(BlockHash(Sha256::digest(bytes).into()))
}

/// Represents a block in the blockchain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Timestamp when the block was sealed
    #[schema(value_type = String, example = "2023-01-01T12:00:00Z")]
    pub timestamp: DateTime<Utc>,

    /// Proof of work
    pub nonce: u64,

    /// Hash of the previous block
    #[schema(value_type = String)]
    pub previous_hash: BlockHash,

    /// Transactions sealed in this block
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Creates a new block stamped with the current time
    pub fn new(nonce: u64, previous_hash: BlockHash, transactions: Vec<Transaction>) -> Self {
        Block {
            timestamp: Utc::now(),
            nonce,
            previous_hash,
            transactions,
        }
    }

    /// The all-zero block the genesis block links back to
    pub fn zero() -> Self {
        Block {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            nonce: 0,
            previous_hash: BlockHash::default(),
            transactions: Vec::new(),
        }
    }

    /// Calculates the hash of the block
    pub fn hash(&self) -> Result<BlockHash, BlockError> {
        hash_content(self.nonce, &self.previous_hash, &self.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfers() -> Vec<Transaction> {
        vec![
            Transaction::new("alice", "bob", 10.0),
            Transaction::new_reward("miner", 1.0),
        ]
    }

    #[test]
    fn test_new_block() {
        let previous = Block::zero().hash().unwrap();
        let block = Block::new(100, previous, transfers());

        assert_eq!(block.nonce, 100);
        assert_eq!(block.previous_hash, previous);
        assert_eq!(block.transactions.len(), 2);
    }

    #[test]
    fn test_hash_ignores_timestamp() {
        let block = Block::new(7, BlockHash([1; 32]), transfers());
        let mut later = block.clone();
        later.timestamp = block.timestamp + chrono::Duration::seconds(30);

        assert_eq!(block.hash().unwrap(), later.hash().unwrap());
    }

    #[test]
    fn test_hash_depends_on_content() {
        let block = Block::new(7, BlockHash([1; 32]), transfers());
        let hash = block.hash().unwrap();

        assert_eq!(hash.to_hex().len(), 64);
        assert_ne!(hash, Block::new(8, BlockHash([1; 32]), transfers()).hash().unwrap());
        assert_ne!(hash, Block::new(7, BlockHash([2; 32]), transfers()).hash().unwrap());

        let mut reordered = transfers();
        reordered.reverse();
        assert_ne!(hash, Block::new(7, BlockHash([1; 32]), reordered).hash().unwrap());
    }

    #[test]
    fn test_meets_difficulty() {
        let mut bytes = [0xffu8; 32];
        bytes[0] = 0x00;
        bytes[1] = 0x0f;
        let hash = BlockHash(bytes);

        assert!(hash.meets_difficulty(0));
        assert!(hash.meets_difficulty(3));
        assert!(!hash.meets_difficulty(4));
        assert!(!hash.meets_difficulty(65));
    }

    #[test]
    fn test_block_json_shape() {
        let block = Block::new(3, BlockHash([0xab; 32]), vec![Transaction::new("a", "b", 5.0)]);
        let json = serde_json::to_value(&block).unwrap();

        assert_eq!(json["nonce"], 3);
        assert_eq!(json["previousHash"], "ab".repeat(32));
        assert_eq!(json["transactions"][0]["senderAddress"], "a");
        assert_eq!(json["transactions"][0]["recipientAddress"], "b");
        assert_eq!(json["transactions"][0]["value"], 5.0);
        assert!(json["timestamp"].is_string());

        let decoded: Block = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, block);
    }
}
