// Blockchain module
//
// This module contains the core ledger implementation including:
// - Signature and public key codec
// - Transaction structure and origin checks
// - Transaction pool
// - Block structure
// - Proof of work algorithm
// - Blockchain structure and balance replay
// - Periodic mining scheduler

pub mod block;
pub mod chain;
pub mod crypto;
pub mod miner;
pub mod pool;
pub mod pow;
pub mod transaction;

// Re-export main components for easier access
pub use block::{Block, BlockHash};
pub use chain::{Blockchain, BlockchainError};
pub use crypto::{PublicKey, TransactionSignature};
pub use miner::MiningScheduler;
pub use pool::TransactionPool;
pub use transaction::{Transaction, TransactionOrigin, MINING_SENDER};
