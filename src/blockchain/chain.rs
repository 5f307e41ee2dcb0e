use log::{error, info, warn};
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::Mutex;

use std::sync::Arc;

use super::block::{Block, BlockError, BlockHash};
use super::pool::TransactionPool;
use super::pow::find_nonce;
use super::transaction::{Transaction, TransactionError, TransactionOrigin};
use crate::config::LedgerConfig;

/// Errors that can occur during blockchain operations
#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("Transaction error: {0}")]
    TransactionError(#[from] TransactionError),

    #[error("Block error: {0}")]
    BlockError(#[from] BlockError),

    #[error("Mining worker failed: {0}")]
    WorkerError(String),
}

/// Sealed blocks plus the hash of the newest one, as computed when it was sealed
#[derive(Debug)]
struct ChainState {
    blocks: Vec<Block>,
    last_hash: BlockHash,
}

/// The ledger: an append-only chain of blocks and the pool feeding it.
///
/// Cloning is cheap and every clone refers to the same ledger.
#[derive(Debug, Clone)]
pub struct Blockchain {
    /// The chain of blocks
    chain: Arc<RwLock<ChainState>>,

    /// Pending transactions to be included in the next block
    pool: Arc<TransactionPool>,

    /// Serializes seal cycles
    seal_lock: Arc<Mutex<()>>,

    /// Address credited with mining rewards
    owner_address: String,

    config: LedgerConfig,
}

impl Blockchain {
    /// Creates a new blockchain holding only the genesis block
    ///
    /// # Arguments
    ///
    /// * `owner_address` - The address that receives mining rewards
    /// * `config` - Difficulty, reward and mining cadence
    pub fn new(owner_address: impl Into<String>, config: LedgerConfig) -> Result<Self, BlockchainError> {
        let genesis = Block::new(0, Block::zero().hash()?, Vec::new());
        let last_hash = genesis.hash()?;

        Ok(Blockchain {
            chain: Arc::new(RwLock::new(ChainState {
                blocks: vec![genesis],
                last_hash,
            })),
            pool: Arc::new(TransactionPool::new()),
            seal_lock: Arc::new(Mutex::new(())),
            owner_address: owner_address.into(),
            config,
        })
    }

    /// Validates a transaction against its origin and adds it to the pool
    pub fn add_transaction(
        &self,
        transaction: Transaction,
        origin: &TransactionOrigin,
    ) -> Result<(), BlockchainError> {
        self.pool.add_transaction(transaction, origin)?;
        Ok(())
    }

    /// Runs one seal cycle.
    ///
    /// Returns `Ok(None)` without touching the chain when the pool is empty.
    /// Otherwise the pool is taken as the block's transaction set, the mining
    /// reward is appended, and the nonce search runs on a blocking worker while
    /// the seal lock is held. New transactions arriving meanwhile wait for the
    /// next block.
    ///
    /// The cycle runs on its own task, so dropping the returned future does
    /// not interrupt it. If the proof fails the drained transactions go back
    /// to the pool.
    pub async fn mine(&self) -> Result<Option<Block>, BlockchainError> {
        let blockchain = self.clone();

        tokio::spawn(async move { blockchain.seal().await })
            .await
            .map_err(|err| {
                error!("Seal task failed: {}", err);
                BlockchainError::WorkerError(err.to_string())
            })?
    }

    async fn seal(&self) -> Result<Option<Block>, BlockchainError> {
        let _sealing = self.seal_lock.lock().await;

        if self.pool.is_empty() {
            info!("Transaction pool is empty, nothing to mine");
            return Ok(None);
        }

        let mut transactions = self.pool.drain_pool();
        transactions.push(Transaction::new_reward(
            self.owner_address.as_str(),
            self.config.mining_reward,
        ));
        let previous_hash = self.last_hash();

        let sealed = self.prove(previous_hash, &transactions).await.and_then(|nonce| {
            let block = Block::new(nonce, previous_hash, transactions.clone());
            let hash = block.hash()?;
            Ok((block, hash))
        });

        let (block, hash) = match sealed {
            Ok(sealed) => sealed,
            Err(err) => {
                // Drop the reward, keep the user transactions pending
                transactions.pop();
                warn!("Seal failed, returning {} transactions to the pool", transactions.len());
                self.pool.restore(transactions);
                return Err(err);
            }
        };

        let height = {
            let mut chain = self.chain.write();
            chain.blocks.push(block.clone());
            chain.last_hash = hash;
            chain.blocks.len() - 1
        };

        info!(
            "Sealed block {} with {} transactions (nonce {}, hash {})",
            height,
            block.transactions.len(),
            block.nonce,
            hash
        );

        Ok(Some(block))
    }

    /// Searches for a nonce on a blocking worker
    async fn prove(
        &self,
        previous_hash: BlockHash,
        transactions: &[Transaction],
    ) -> Result<u64, BlockchainError> {
        let candidates = transactions.to_vec();
        let difficulty = self.config.difficulty;

        let nonce = tokio::task::spawn_blocking(move || find_nonce(&previous_hash, &candidates, difficulty))
            .await
            .map_err(|err| {
                error!("Proof of work worker failed: {}", err);
                BlockchainError::WorkerError(err.to_string())
            })??;

        Ok(nonce)
    }

    /// Balance of `address`, replayed over every sealed transaction
    pub fn balance_of(&self, address: &str) -> f64 {
        let chain = self.chain.read();

        chain
            .blocks
            .iter()
            .flat_map(|block| block.transactions.iter())
            .map(|transaction| transaction.flow_for(address))
            .fold(0.0, |balance, flow| balance + flow)
    }

    /// Gets a snapshot of the entire blockchain
    pub fn get_chain(&self) -> Vec<Block> {
        self.chain.read().blocks.clone()
    }

    /// Gets a snapshot of the pending transactions
    pub fn get_pending_transactions(&self) -> Vec<Transaction> {
        self.pool.copy_pool()
    }

    /// Hash of the newest block
    pub fn last_hash(&self) -> BlockHash {
        self.chain.read().last_hash
    }

    /// Number of blocks, genesis included
    pub fn len(&self) -> usize {
        self.chain.read().blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.read().blocks.is_empty()
    }

    pub fn owner_address(&self) -> &str {
        &self.owner_address
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Checks hash linkage and proof of work of every block after genesis
    pub fn is_valid(&self) -> bool {
        let chain = self.chain.read();

        for pair in chain.blocks.windows(2) {
            let (previous_block, current_block) = (&pair[0], &pair[1]);

            match (previous_block.hash(), current_block.hash()) {
                (Ok(previous_hash), Ok(current_hash)) => {
                    if current_block.previous_hash != previous_hash {
                        return false;
                    }
                    if !current_hash.meets_difficulty(self.config.difficulty) {
                        return false;
                    }
                }
                _ => return false,
            }
        }

        true
    }
}
