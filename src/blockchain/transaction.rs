use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use utoipa::ToSchema;

use super::crypto::{verify, CryptoError, PublicKey, TransactionSignature};

/// Sender identity used for mining reward transactions
pub const MINING_SENDER: &str = "BLOCKCHAIN";

/// Errors that can occur during transaction operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    CryptoError(#[from] CryptoError),
}

/// Represents a value transfer between two addresses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Sender's address
    pub sender_address: String,

    /// Recipient's address
    pub recipient_address: String,

    /// Amount being transferred
    pub value: f64,
}

/// Where a transaction entering the pool comes from
#[derive(Debug, Clone)]
pub enum TransactionOrigin {
    /// Mining reward minted by the ledger itself; needs no signature
    Reward,

    /// Transfer submitted by a key holder
    UserSigned {
        public_key: PublicKey,
        signature: TransactionSignature,
    },
}

impl Transaction {
    /// Creates a new transaction
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, value: f64) -> Self {
        Transaction {
            sender_address: sender.into(),
            recipient_address: recipient.into(),
            value,
        }
    }

    /// Creates the mining reward transaction paying `recipient`
    pub fn new_reward(recipient: impl Into<String>, value: f64) -> Self {
        Transaction::new(MINING_SENDER, recipient, value)
    }

    /// Canonical serialization used for signing and hashing.
    ///
    /// Fields are emitted in declaration order, so two transactions with the
    /// same fields always produce the same bytes.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// SHA-256 digest of the canonical serialization
    pub fn digest(&self) -> Result<[u8; 32], TransactionError> {
        let bytes = self.canonical_bytes()?;
        Ok(Sha256::digest(bytes).into())
    }

    /// Checks that `origin` authorizes this transaction
    pub fn verify_origin(&self, origin: &TransactionOrigin) -> Result<(), TransactionError> {
        match origin {
            TransactionOrigin::Reward => Ok(()),
            TransactionOrigin::UserSigned {
                public_key,
                signature,
            } => {
                let digest = self.digest()?;
                if verify(public_key, signature, &digest) {
                    Ok(())
                } else {
                    Err(TransactionError::InvalidSignature)
                }
            }
        }
    }

    /// Signed contribution of this transaction to the balance of `address`
    pub fn flow_for(&self, address: &str) -> f64 {
        let mut flow = 0.0;
        if self.recipient_address == address {
            flow += self.value;
        }
        if self.sender_address == address {
            flow -= self.value;
        }
        flow
    }
}
