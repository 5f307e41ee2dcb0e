// Key management
//
// A wallet owns a P-256 key pair and derives its address with the
// Bitcoin-style pipeline: base58(0x00 || RIPEMD-160(SHA-256(x || y)) || checksum).

use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey};
use rand::rngs::OsRng;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use std::fmt;

use crate::blockchain::crypto::{CryptoError, PublicKey, TransactionSignature};
use crate::blockchain::transaction::{Transaction, TransactionError};

/// Version byte prepended to the public key hash (main network)
const ADDRESS_VERSION: u8 = 0x00;

/// Derives the address of a public key
pub fn derive_address(public_key: &PublicKey) -> String {
    let (x, y) = public_key.coordinates();

    let mut sha = Sha256::new();
    sha.update(x);
    sha.update(y);
    let key_hash = Ripemd160::digest(sha.finalize());

    let mut payload = Vec::with_capacity(25);
    payload.push(ADDRESS_VERSION);
    payload.extend_from_slice(&key_hash);

    let checksum = Sha256::digest(Sha256::digest(&payload));
    payload.extend_from_slice(&checksum[..4]);

    bs58::encode(payload).into_string()
}

/// Represents a wallet with a keypair
#[derive(Clone)]
pub struct Wallet {
    signing_key: SigningKey,
    public_key: PublicKey,
    address: String,
}

impl Wallet {
    /// Creates a new wallet with a random keypair
    pub fn new() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Restores a wallet from the hex of its private key
    pub fn from_private_key_hex(private_key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(private_key)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = PublicKey::from(signing_key.verifying_key().clone());
        let address = derive_address(&public_key);

        Wallet {
            signing_key,
            public_key,
            address,
        }
    }

    /// Gets the wallet's address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Gets the wallet's public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        self.public_key.to_hex()
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Signs the digest of a transaction
    pub fn sign(&self, transaction: &Transaction) -> Result<TransactionSignature, TransactionError> {
        let digest = transaction.digest()?;
        let signature: Signature = self
            .signing_key
            .sign_prehash(&digest)
            .map_err(|e| CryptoError::SigningError(e.to_string()))?;

        Ok(signature.into())
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
