use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

/// Number of hex characters used to encode one 256-bit integer
pub const SCALAR_HEX_LEN: usize = 64;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Failed to sign message: {0}")]
    SigningError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// Splits a fixed-width hex string into two 32-byte big-endian integers
fn decode_pair(s: &str) -> Result<([u8; 32], [u8; 32]), CryptoError> {
    if s.len() != 2 * SCALAR_HEX_LEN {
        return Err(CryptoError::DecodingError(format!(
            "expected {} hex characters, got {}",
            2 * SCALAR_HEX_LEN,
            s.len()
        )));
    }
    if !s.is_ascii() {
        return Err(CryptoError::DecodingError("non-ascii input".to_string()));
    }

    let mut first = [0u8; 32];
    let mut second = [0u8; 32];
    hex::decode_to_slice(&s[..SCALAR_HEX_LEN], &mut first)
        .map_err(|e| CryptoError::DecodingError(e.to_string()))?;
    hex::decode_to_slice(&s[SCALAR_HEX_LEN..], &mut second)
        .map_err(|e| CryptoError::DecodingError(e.to_string()))?;

    Ok((first, second))
}

/// An ECDSA signature made of the two integers r and s.
///
/// The text form is `r` followed by `s`, each as 64 zero-padded lowercase hex
/// characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSignature(Signature);

impl TransactionSignature {
    /// Builds a signature from the big-endian bytes of r and s
    pub fn from_scalars(r: [u8; 32], s: [u8; 32]) -> Result<Self, CryptoError> {
        Signature::from_scalars(r, s)
            .map(TransactionSignature)
            .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }

    /// Returns the big-endian bytes of r
    pub fn r(&self) -> [u8; 32] {
        self.0.split_bytes().0.into()
    }

    /// Returns the big-endian bytes of s
    pub fn s(&self) -> [u8; 32] {
        self.0.split_bytes().1.into()
    }

    /// Encodes the signature as a 128 character hex string
    pub fn to_hex(&self) -> String {
        format!("{}{}", hex::encode(self.r()), hex::encode(self.s()))
    }

    /// Decodes a signature from its 128 character hex form
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let (r, s) = decode_pair(s)?;
        Self::from_scalars(r, s)
    }

    pub(crate) fn inner(&self) -> &Signature {
        &self.0
    }
}

impl From<Signature> for TransactionSignature {
    fn from(signature: Signature) -> Self {
        TransactionSignature(signature)
    }
}

impl fmt::Display for TransactionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for TransactionSignature {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for TransactionSignature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TransactionSignature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A P-256 public key, carried on the wire as the hex of x followed by y
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Returns the affine coordinates x and y as big-endian bytes
    pub fn coordinates(&self) -> ([u8; 32], [u8; 32]) {
        let point = self.0.as_affine().to_encoded_point(false);
        let bytes = point.as_bytes();

        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        // Uncompressed SEC1 layout: 0x04 || x || y
        x.copy_from_slice(&bytes[1..33]);
        y.copy_from_slice(&bytes[33..65]);
        (x, y)
    }

    /// Encodes the key as a 128 character hex string
    pub fn to_hex(&self) -> String {
        let (x, y) = self.coordinates();
        format!("{}{}", hex::encode(x), hex::encode(y))
    }

    /// Decodes a key from the hex of its x and y coordinates
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let (x, y) = decode_pair(s)?;

        let mut sec1 = Vec::with_capacity(65);
        sec1.push(0x04);
        sec1.extend_from_slice(&x);
        sec1.extend_from_slice(&y);

        VerifyingKey::from_sec1_bytes(&sec1)
            .map(PublicKey)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        PublicKey(key)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Verifies a signature over an already computed digest
pub fn verify(public_key: &PublicKey, signature: &TransactionSignature, digest: &[u8]) -> bool {
    public_key
        .0
        .verify_prehash(digest, signature.inner())
        .is_ok()
}
