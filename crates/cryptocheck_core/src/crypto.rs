//! Crypto adapter seam.
//!
//! The verification engine never touches a signature scheme directly. It asks
//! a [`CryptoAdapter`] for a key pair derived from an [`AccountSeed`] and for a
//! yes/no verdict on `(public key, signature, message)`.

use crate::derive::AccountSeed;
use crate::error::CoreResult;
use cryptocheck_codec::Signature;
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a public key in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of a secret key in bytes.
pub const SECRET_KEY_SIZE: usize = 32;

/// A 32-byte public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    /// Wraps raw key bytes.
    pub const fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub const fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Hex encoding of the key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Secret key material. Wiped on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; SECRET_KEY_SIZE]);

impl SecretKey {
    /// Wraps raw key bytes.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Key pair produced by an adapter.
///
/// Lives only for the duration of one record's verification.
#[derive(Debug, Clone)]
pub struct KeyPair {
    public_key: PublicKey,
    secret_key: SecretKey,
}

impl KeyPair {
    /// Creates a key pair from its parts.
    pub fn new(public_key: PublicKey, secret_key: SecretKey) -> Self {
        Self {
            public_key,
            secret_key,
        }
    }

    /// The public half.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The secret half.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

/// Signature scheme used to check a corpus.
///
/// Implementations must be pure: the same inputs always give the same key
/// pair and the same verdict. Both calls are expected to be fast and
/// CPU-bound since they run on the worker threads.
pub trait CryptoAdapter: Send + Sync {
    /// Derives the key pair for an account seed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::KeyDerivationFailed`] if the seed cannot be turned
    /// into a key pair.
    fn derive_key_pair(&self, seed: &AccountSeed) -> CoreResult<KeyPair>;

    /// Returns `true` if `signature` is valid for `message` under `public_key`.
    fn verify(&self, public_key: &PublicKey, signature: &Signature, message: &[u8]) -> bool;
}

/// Ed25519 adapter.
///
/// The account seed is used directly as the 32-byte Ed25519 secret seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Adapter;

impl Ed25519Adapter {
    /// Creates the adapter.
    pub fn new() -> Self {
        Self
    }

    /// Signs `message` with `key_pair`.
    ///
    /// Verification never needs this; corpus fixtures do.
    pub fn sign(&self, key_pair: &KeyPair, message: &[u8]) -> Signature {
        let signing_key = SigningKey::from_bytes(key_pair.secret_key().as_bytes());
        Signature::from_bytes(signing_key.sign(message).to_bytes())
    }
}

impl CryptoAdapter for Ed25519Adapter {
    fn derive_key_pair(&self, seed: &AccountSeed) -> CoreResult<KeyPair> {
        let signing_key = SigningKey::from_bytes(seed.as_bytes());
        let public_key = PublicKey::from_bytes(signing_key.verifying_key().to_bytes());
        Ok(KeyPair::new(public_key, SecretKey::from_bytes(signing_key.to_bytes())))
    }

    fn verify(&self, public_key: &PublicKey, signature: &Signature, message: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        verifying_key.verify(message, &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::account_seed;
    use cryptocheck_codec::GlobalSeed;

    #[test]
    fn key_derivation_is_deterministic() {
        let adapter = Ed25519Adapter::new();
        let seed = account_seed(GlobalSeed::new(5), 17);
        let a = adapter.derive_key_pair(&seed).unwrap();
        let b = adapter.derive_key_pair(&seed).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.secret_key().as_bytes(), seed.as_bytes());
    }

    #[test]
    fn sign_then_verify() {
        let adapter = Ed25519Adapter::new();
        let key_pair = adapter
            .derive_key_pair(&account_seed(GlobalSeed::new(0), 3))
            .unwrap();
        let signature = adapter.sign(&key_pair, b"corpus message");

        assert!(adapter.verify(key_pair.public_key(), &signature, b"corpus message"));
        assert!(!adapter.verify(key_pair.public_key(), &signature, b"corpus messagE"));
        assert!(!adapter.verify(
            key_pair.public_key(),
            &signature.with_flipped_bit(100),
            b"corpus message"
        ));
    }

    #[test]
    fn wrong_key_does_not_verify() {
        let adapter = Ed25519Adapter::new();
        let signer = adapter
            .derive_key_pair(&account_seed(GlobalSeed::new(0), 1))
            .unwrap();
        let other = adapter
            .derive_key_pair(&account_seed(GlobalSeed::new(0), 2))
            .unwrap();
        let signature = adapter.sign(&signer, b"m");
        assert!(!adapter.verify(other.public_key(), &signature, b"m"));
    }

    #[test]
    fn secret_key_is_not_printed() {
        let secret = SecretKey::from_bytes([7u8; 32]);
        assert_eq!(format!("{:?}", secret), "SecretKey(..)");
    }
}
