//! Pluggable password hashing schemes.
//!
//! A store implementation selects its hash algorithm by injection instead of
//! branching on store identity: the reference store uses bcrypt, while
//! deployments that must interoperate with a pre-existing external system's
//! salted-SHA-256 records use [`LegacySha256Scheme`].

use sha2::{Digest, Sha256};

use crate::auth::error::AuthError;
use crate::common::id_generator::generate_raw_id;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// One-way password hashing strategy.
pub trait PasswordScheme: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Adaptive bcrypt hashing (cost 10). The default scheme.
#[derive(Debug, Default, Clone, Copy)]
pub struct BcryptScheme;

impl PasswordScheme for BcryptScheme {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| AuthError::Store(format!("bcrypt hash: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        bcrypt::verify(password, hash)
            .map_err(|e| AuthError::Store(format!("bcrypt verify: {}", e)))
    }
}

/// Legacy salted SHA-256 in `salt$hexdigest` format.
///
/// Interoperates with records written by the external system this plugin
/// replaces. New deployments should prefer [`BcryptScheme`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacySha256Scheme;

impl LegacySha256Scheme {
    fn digest(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        let out = hasher.finalize();
        out.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl PasswordScheme for LegacySha256Scheme {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = generate_raw_id(16);
        Ok(format!("{}${}", salt, Self::digest(&salt, password)))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let Some((salt, digest)) = hash.split_once('$') else {
            // Unrecognized record shape is a mismatch, not a store failure
            return Ok(false);
        };
        Ok(Self::digest(salt, password) == digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_round_trip() {
        let scheme = BcryptScheme;
        let hash = scheme.hash("secret123").unwrap();
        assert_ne!(hash, "secret123");
        assert!(scheme.verify("secret123", &hash).unwrap());
        assert!(!scheme.verify("secret124", &hash).unwrap());
    }

    #[test]
    fn test_legacy_round_trip() {
        let scheme = LegacySha256Scheme;
        let hash = scheme.hash("secret123").unwrap();
        assert!(hash.contains('$'));
        assert!(scheme.verify("secret123", &hash).unwrap());
        assert!(!scheme.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn test_legacy_known_record() {
        // Record produced by the external system: fixed salt "abc"
        let scheme = LegacySha256Scheme;
        let digest = LegacySha256Scheme::digest("abc", "hunter2");
        let record = format!("abc${}", digest);
        assert!(scheme.verify("hunter2", &record).unwrap());
    }

    #[test]
    fn test_legacy_malformed_hash_is_mismatch() {
        let scheme = LegacySha256Scheme;
        assert!(!scheme.verify("anything", "no-dollar-sign").unwrap());
    }

    #[test]
    fn test_bcrypt_hashes_are_salted() {
        let scheme = BcryptScheme;
        let a = scheme.hash("same").unwrap();
        let b = scheme.hash("same").unwrap();
        assert_ne!(a, b);
    }
}
