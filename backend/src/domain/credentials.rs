//! Credential identifier derivation and credential digests.
//!
//! Two independent one-way functions run over the same raw secret:
//!
//! - a fast, deterministic SHA-256 based derivation producing the
//!   [`AccountIdentifier`] that keys the ledger account, and
//! - a slow, salted Argon2id digest stored for later verification.
//!
//! Neither reuses the other's intermediate state.

use std::fmt;
use std::sync::Arc;

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use super::AccountIdentifier;

/// Derive the ledger identifier for a username/password pair.
///
/// The identifier is the first eight bytes, read big-endian, of
/// `SHA-256(username ":" password)`.
///
/// # Examples
/// ```
/// use karma_backend::domain::derive_identifier;
///
/// let first = derive_identifier("bob", "s3cr3t");
/// let second = derive_identifier("bob", "s3cr3t");
/// assert_eq!(first, second);
/// ```
#[must_use]
pub fn derive_identifier(username: &str, password: &str) -> AccountIdentifier {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0_u8; 8];
    for (slot, byte) in prefix.iter_mut().zip(digest.iter()) {
        *slot = *byte;
    }
    AccountIdentifier::new(u64::from_be_bytes(prefix))
}

/// Stored one-way credential digest in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialDigest(String);

impl CredentialDigest {
    /// Wrap a digest previously produced by a [`CredentialDigester`].
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// PHC string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CredentialDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialDigest(<redacted>)")
    }
}

/// Failure raised while creating or checking a credential digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("credential digest failed: {message}")]
pub struct CredentialDigestError {
    message: String,
}

impl CredentialDigestError {
    /// Build an error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Human-readable cause.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Slow, salted password hashing used for stored credentials.
pub trait CredentialDigester: Send + Sync {
    /// Produce a fresh digest for `password`; repeated calls differ by salt.
    fn digest(&self, password: &str) -> Result<CredentialDigest, CredentialDigestError>;

    /// Check `password` against a stored digest.
    ///
    /// Returns `Ok(false)` for a mismatch and an error only when the digest
    /// itself cannot be parsed or evaluated.
    fn verify(
        &self,
        digest: &CredentialDigest,
        password: &str,
    ) -> Result<bool, CredentialDigestError>;
}

/// Argon2id digester producing PHC strings.
#[derive(Debug, Clone)]
pub struct Argon2Digester {
    params: Params,
}

impl Default for Argon2Digester {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl Argon2Digester {
    /// Digester using the given Argon2 cost parameters.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl CredentialDigester for Argon2Digester {
    fn digest(&self, password: &str) -> Result<CredentialDigest, CredentialDigestError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| CredentialDigestError::new(err.to_string()))?;
        Ok(CredentialDigest::new(hash.to_string()))
    }

    fn verify(
        &self,
        digest: &CredentialDigest,
        password: &str,
    ) -> Result<bool, CredentialDigestError> {
        let parsed = PasswordHash::new(digest.as_str())
            .map_err(|err| CredentialDigestError::new(err.to_string()))?;
        match self.hasher().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialDigestError::new(err.to_string())),
        }
    }
}

/// Output of [`CredentialDeriver::derive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedCredentials {
    /// Deterministic ledger key.
    pub identifier: AccountIdentifier,
    /// Salted digest for storage.
    pub digest: CredentialDigest,
}

/// Pairs identifier derivation with a credential digester.
#[derive(Clone)]
pub struct CredentialDeriver {
    digester: Arc<dyn CredentialDigester>,
}

impl CredentialDeriver {
    /// Build a deriver around the supplied digester.
    pub fn new(digester: Arc<dyn CredentialDigester>) -> Self {
        Self { digester }
    }

    /// Derive the identifier and a fresh digest for a credential pair.
    pub fn derive(
        &self,
        username: &str,
        password: &str,
    ) -> Result<DerivedCredentials, CredentialDigestError> {
        Ok(DerivedCredentials {
            identifier: derive_identifier(username, password),
            digest: self.digester.digest(password)?,
        })
    }

    /// Verify a password against a stored digest.
    pub fn verify(
        &self,
        digest: &CredentialDigest,
        password: &str,
    ) -> Result<bool, CredentialDigestError> {
        self.digester.verify(digest, password)
    }
}

impl fmt::Debug for CredentialDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialDeriver").finish_non_exhaustive()
    }
}

/// Deriver with minimal Argon2 cost so unit tests stay fast.
#[cfg(test)]
pub(crate) fn test_deriver() -> CredentialDeriver {
    let params = Params::new(Params::MIN_M_COST, 1, 1, None).expect("valid test params");
    CredentialDeriver::new(Arc::new(Argon2Digester::with_params(params)))
}
