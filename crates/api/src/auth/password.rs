//! Argon2id password hashing and verification.
//!
//! All password hashes use the Argon2id variant with a cryptographically random
//! salt generated via [`OsRng`]. The PHC string format is used for storage so
//! that algorithm parameters and salt are embedded in the hash itself, which
//! also means any [`Argon2Verifier`] can verify a hash produced with different
//! cost parameters.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

/// Error from hashing or from parsing a stored hash.
pub type PasswordError = argon2::password_hash::Error;

/// One-way hash/verify capability over plaintext secrets.
///
/// Injected into the session manager and account handlers so tests can run
/// with cheap parameters.
pub trait PasswordVerifier: Send + Sync {
    /// Hash a plaintext password into a self-describing stored form.
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// Check a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` for a wrong password; `Err` only when the stored
    /// hash itself is unusable.
    fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool, PasswordError>;
}

/// [`PasswordVerifier`] backed by Argon2id.
#[derive(Clone, Default)]
pub struct Argon2Verifier {
    argon2: Argon2<'static>,
}

impl Argon2Verifier {
    /// Argon2id with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl PasswordVerifier for Argon2Verifier {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(plaintext.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(stored_hash)?;
        match self.argon2.verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Verifier {
        Argon2Verifier::with_params(Params::new(8, 1, 1, None).unwrap())
    }

    #[test]
    fn test_hash_and_verify() {
        let verifier = cheap();
        let password = "correct-horse-battery-staple";
        let hash = verifier.hash(password).expect("hashing should succeed");

        // The hash must be a valid PHC string starting with the argon2id identifier.
        assert!(
            hash.starts_with("$argon2id$"),
            "expected argon2id PHC prefix"
        );

        let verified = verifier.verify(password, &hash).expect("verify should succeed");
        assert!(verified, "correct password should verify as true");
    }

    #[test]
    fn test_wrong_password_fails() {
        let verifier = cheap();
        let hash = verifier.hash("real-password").expect("hashing should succeed");
        let verified = verifier
            .verify("wrong-password", &hash)
            .expect("verify should succeed");
        assert!(!verified, "wrong password should verify as false");
    }

    #[test]
    fn test_hashes_are_salted() {
        let verifier = cheap();
        let a = verifier.hash("same-password").unwrap();
        let b = verifier.hash("same-password").unwrap();
        assert_ne!(a, b, "two hashes of one password must use different salts");
    }

    #[test]
    fn test_default_params_verify_cheap_hash() {
        let hash = cheap().hash("portable").unwrap();
        assert!(Argon2Verifier::default().verify("portable", &hash).unwrap());
    }

    #[test]
    fn test_corrupt_hash_is_an_error() {
        assert!(cheap().verify("anything", "not-a-phc-string").is_err());
    }
}
