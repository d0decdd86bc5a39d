//! Credential hashing for the password reset utility.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$m=65536,t=3,p=1$...`), the
//! format stored in `users.password_hash`.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

/// Memory cost in KiB (64 MiB).
const MEMORY_COST_KIB: u32 = 65_536;
const ITERATIONS: u32 = 3;
const PARALLELISM: u32 = 1;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Supplied hash is not a valid PHC string: {0}")]
    InvalidHash(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),
}

/// New credential as supplied by the operator.
#[derive(Clone)]
pub enum NewCredential {
    /// Secret to hash before storing.
    Plaintext(String),
    /// Already-computed PHC hash, stored as is.
    Hash(String),
}

impl std::fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plaintext(_) => f.write_str("Plaintext(<redacted>)"),
            Self::Hash(hash) => f.debug_tuple("Hash").field(hash).finish(),
        }
    }
}

/// Credential ready to be written: the hash, plus the plaintext it came from
/// when known.
#[derive(Clone)]
pub struct PreparedCredential {
    pub hash: String,
    pub plaintext: Option<String>,
}

impl NewCredential {
    pub fn prepare(self) -> Result<PreparedCredential, CredentialError> {
        match self {
            Self::Plaintext(password) => {
                let hash = hash_password(&password)?;
                Ok(PreparedCredential {
                    hash,
                    plaintext: Some(password),
                })
            }
            Self::Hash(hash) => {
                let hash = hash.trim().to_string();
                PasswordHash::new(&hash)
                    .map_err(|e| CredentialError::InvalidHash(e.to_string()))?;
                Ok(PreparedCredential {
                    hash,
                    plaintext: None,
                })
            }
        }
    }
}

fn hasher() -> Result<Argon2<'static>, CredentialError> {
    let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|e| CredentialError::Hashing(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    if password.is_empty() {
        return Err(CredentialError::EmptyPassword);
    }

    let salt = SaltString::generate(&mut OsRng);
    let phc = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredentialError::Hashing(e.to_string()))?;
    Ok(phc.to_string())
}

/// Check a plaintext password against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    let Ok(argon2) = hasher() else {
        return false;
    };
    argon2.verify_password(password.as_bytes(), &parsed).is_ok()
}
