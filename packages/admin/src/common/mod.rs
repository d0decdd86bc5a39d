// Common types and utilities shared across the admin tools

pub mod password;

pub use password::{
    hash_password, verify_password, CredentialError, NewCredential, PreparedCredential,
};
