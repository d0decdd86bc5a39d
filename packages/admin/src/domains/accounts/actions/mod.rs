//! Account actions - business logic functions called from the admin binaries

mod reset_password;

pub use reset_password::{reset_password, ResetOutcome, ResetRequest};
