//! Accounts domain - stored user credentials
//!
//! Responsibilities:
//! - Looking up accounts by their unique email identifier
//! - Overwriting a credential hash in place (operator password reset)

pub mod actions;
pub mod models;

pub use actions::{reset_password, ResetOutcome, ResetRequest};
pub use models::Account;
