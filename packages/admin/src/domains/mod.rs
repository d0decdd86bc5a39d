pub mod accounts;
pub mod schema;
