pub mod health;

pub use api_test::*;
pub use health::*;
