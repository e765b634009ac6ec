//! Token issuance and bearer-token authentication.

pub mod extractor;
pub mod token;

pub use extractor::AuthUser;
pub use token::{Claims, TokenService};
