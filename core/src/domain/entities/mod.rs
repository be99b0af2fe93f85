//! Domain entities representing session credentials.

pub mod token;
pub mod user;

// Re-export commonly used types
pub use token::{Claims, RefreshToken, TokenPair, JWT_AUDIENCE, JWT_ISSUER};
pub use user::UserId;
