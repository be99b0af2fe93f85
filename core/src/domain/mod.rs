//! Domain layer containing the credential entities.

pub mod entities;

pub use entities::*;
