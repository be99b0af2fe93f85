#[path = "trait.rs"]
mod trait_;

pub use trait_::TokenRepository;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockTokenRepository;

#[cfg(test)]
mod tests;
