//! Cache module for Redis-backed refresh token storage

pub mod redis_client;
pub mod redis_token_repository;

pub use redis_client::RedisClient;
pub use redis_token_repository::RedisTokenRepository;

// Re-export commonly used types
pub use acct_shared::config::CacheConfig;
