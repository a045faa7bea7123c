//! # learnhub_core
//!
//! Authentication core for LearnHub: compact HS256 tokens, password
//! hashing, role resolution and the datastore contract behind them.

pub mod auth;
pub mod migrate;
pub mod models;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
