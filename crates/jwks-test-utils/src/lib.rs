//! # JWKS Test Utilities
//!
//! Shared test utilities for the JWKS service.
//!
//! This crate provides:
//! - Deterministic RSA fixtures (seeded keys, generated once per test binary)
//! - Database helpers (in-memory and temp-file SQLite pools)
//! - Server test harness (TestJwksServer for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jwks_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let server = TestJwksServer::spawn(memory_pool().await?).await?;
//!
//!     let body: serde_json::Value = reqwest::Client::new()
//!         .post(format!("{}/auth", server.url()))
//!         .send()
//!         .await?
//!         .json()
//!         .await?;
//!
//!     body["token"]
//!         .as_str()
//!         .unwrap()
//!         .assert_valid_jwt()
//!         .assert_not_expired();
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod database;
pub mod server_harness;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use database::*;
pub use server_harness::*;
