//! JWKS Server Library
//!
//! Issues RS256-signed JWTs and publishes the public half of its signing
//! keys as a JSON Web Key Set. Keys are seeded at startup in two classes,
//! one already expired and one valid, so consumers can be tested against
//! both good and expired tokens.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - RSA key generation, JWT signing and verification
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP middleware
//! - `models` - Data models
//! - `observability` - Metrics
//! - `repositories` - Key store (database access layer)
//! - `routes` - Router and shared state
//! - `services` - Key issuer (business logic layer)

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
