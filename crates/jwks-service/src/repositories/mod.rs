pub mod signing_keys;

pub use signing_keys::KeyStore;
