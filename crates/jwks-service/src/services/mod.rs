pub mod key_issuer;

pub use key_issuer::KeyIssuer;
