//! Tesla OAuth authentication library
//!
//! Provides PKCE generation, authorization URL construction, authorization
//! code exchange, and the in-memory credential store for the charge monitor.
//! The crate has no dependency on the HTTP service and can be tested on its
//! own.
//!
//! Credential flow:
//! 1. Service calls `pkce::generate_verifier()` + `pkce::compute_challenge()`
//! 2. User authorizes via `pkce::build_authorization_url()`
//! 3. Service calls `token::exchange_code()` with the returned code
//! 4. Credential stored via `credentials::CredentialStore::save()`

pub mod constants;
pub mod credentials;
pub mod error;
pub mod pkce;
pub mod settings;
pub mod token;

pub use constants::*;
pub use credentials::{Credential, CredentialStore, unix_millis};
pub use error::{Error, Result};
pub use pkce::{build_authorization_url, compute_challenge, generate_state, generate_verifier};
pub use settings::OAuthSettings;
pub use token::{TokenResponse, exchange_code};
