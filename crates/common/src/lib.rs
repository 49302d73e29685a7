//! Types shared by the charge monitor crates

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
