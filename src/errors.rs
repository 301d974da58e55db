//! Error surface of the registry.
//!
//! The core hub never fails: absence of a value is signaled with `None`, a
//! removal of a missing key is a no-op. Errors exist only at the adapter
//! boundary (property-style removal of an absent key) and during
//! configuration loading.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Property-style removal of a key with no live value
    #[error("key '{0}' is not present")]
    KeyNotFound(String),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),
}
