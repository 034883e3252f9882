//! Cookie store configuration.
//!
//! `CookieStoreConfig` controls how a [`CookieStore`](crate::cookies::CookieStore)
//! decodes what it reads and which attributes it attaches to what it writes.
//!
//! `CookieStoreConfig` provides sensible defaults via [`Default`] and a fluent
//! [`CookieStoreConfig::builder()`] for customization with validation.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_cookies::CookieStoreConfig;
//! let cfg = CookieStoreConfig::default();
//! assert!(!cfg.strict_decoding);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_cookies::CookieStoreConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = CookieStoreConfig::builder()
//!     .strict_decoding(true)
//!     .default_path("/")
//!     .default_domain("example.com")
//!     .default_secure(true)
//!     .build()?; // returns Result<CookieStoreConfig, CookieStoreConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `strict_decoding`: Propagate decode failures from `get` instead of treating the cookie as absent.
//! - `default_path`: Path attribute used when a write does not specify one.
//! - `default_domain`: Domain attribute used when a write does not specify one.
//! - `default_secure`: Add the `secure` flag to every write.
//!
//! # Errors
//!
//! Builder validation can return [`CookieStoreConfigError`] if values are invalid
//! (e.g. a `default_path` not starting with `/`, or an empty `default_domain`).

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieStoreConfig {
    pub strict_decoding: bool,
    pub default_path: Option<String>,
    pub default_domain: Option<String>,
    pub default_secure: bool,
}

impl CookieStoreConfig {
    pub fn builder() -> CookieStoreConfigBuilder {
        CookieStoreConfigBuilder::default()
    }
}

/// Builder for [`CookieStoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct CookieStoreConfigBuilder {
    inner: CookieStoreConfig,
}

impl CookieStoreConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut CookieStoreConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn strict_decoding(self, on: bool) -> Self { self.map(|c| c.strict_decoding = on) }
    pub fn default_path<S: Into<String>>(self, path: S) -> Self { self.map(|c| c.default_path = Some(path.into())) }
    pub fn default_domain<S: Into<String>>(self, domain: S) -> Self { self.map(|c| c.default_domain = Some(domain.into())) }
    pub fn default_secure(self, on: bool) -> Self { self.map(|c| c.default_secure = on) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut CookieStoreConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<CookieStoreConfig, CookieStoreConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum CookieStoreConfigError {
    RelativePath(String),
    EmptyDomain,
    InvalidDomain(String),
}

impl fmt::Display for CookieStoreConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieStoreConfigError::RelativePath(p) =>
                write!(f, "default_path '{p}' must start with '/'"),
            CookieStoreConfigError::EmptyDomain =>
                write!(f, "default_domain must not be empty"),
            CookieStoreConfigError::InvalidDomain(d) =>
                write!(f, "default_domain '{d}' must not contain ';'"),
        }
    }
}
impl std::error::Error for CookieStoreConfigError {}

fn validate(c: &CookieStoreConfig) -> Result<(), CookieStoreConfigError> {
    if let Some(path) = &c.default_path {
        if !path.starts_with('/') {
            return Err(CookieStoreConfigError::RelativePath(path.clone()));
        }
    }
    if let Some(domain) = &c.default_domain {
        if domain.is_empty() {
            return Err(CookieStoreConfigError::EmptyDomain);
        }
        if domain.contains(';') {
            return Err(CookieStoreConfigError::InvalidDomain(domain.clone()));
        }
    }
    Ok(())
}
