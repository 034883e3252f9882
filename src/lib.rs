//! JSON-valued document cookies.
//!
//! [`CookieStore`] reads, writes and deletes cookies whose values are stored as
//! percent-encoded JSON in a document cookie jar. The jar itself sits behind the
//! [`DocumentJar`](cookies::DocumentJar) trait: an in-memory jar, a JSON-file
//! backed jar, or (on `wasm32`) the page's `document.cookie`.
pub mod config;
pub mod cookies;
pub mod errors;

pub use config::{CookieStoreConfig, CookieStoreConfigBuilder, CookieStoreConfigError};
pub use cookies::{CookieOptions, CookieStore, Expires, Lookup};
pub use errors::CookieError;
