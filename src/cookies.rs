// src/cookies.rs
//! Cookies: [`CookieStore`], [`DocumentJar`] and jar backends.

mod cookies;
mod cookie_store;
mod descriptor;
mod document_jar;
mod persistent_document_jar;

#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use cookies::CookieEntry;
pub use cookies::DocumentJarHandle;

pub use cookie_store::CookieMap;
pub use cookie_store::CookieStore;
pub use cookie_store::Lookup;

pub use descriptor::{decode_value, encode_value, format_http_date, parse_http_date};
pub use descriptor::{CookieOptions, Expires};

pub use document_jar::DocumentJar;
pub use document_jar::InMemoryDocumentJar;
pub use persistent_document_jar::PersistentDocumentJar;
