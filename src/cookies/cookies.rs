//! Cookie core types.
//!
//! This module defines the **type-erased handle** used by the [`CookieStore`]
//! and the serializable [`CookieEntry`] record kept by in-memory jars.
//!
//! # Concurrency model
//! - [`DocumentJarHandle`] is `Arc<dyn DocumentJar>`.
//!   - Jars are expected to manage their **own internal synchronization**. The
//!     trait methods take `&self`, mirroring a host that serializes each single
//!     read or write of its cookie string.
//!   - Sequences of calls (such as `clear`, which enumerates keys and then
//!     removes them one by one) are **not** atomic. Another writer may add or
//!     drop entries in between.
//!
//! The [`CookieEntry`] struct is used for persistence/inspection and can be
//! (de)serialized via `serde` to JSON.
//!
//! ```rust,no_run
//! use gosub_cookies::cookies::CookieEntry;
//!
//! let c = CookieEntry {
//!     name: "session".into(),
//!     value: "%22abc123%22".into(), // percent-encoded JSON
//!     path: Some("/".into()),
//!     domain: Some("example.com".into()),
//!     secure: true,
//!     expires: None,                 // session cookie
//! };
//! ```
//!
//! [`CookieStore`]: crate::cookies::CookieStore

use crate::cookies::DocumentJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;

/// A handle to a document cookie jar.
///
/// This is a reference-counted pointer to a type-erased [`DocumentJar`].
/// Jar implementations must be **`Send + Sync` and internally synchronized**,
/// since callers hold only `&self` when invoking trait methods.
pub type DocumentJarHandle = Arc<dyn DocumentJar>;

/// A cookie as recorded by an in-memory jar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieEntry {
    /// Cookie name (case-sensitive, opaque).
    pub name: String,

    /// Raw cookie value exactly as written (still percent-encoded).
    pub value: String,

    /// Path scoping (e.g., `"/"`), if the descriptor carried one.
    pub path: Option<String>,

    /// Domain scoping, if the descriptor carried one.
    pub domain: Option<String>,

    /// If `true`, the cookie was flagged `secure`.
    pub secure: bool,

    /// Expiration timestamp. Session cookies have `None`.
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,
}

impl CookieEntry {
    /// Returns `true` once `now` has reached the entry's expiry.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        matches!(self.expires, Some(at) if at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn entry(expires: Option<OffsetDateTime>) -> CookieEntry {
        CookieEntry {
            name: "a".into(),
            value: "1".into(),
            path: None,
            domain: None,
            secure: false,
            expires,
        }
    }

    #[test]
    fn session_entries_never_expire() {
        assert!(!entry(None).is_expired(OffsetDateTime::now_utc()));
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = OffsetDateTime::now_utc();
        assert!(entry(Some(now)).is_expired(now));
        assert!(entry(Some(now - Duration::seconds(1))).is_expired(now));
        assert!(!entry(Some(now + Duration::seconds(1))).is_expired(now));
    }

    #[test]
    fn entry_survives_json() {
        let at = time::macros::datetime!(2030-01-02 03:04:05 UTC);
        let e = entry(Some(at));
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("2030-01-02T03:04:05Z"));
        let back: CookieEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
