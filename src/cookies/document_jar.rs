//! Document cookie jar abstraction and a simple in-memory implementation.
//!
//! A **document jar** is the host-owned cookie string of a single document
//! (what a page sees through `document.cookie`). It is read as a whole and
//! written one descriptor at a time; the host decides how a descriptor merges
//! into the existing string.
//!
//! This module defines the [`DocumentJar`] trait and a reference implementation,
//! [`InMemoryDocumentJar`], which emulates the host's merge rules **in memory
//! only** (no persistence).
//!
//! ## Notes & limitations
//! - Entries are identified by **name only**. A real host keys cookies by
//!   name, domain and path; the in-memory jar models a single document whose
//!   URL matches every scope, so the attributes are recorded but not used for
//!   matching.
//! - `expires` is honored: a descriptor whose expiry is not in the future
//!   evicts the entry, and entries that expire later disappear from reads.
//!   `max-age`, `samesite` and `httponly` are ignored.
use std::any::Any;
use std::sync::{PoisonError, RwLock};

use crate::cookies::descriptor::parse_http_date;
use crate::cookies::CookieEntry;
use crate::errors::CookieError;
use time::OffsetDateTime;

/// Access to the cookie string of one document.
///
/// Implementations must be internally synchronized: both methods take `&self`.
pub trait DocumentJar: Send + Sync {
    /// Returns a type-erased reference to the jar.
    fn as_any(&self) -> &dyn Any;

    /// Returns the full jar contents formatted as `key1=value1; key2=value2`.
    ///
    /// An empty jar yields an empty string.
    fn cookie_string(&self) -> Result<String, CookieError>;

    /// Assigns a single descriptor (`key=value; attr; attr=...`) to the jar.
    ///
    /// The jar creates, overwrites or evicts the named entry according to its
    /// own rules.
    fn write_entry(&self, descriptor: &str) -> Result<(), CookieError>;
}

/// In-memory document jar.
///
/// Entries keep their insertion order; overwriting an existing name keeps its
/// position, as browsers do.
#[derive(Debug, Default)]
pub struct InMemoryDocumentJar {
    entries: RwLock<Vec<CookieEntry>>,
}

impl InMemoryDocumentJar {
    /// Creates an empty in-memory jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a jar pre-populated with `entries`.
    pub fn from_entries(entries: Vec<CookieEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Returns a snapshot of all live (unexpired) entries.
    pub fn entries(&self) -> Vec<CookieEntry> {
        let now = OffsetDateTime::now_utc();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| !c.is_expired(now))
            .cloned()
            .collect()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl DocumentJar for InMemoryDocumentJar {
    fn as_any(&self) -> &dyn Any { self }

    fn cookie_string(&self) -> Result<String, CookieError> {
        Ok(self
            .entries()
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; "))
    }

    fn write_entry(&self, descriptor: &str) -> Result<(), CookieError> {
        let cookie = parse_descriptor(descriptor)?;
        let now = OffsetDateTime::now_utc();

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|c| !c.is_expired(now));

        if cookie.is_expired(now) {
            entries.retain(|c| c.name != cookie.name);
            return Ok(());
        }

        // Replace existing cookie with same name
        if let Some(existing) = entries.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            entries.push(cookie);
        }
        Ok(())
    }
}

/// Parses a descriptor into an entry.
///
/// Unknown attributes are ignored. An unparseable `expires` is ignored too,
/// which leaves a session cookie.
fn parse_descriptor(descriptor: &str) -> Result<CookieEntry, CookieError> {
    let mut parts = descriptor.split(';');
    let pair = parts.next().unwrap_or_default();
    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| CookieError::MalformedDescriptor(descriptor.to_string()))?;

    let mut cookie = CookieEntry {
        name: name.trim().to_string(),
        value: value.trim().to_string(),
        path: None,
        domain: None,
        secure: false,
        expires: None,
    };

    for part in parts {
        let part = part.trim();
        if let Some((k, v)) = part.split_once('=') {
            match k.trim().to_ascii_lowercase().as_str() {
                "path" => cookie.path = Some(v.trim().to_string()),
                "domain" => cookie.domain = Some(v.trim().trim_start_matches('.').to_string()),
                "expires" => cookie.expires = parse_http_date(v),
                _ => {}
            }
        } else if part.eq_ignore_ascii_case("secure") {
            cookie.secure = true;
        }
    }

    Ok(cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAST: &str = "Thu, 01 Jan 1970 00:00:00 GMT";
    const FUTURE: &str = "Fri, 31 Dec 9999 23:59:59 GMT";

    #[test]
    fn empty_jar_reads_empty_string() {
        let jar = InMemoryDocumentJar::new();
        assert_eq!(jar.cookie_string().unwrap(), "");
    }

    #[test]
    fn writes_append_in_order() {
        let jar = InMemoryDocumentJar::new();
        jar.write_entry("my_cookie=5").unwrap();
        jar.write_entry("one=1").unwrap();
        jar.write_entry("two=2").unwrap();
        assert_eq!(jar.cookie_string().unwrap(), "my_cookie=5; one=1; two=2");
    }

    #[test]
    fn overwrite_keeps_position() {
        let jar = InMemoryDocumentJar::new();
        jar.write_entry("a=1").unwrap();
        jar.write_entry("b=2").unwrap();
        jar.write_entry("a=3; path=/").unwrap();
        assert_eq!(jar.cookie_string().unwrap(), "a=3; b=2");
    }

    #[test]
    fn past_expiry_evicts() {
        let jar = InMemoryDocumentJar::new();
        jar.write_entry("a=1").unwrap();
        jar.write_entry("b=2").unwrap();
        jar.write_entry(&format!("a=%22%22; expires={PAST}")).unwrap();
        assert_eq!(jar.cookie_string().unwrap(), "b=2");

        // evicting a missing entry is a no-op
        jar.write_entry(&format!("zzz=%22%22; expires={PAST}")).unwrap();
        assert_eq!(jar.cookie_string().unwrap(), "b=2");
    }

    #[test]
    fn attributes_are_recorded_not_echoed() {
        let jar = InMemoryDocumentJar::new();
        jar.write_entry(&format!("k=1; expires={FUTURE}; path=/app; Domain=.example.com; Secure"))
            .unwrap();

        assert_eq!(jar.cookie_string().unwrap(), "k=1");

        let entries = jar.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path.as_deref(), Some("/app"));
        assert_eq!(entries[0].domain.as_deref(), Some("example.com"));
        assert!(entries[0].secure);
        assert_eq!(entries[0].expires, parse_http_date(FUTURE));
    }

    #[test]
    fn expired_entries_are_hidden() {
        let jar = InMemoryDocumentJar::from_entries(vec![CookieEntry {
            name: "old".into(),
            value: "1".into(),
            path: None,
            domain: None,
            secure: false,
            expires: parse_http_date(PAST),
        }]);
        assert_eq!(jar.cookie_string().unwrap(), "");
        assert!(jar.entries().is_empty());
    }

    #[test]
    fn descriptor_without_pair_is_rejected() {
        let jar = InMemoryDocumentJar::new();
        let err = jar.write_entry("secure").unwrap_err();
        assert!(matches!(err, CookieError::MalformedDescriptor(_)));
    }

    #[test]
    fn clear_empties_the_jar() {
        let jar = InMemoryDocumentJar::new();
        jar.write_entry("a=1").unwrap();
        jar.clear();
        assert_eq!(jar.cookie_string().unwrap(), "");
    }
}
