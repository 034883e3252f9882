//! The cookie store façade.
//!
//! [`CookieStore`] reads, writes and deletes JSON-valued cookies in a
//! [`DocumentJar`]. It keeps no cookie state of its own: every call reads the
//! jar string or writes one descriptor to it.
//!
//! ```rust
//! use gosub_cookies::cookies::{CookieOptions, CookieStore};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), gosub_cookies::CookieError> {
//! let store = CookieStore::in_memory();
//!
//! store
//!     .set_many([("string", json!("Hello Wold!")), ("array", json!([1, 2, 3]))])?
//!     .set("object", &json!({"one": 1, "two": 2}), &CookieOptions::default())?;
//!
//! assert_eq!(store.get("array")?, Some(json!([1, 2, 3])));
//!
//! store.remove(["string"])?;
//! assert_eq!(store.get("string")?, None);
//! # Ok(()) }
//! ```
use std::fmt;
use std::sync::Arc;

use crate::config::CookieStoreConfig;
use crate::cookies::descriptor::{build_descriptor, decode_value, encode_value};
use crate::cookies::{CookieOptions, DocumentJarHandle, Expires, InMemoryDocumentJar};
use crate::errors::CookieError;
use indexmap::IndexMap;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

/// Separator between entries in a jar string.
const ENTRY_SEPARATOR: &str = "; ";

/// Decoded values per requested key, in request order. `None` marks a key that
/// is absent from the jar.
pub type CookieMap = IndexMap<String, Option<Value>>;

/// Result of a variadic [`CookieStore::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Exactly one distinct key was requested.
    One(Option<Value>),
    /// Zero or several distinct keys were requested.
    Many(CookieMap),
}

/// JSON cookie store over a document jar.
///
/// Cloning is cheap; clones share the same jar.
#[derive(Clone)]
pub struct CookieStore {
    jar: DocumentJarHandle,
    config: CookieStoreConfig,
}

impl fmt::Debug for CookieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieStore").field("config", &self.config).finish_non_exhaustive()
    }
}

impl CookieStore {
    /// Creates a store over `jar` with the default configuration.
    pub fn new(jar: DocumentJarHandle) -> Self {
        Self::with_config(jar, CookieStoreConfig::default())
    }

    pub fn with_config(jar: DocumentJarHandle, config: CookieStoreConfig) -> Self {
        Self { jar, config }
    }

    /// Creates a store over a fresh [`InMemoryDocumentJar`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDocumentJar::new()))
    }

    pub fn jar(&self) -> &DocumentJarHandle {
        &self.jar
    }

    pub fn config(&self) -> &CookieStoreConfig {
        &self.config
    }

    /// Stores `value` as JSON under `key`.
    ///
    /// Attributes missing from `options` fall back to the configured defaults.
    /// Keys are not validated; a key containing `=` or `;` corrupts the jar.
    ///
    /// # Errors
    /// [`CookieError::Serialization`] if `value` cannot be serialized, or any
    /// error reported by the jar.
    pub fn set<V: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &V,
        options: &CookieOptions,
    ) -> Result<&Self, CookieError> {
        let encoded = encode_value(value)?;
        let options = self.effective_options(options);
        let descriptor = build_descriptor(key, &encoded, &options, OffsetDateTime::now_utc())?;

        log::debug!("Setting cookie '{}'", key);
        log::trace!("Cookie descriptor: {}", descriptor);

        self.jar.write_entry(&descriptor)?;
        Ok(self)
    }

    /// Stores every `(key, value)` pair in iteration order, with default options.
    ///
    /// Stops at the first failure; pairs written before it stay written.
    pub fn set_many<I, K, V>(&self, entries: I) -> Result<&Self, CookieError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let options = CookieOptions::default();
        for (key, value) in entries {
            self.set(key.as_ref(), &value, &options)?;
        }
        Ok(self)
    }

    /// Returns the decoded value stored under `key`, or `None` when absent.
    ///
    /// Entries that fail to decode are reported as absent unless
    /// `strict_decoding` is configured.
    pub fn get(&self, key: &str) -> Result<Option<Value>, CookieError> {
        let jar = self.jar.cookie_string()?;
        self.read_from(&jar, key)
    }

    /// Like [`get`](Self::get), converting the JSON value into `T`.
    ///
    /// A value that does not fit `T` is handled like any other decode failure.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CookieError> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(typed) => Ok(Some(typed)),
            Err(e) => self.decode_failure(key, format!("unexpected shape: {e}")),
        }
    }

    /// Returns a map from every requested key to its decoded value.
    ///
    /// Keys missing from the jar are present in the map with `None`.
    pub fn get_many<I, K>(&self, keys: I) -> Result<CookieMap, CookieError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let jar = self.jar.cookie_string()?;
        let mut result = CookieMap::new();
        for key in keys {
            let key = key.as_ref();
            let value = self.read_from(&jar, key)?;
            result.insert(key.to_string(), value);
        }
        Ok(result)
    }

    /// Variadic read: a single distinct key yields its value directly, anything
    /// else yields a map.
    pub fn lookup<I, K>(&self, keys: I) -> Result<Lookup, CookieError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut map = self.get_many(keys)?;
        if map.len() == 1 {
            if let Some((_, value)) = map.pop() {
                return Ok(Lookup::One(value));
            }
        }
        Ok(Lookup::Many(map))
    }

    /// Deletes every named cookie by writing it with an expiry one day in the past.
    ///
    /// Removing a cookie that does not exist is harmless.
    pub fn remove<I, K>(&self, keys: I) -> Result<&Self, CookieError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let options = CookieOptions::new().expires(Expires::Days(-1.0));
        for key in keys {
            log::debug!("Removing cookie '{}'", key.as_ref());
            self.set(key.as_ref(), "", &options)?;
        }
        Ok(self)
    }

    /// Returns every key in the jar, in jar order.
    pub fn keys(&self) -> Result<Vec<String>, CookieError> {
        let jar = self.jar.cookie_string()?;
        if jar.is_empty() {
            return Ok(Vec::new());
        }

        Ok(jar
            .split(ENTRY_SEPARATOR)
            .map(|entry| entry.split('=').next().unwrap_or_default().to_string())
            .collect())
    }

    /// Returns every cookie in the jar, decoded.
    ///
    /// The key snapshot and the reads are separate jar accesses; a concurrent
    /// writer may change the jar in between.
    pub fn all(&self) -> Result<CookieMap, CookieError> {
        let keys = self.keys()?;
        self.get_many(keys)
    }

    /// Removes every cookie currently in the jar.
    ///
    /// Not atomic: cookies added after the key snapshot survive.
    pub fn clear(&self) -> Result<&Self, CookieError> {
        let keys = self.keys()?;
        log::debug!("Clearing {} cookies", keys.len());
        self.remove(keys)
    }

    /// Number of cookies in the jar.
    pub fn len(&self) -> Result<usize, CookieError> {
        Ok(self.keys()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, CookieError> {
        Ok(self.len()? == 0)
    }

    /// Returns this store unchanged.
    ///
    /// Lets an embedder that rebinds a global name keep hold of the store. There
    /// is no global binding on the Rust side, so nothing else happens.
    pub fn no_conflict(&self) -> &Self {
        self
    }

    fn effective_options(&self, options: &CookieOptions) -> CookieOptions {
        let mut effective = options.clone();
        if effective.path.is_none() {
            effective.path = self.config.default_path.clone();
        }
        if effective.domain.is_none() {
            effective.domain = self.config.default_domain.clone();
        }
        effective.secure |= self.config.default_secure;
        effective
    }

    fn read_from(&self, jar: &str, key: &str) -> Result<Option<Value>, CookieError> {
        let Some(raw) = find_raw(jar, key)? else {
            return Ok(None);
        };

        match decode_value(raw) {
            Ok(value) => Ok(Some(value)),
            Err(reason) => self.decode_failure(key, reason),
        }
    }

    fn decode_failure<T>(&self, key: &str, reason: String) -> Result<Option<T>, CookieError> {
        if self.config.strict_decoding {
            return Err(CookieError::Deserialization {
                key: key.to_string(),
                reason,
            });
        }

        log::warn!("Ignoring undecodable cookie '{}': {}", key, reason);
        Ok(None)
    }
}

/// Finds the raw (still encoded) value of `key` in a jar string.
///
/// The key is matched literally and only at an entry boundary.
fn find_raw<'a>(jar: &'a str, key: &str) -> Result<Option<&'a str>, CookieError> {
    let pattern = Regex::new(&format!("(?:^|; ){}=([^;]*)", regex::escape(key))).map_err(|e| {
        CookieError::InvalidKey {
            key: key.to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(pattern
        .captures(jar)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str()))
}
