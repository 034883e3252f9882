//! Cookie value codec and descriptor assembly.
//!
//! Values travel through the jar as JSON text which is then percent-encoded
//! with the same character set as ECMAScript's `encodeURIComponent`, so jars
//! shared with scripts in the page stay readable by both sides.
//!
//! A **descriptor** is the single-entry string assigned to a jar:
//!
//! ```text
//! key=encodedValue[; expires=<HTTP-date>][; path=<path>][; domain=<domain>][; secure]
//! ```
use crate::errors::CookieError;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Characters left untouched by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// IMF-fixdate, e.g. `Thu, 01 Jan 1970 00:00:00 GMT`.
const HTTP_DATE: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Latest expiry that can be written; later day counts clamp to it.
const LATEST: OffsetDateTime = PrimitiveDateTime::MAX.assume_utc();
/// Past day counts too large to represent clamp to the epoch, which still deletes.
const EARLIEST: OffsetDateTime = OffsetDateTime::UNIX_EPOCH;

/// When a cookie should expire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expires {
    /// Relative to the moment of the write, in (possibly fractional or negative) days.
    Days(f64),
    /// An absolute point in time, used as-is.
    At(OffsetDateTime),
}

impl Expires {
    /// Resolves the expiry to an absolute time, taking `now` as the reference for [`Expires::Days`].
    pub fn resolve(&self, now: OffsetDateTime) -> Result<OffsetDateTime, CookieError> {
        match *self {
            Expires::At(at) => Ok(at),
            Expires::Days(days) => {
                if days.is_nan() {
                    return Err(CookieError::InvalidExpiry(format!("{days} days")));
                }
                // `as` saturates, and out-of-range sums clamp to the representable bounds
                let millis = (days * MILLIS_PER_DAY) as i64;
                Ok(now
                    .checked_add(Duration::milliseconds(millis))
                    .unwrap_or(if millis > 0 { LATEST } else { EARLIEST }))
            }
        }
    }
}

impl From<OffsetDateTime> for Expires {
    fn from(at: OffsetDateTime) -> Self {
        Expires::At(at)
    }
}

/// Attributes attached to a single write.
///
/// Empty `path`/`domain` strings are treated the same as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieOptions {
    pub expires: Option<Expires>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
}

impl CookieOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expires(mut self, expires: impl Into<Expires>) -> Self {
        self.expires = Some(expires.into());
        self
    }

    /// Shorthand for `expires(Expires::Days(days))`.
    pub fn expires_in_days(self, days: f64) -> Self {
        self.expires(Expires::Days(days))
    }

    pub fn path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn secure(mut self, on: bool) -> Self {
        self.secure = on;
        self
    }
}

/// Serializes `value` to JSON and percent-encodes the result.
pub fn encode_value<V: Serialize + ?Sized>(value: &V) -> Result<String, CookieError> {
    let json = serde_json::to_string(value).map_err(CookieError::Serialization)?;
    Ok(utf8_percent_encode(&json, COMPONENT).to_string())
}

/// Percent-decodes `raw` and parses the result as JSON.
///
/// The error string describes which stage failed; callers attach the key.
pub fn decode_value(raw: &str) -> Result<Value, String> {
    let json = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|e| format!("invalid percent-encoding: {e}"))?;
    serde_json::from_str(&json).map_err(|e| format!("invalid JSON: {e}"))
}

/// Formats `at` as an HTTP date in GMT.
pub fn format_http_date(at: OffsetDateTime) -> Result<String, CookieError> {
    at.to_offset(UtcOffset::UTC)
        .format(HTTP_DATE)
        .map_err(|e| CookieError::InvalidExpiry(e.to_string()))
}

/// Parses an HTTP date as produced by [`format_http_date`].
pub fn parse_http_date(s: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(s.trim(), HTTP_DATE)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Builds the descriptor string for one write.
pub(crate) fn build_descriptor(
    key: &str,
    encoded_value: &str,
    options: &CookieOptions,
    now: OffsetDateTime,
) -> Result<String, CookieError> {
    let mut descriptor = format!("{key}={encoded_value}");

    if let Some(expires) = &options.expires {
        let at = expires.resolve(now)?;
        descriptor.push_str("; expires=");
        descriptor.push_str(&format_http_date(at)?);
    }
    if let Some(path) = options.path.as_deref().filter(|p| !p.is_empty()) {
        descriptor.push_str("; path=");
        descriptor.push_str(path);
    }
    if let Some(domain) = options.domain.as_deref().filter(|d| !d.is_empty()) {
        descriptor.push_str("; domain=");
        descriptor.push_str(domain);
    }
    if options.secure {
        descriptor.push_str("; secure");
    }

    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use time::macros::datetime;

    #[test]
    fn numbers_encode_bare() {
        assert_eq!(encode_value(&5).unwrap(), "5");
    }

    #[test]
    fn strings_and_objects_use_component_encoding() {
        assert_eq!(encode_value("Hello Wold!").unwrap(), "%22Hello%20Wold!%22");
        assert_eq!(encode_value(&json!({"one": 1})).unwrap(), "%7B%22one%22%3A1%7D");
        assert_eq!(encode_value(&json!([1, 2, 3])).unwrap(), "%5B1%2C2%2C3%5D");
        assert_eq!(encode_value("a;b=c").unwrap(), "%22a%3Bb%3Dc%22");
    }

    #[test]
    fn unserializable_values_fail() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1);
        let err = encode_value(&map).unwrap_err();
        assert!(matches!(err, CookieError::Serialization(_)));
    }

    #[test]
    fn decode_reverses_encode() {
        let value = json!({"nested": {"list": [1, "two", null, true]}, "text": "ü; ="});
        let raw = encode_value(&value).unwrap();
        assert_eq!(decode_value(&raw).unwrap(), value);
    }

    #[test]
    fn decode_reports_bad_json() {
        let err = decode_value("not%20json").unwrap_err();
        assert!(err.starts_with("invalid JSON"));
    }

    #[test]
    fn decode_reports_bad_utf8() {
        let err = decode_value("%FF").unwrap_err();
        assert!(err.starts_with("invalid percent-encoding"));
    }

    #[test]
    fn http_date_format() {
        let at = datetime!(1970-01-01 00:00:00 UTC);
        assert_eq!(format_http_date(at).unwrap(), "Thu, 01 Jan 1970 00:00:00 GMT");

        let offset = datetime!(2024-03-05 01:30:00 +02:00);
        assert_eq!(format_http_date(offset).unwrap(), "Mon, 04 Mar 2024 23:30:00 GMT");
    }

    #[test]
    fn http_date_parses_back() {
        let at = datetime!(2031-07-14 12:00:09 UTC);
        let s = format_http_date(at).unwrap();
        assert_eq!(parse_http_date(&s), Some(at));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn days_are_relative_to_now() {
        let now = datetime!(2024-01-01 00:00:00 UTC);
        assert_eq!(Expires::Days(1.0).resolve(now).unwrap(), datetime!(2024-01-02 00:00:00 UTC));
        assert_eq!(Expires::Days(-1.0).resolve(now).unwrap(), datetime!(2023-12-31 00:00:00 UTC));
        assert_eq!(Expires::Days(0.5).resolve(now).unwrap(), datetime!(2024-01-01 12:00:00 UTC));
        assert!(Expires::Days(f64::NAN).resolve(now).is_err());
    }

    #[test]
    fn far_day_counts_clamp_to_representable_dates() {
        let now = datetime!(2026-01-01 00:00:00 UTC);
        let latest = datetime!(9999-12-31 23:59:59.999999999 UTC);

        assert_eq!(Expires::Days(3_000_000.0).resolve(now).unwrap(), latest);
        assert_eq!(Expires::Days(1e300).resolve(now).unwrap(), latest);
        assert_eq!(Expires::Days(f64::INFINITY).resolve(now).unwrap(), latest);
        assert_eq!(Expires::Days(-1e300).resolve(now).unwrap(), OffsetDateTime::UNIX_EPOCH);

        let options = CookieOptions::new().expires_in_days(3_000_000.0);
        let descriptor = build_descriptor("k", "1", &options, now).unwrap();
        assert_eq!(descriptor, "k=1; expires=Fri, 31 Dec 9999 23:59:59 GMT");
    }

    #[test]
    fn descriptor_without_options() {
        let now = OffsetDateTime::now_utc();
        let d = build_descriptor("my_cookie", "5", &CookieOptions::default(), now).unwrap();
        assert_eq!(d, "my_cookie=5");
    }

    #[test]
    fn descriptor_renders_attributes_in_order() {
        let now = datetime!(2024-01-01 00:00:00 UTC);
        let options = CookieOptions::new()
            .expires_in_days(2.0)
            .path("/app")
            .domain("example.com")
            .secure(true);

        let d = build_descriptor("k", "1", &options, now).unwrap();
        assert_eq!(
            d,
            "k=1; expires=Wed, 03 Jan 2024 00:00:00 GMT; path=/app; domain=example.com; secure"
        );
    }

    #[test]
    fn descriptor_skips_empty_path_and_domain() {
        let now = OffsetDateTime::now_utc();
        let options = CookieOptions::new().path("").domain("");
        assert_eq!(build_descriptor("k", "1", &options, now).unwrap(), "k=1");
    }
}
