//! Cookie core types.
//!
//! This module defines the **type-erased handle** used to reach the host's
//! cookie primitive and the serializable [`Cookie`] record kept by the jars in
//! this crate.
//!
//! # Concurrency model
//! - [`DocumentCookieHandle`] is `Arc<dyn DocumentCookie + Send + Sync>`.
//!   Implementations manage their **own internal synchronization** (`Mutex`,
//!   file locks, the browser itself). The trait methods take `&self`.
//!
//! The [`Cookie`] struct can be (de)serialized via `serde`, which is what the
//! JSON-backed jar writes to disk.
//!
//! ```rust
//! use cookie_consent::cookies::{Cookie, SameSite};
//!
//! let c = Cookie::parse("consent=true; Path=/; SameSite=Strict").unwrap();
//! assert_eq!(c.name, "consent");
//! assert_eq!(c.value, "true");
//! assert_eq!(c.same_site, Some(SameSite::Strict));
//! ```

use crate::cookies::DocumentCookie;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

/// A handle to the host's cookie primitive (`document.cookie`).
pub type DocumentCookieHandle = Arc<dyn DocumentCookie + Send + Sync>;

/// HTTP date layout used in `Expires` attributes (`Thu, 01 Jan 1970 00:00:01 GMT`).
const HTTP_DATE: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// SameSite policy of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Parses the attribute value case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("strict") {
            Some(SameSite::Strict)
        } else if value.eq_ignore_ascii_case("lax") {
            Some(SameSite::Lax)
        } else if value.eq_ignore_ascii_case("none") {
            Some(SameSite::None)
        } else {
            None
        }
    }
}

impl Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// A cookie as written through `document.cookie` and kept by the jars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive).
    pub name: String,

    /// Raw cookie value (not URL-decoded).
    pub value: String,

    /// Path scoping (e.g. `"/"`).
    pub path: Option<String>,

    /// Expiration timestamp in HTTP date format. Session cookies have `None`.
    pub expires: Option<String>,

    /// SameSite policy.
    pub same_site: Option<SameSite>,
}

impl Cookie {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: None,
            expires: None,
            same_site: None,
        }
    }

    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_expires(mut self, at: OffsetDateTime) -> Self {
        self.expires = format_http_date(at);
        self
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Parses a `document.cookie` assignment (`name=value; Path=/; Expires=...`).
    ///
    /// Returns `None` when there is no `=` in the first segment. Unknown
    /// attributes are ignored.
    pub fn parse(assignment: &str) -> Option<Self> {
        let mut parts = assignment.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim());
        for part in parts {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            if let Some((k, v)) = part.split_once('=') {
                match k.trim().to_ascii_lowercase().as_str() {
                    "path" => cookie.path = Some(v.trim().to_string()),
                    "expires" => cookie.expires = Some(v.trim().to_string()),
                    "samesite" => cookie.same_site = SameSite::parse(v),
                    _ => {}
                }
            }
        }

        Some(cookie)
    }

    /// Returns the parsed expiry, if the cookie has a well-formed `Expires` attribute.
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires.as_deref().and_then(parse_http_date)
    }

    /// `true` when the cookie carries an expiry at or before `now`.
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }

    /// Serializes the cookie to a `document.cookie` assignment string.
    pub fn to_assignment(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if let Some(expires) = &self.expires {
            out.push_str("; Expires=");
            out.push_str(expires);
        }
        if let Some(path) = &self.path {
            out.push_str("; Path=");
            out.push_str(path);
        }
        if let Some(same_site) = &self.same_site {
            out.push_str(&format!("; SameSite={same_site}"));
        }
        out.push(';');
        out
    }
}

/// Formats `at` as an HTTP date (always in UTC).
pub fn format_http_date(at: OffsetDateTime) -> Option<String> {
    at.to_offset(time::UtcOffset::UTC).format(HTTP_DATE).ok()
}

/// Parses an HTTP date as written by [`format_http_date`].
pub fn parse_http_date(s: &str) -> Option<OffsetDateTime> {
    PrimitiveDateTime::parse(s.trim(), HTTP_DATE)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parse_assignment_with_attributes() {
        let c = Cookie::parse(
            "cookie-consent-tracking-allowed=false; Expires=Fri, 16 Oct 2026 10:00:00 GMT; Path=/; SameSite=strict;",
        )
        .unwrap();

        assert_eq!(c.name, "cookie-consent-tracking-allowed");
        assert_eq!(c.value, "false");
        assert_eq!(c.path.as_deref(), Some("/"));
        assert_eq!(c.same_site, Some(SameSite::Strict));
        assert_eq!(c.expires_at(), Some(datetime!(2026-10-16 10:00:00 UTC)));
    }

    #[test]
    fn parse_rejects_missing_name() {
        assert!(Cookie::parse("novalue").is_none());
        assert!(Cookie::parse("=value").is_none());
    }

    #[test]
    fn empty_value_is_allowed() {
        let c = Cookie::parse("a=; Path=/").unwrap();
        assert_eq!(c.value, "");
    }

    #[test]
    fn http_date_format() {
        let at = datetime!(1970-01-01 00:00:01 UTC);
        assert_eq!(format_http_date(at).as_deref(), Some("Thu, 01 Jan 1970 00:00:01 GMT"));
        assert_eq!(parse_http_date("Thu, 01 Jan 1970 00:00:01 GMT"), Some(at));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn expiry_checks() {
        let now = datetime!(2026-10-16 12:00:00 UTC);
        let past = Cookie::new("a", "1").with_expires(datetime!(1970-01-01 00:00:01 UTC));
        let future = Cookie::new("a", "1").with_expires(datetime!(2027-10-16 12:00:00 UTC));
        let session = Cookie::new("a", "1");
        let garbage = Cookie {
            expires: Some("not a date".into()),
            ..Cookie::new("a", "1")
        };

        assert!(past.is_expired(now));
        assert!(!future.is_expired(now));
        assert!(!session.is_expired(now));
        assert!(!garbage.is_expired(now));
    }

    #[test]
    fn assignment_string_layout() {
        let c = Cookie::new("consent", "true")
            .with_expires(datetime!(2027-10-16 12:00:00 UTC))
            .with_path("/")
            .with_same_site(SameSite::Strict);

        assert_eq!(
            c.to_assignment(),
            "consent=true; Expires=Sat, 16 Oct 2027 12:00:00 GMT; Path=/; SameSite=Strict;"
        );
        assert_eq!(Cookie::parse(&c.to_assignment()).unwrap(), c);
    }
}
