//! The host cookie primitive and an in-memory implementation.
//!
//! [`DocumentCookie`] mirrors the browser's `document.cookie` property: reading
//! yields every live cookie as `"name=value"` pairs joined by `"; "`, and
//! writing takes a single assignment string with attributes
//! (`name=value; Expires=...; Path=/; SameSite=Strict;`).
//!
//! [`InMemoryDocumentCookie`] behaves like a browser jar for one document:
//! - Writing a cookie whose `Expires` lies in the past deletes it.
//! - Cookies are keyed by `(name, path)`; last write wins.
//! - Expired cookies are never returned.
//!
//! It can also be created in a *disabled* state, which models a browser with
//! cookie storage turned off: reads and writes fail.

use crate::cookies::Cookie;
use anyhow::{anyhow, Result};
use std::sync::Mutex;
use time::OffsetDateTime;

/// The host's `document.cookie` primitive.
///
/// Implementations are internally synchronized; methods take `&self`.
pub trait DocumentCookie: Send + Sync {
    /// Returns the raw cookie string (`"a=1; b=2"`), or an error when cookie
    /// storage is not available.
    fn cookie_string(&self) -> Result<String>;

    /// Applies a single cookie assignment (`"name=value; Path=/; ..."`).
    fn set_cookie(&self, assignment: &str) -> Result<()>;
}

/// Browser-like cookie jar for a single document, kept in memory only.
#[derive(Debug, Default)]
pub struct InMemoryDocumentCookie {
    cookies: Mutex<Vec<Cookie>>,
    disabled: bool,
}

impl InMemoryDocumentCookie {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a jar that refuses every read and write.
    pub fn disabled() -> Self {
        Self {
            cookies: Mutex::new(Vec::new()),
            disabled: true,
        }
    }

    /// Creates a jar pre-populated with `cookies` (e.g. loaded from disk).
    pub fn with_cookies(cookies: Vec<Cookie>) -> Self {
        Self {
            cookies: Mutex::new(cookies),
            disabled: false,
        }
    }

    /// Returns a copy of all live cookies.
    pub fn snapshot(&self) -> Vec<Cookie> {
        let now = OffsetDateTime::now_utc();
        self.lock()
            .iter()
            .filter(|c| !c.is_expired(now))
            .cloned()
            .collect()
    }

    /// Looks up a live cookie by name.
    pub fn get(&self, name: &str) -> Option<Cookie> {
        self.snapshot().into_iter().find(|c| c.name == name)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Cookie>> {
        // A poisoned jar still holds consistent data: every mutation is a single push/retain.
        self.cookies.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DocumentCookie for InMemoryDocumentCookie {
    fn cookie_string(&self) -> Result<String> {
        if self.disabled {
            return Err(anyhow!("cookie storage is disabled"));
        }

        Ok(self
            .snapshot()
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; "))
    }

    fn set_cookie(&self, assignment: &str) -> Result<()> {
        if self.disabled {
            return Err(anyhow!("cookie storage is disabled"));
        }

        let cookie = Cookie::parse(assignment)
            .ok_or_else(|| anyhow!("malformed cookie assignment: {assignment}"))?;
        let now = OffsetDateTime::now_utc();

        let mut cookies = self.lock();
        cookies.retain(|c| !(c.name == cookie.name && c.path == cookie.path) && !c.is_expired(now));
        if !cookie.is_expired(now) {
            cookies.push(cookie);
        }

        Ok(())
    }
}
