//! JSON-backed cookie jar.
//!
//! `JsonDocumentCookie` keeps one document's cookies in a single JSON file on
//! disk, so a recorded consent choice survives a restart of a native host.
//! It decorates an [`InMemoryDocumentCookie`]: reads are served from memory,
//! and **every mutation** triggers a snapshot write back to the file.
//!
//! ### I/O characteristics & caveats
//! - Each write rewrites the whole file. The file holds a handful of cookies.
//! - File writes are not atomic.
//! - Persisting is best-effort once the jar is open: a failed snapshot write is
//!   reported through the returned `Result` of [`DocumentCookie::set_cookie`],
//!   while the in-memory state is already updated.
//!
//! ### Example
//! ```no_run
//! use cookie_consent::cookies::{DocumentCookie, JsonDocumentCookie};
//!
//! let jar = JsonDocumentCookie::open("cookies.json".into()).unwrap();
//! jar.set_cookie("cookie-consent-tracking-allowed=true; Path=/").unwrap();
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::cookies::cookie_jar::{DocumentCookie, InMemoryDocumentCookie};
use crate::cookies::Cookie;
use crate::errors::ConsentError;

/// On-disk representation of the jar.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CookieFile {
    cookies: Vec<Cookie>,
}

/// A file-backed cookie jar that persists after each mutation.
pub struct JsonDocumentCookie {
    /// Path to the JSON file where cookies are stored.
    path: PathBuf,
    /// Live cookie state.
    inner: InMemoryDocumentCookie,
}

impl JsonDocumentCookie {
    /// Opens (or creates) a jar at `path`.
    ///
    /// A missing file starts an empty jar and is written immediately. A file
    /// that cannot be deserialized is treated as empty, like a browser that
    /// discards a corrupt cookie database.
    pub fn open(path: PathBuf) -> Result<Self, ConsentError> {
        let file = if path.exists() {
            load_file(&path)?
        } else {
            let empty = CookieFile::default();
            save_file(&path, &empty)?;
            empty
        };

        log::debug!("opened cookie jar {} ({} cookies)", path.display(), file.cookies.len());

        Ok(Self {
            path,
            inner: InMemoryDocumentCookie::with_cookies(file.cookies),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of all live cookies.
    pub fn snapshot(&self) -> Vec<Cookie> {
        self.inner.snapshot()
    }

    /// Writes the current live cookies to disk.
    pub fn persist(&self) -> Result<(), ConsentError> {
        let file = CookieFile {
            cookies: self.inner.snapshot(),
        };
        save_file(&self.path, &file)
    }
}

impl DocumentCookie for JsonDocumentCookie {
    fn cookie_string(&self) -> Result<String> {
        self.inner.cookie_string()
    }

    fn set_cookie(&self, assignment: &str) -> Result<()> {
        self.inner.set_cookie(assignment)?;
        self.persist()?;
        Ok(())
    }
}

fn load_file(path: &Path) -> Result<CookieFile, ConsentError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents).unwrap_or_else(|e| {
        log::warn!("discarding unreadable cookie file {}: {}", path.display(), e);
        CookieFile::default()
    }))
}

fn save_file(path: &Path, file: &CookieFile) -> Result<(), ConsentError> {
    let contents = serde_json::to_string_pretty(file)?;
    fs::write(path, contents)?;
    Ok(())
}
