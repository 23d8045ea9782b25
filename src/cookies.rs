// src/cookies.rs
//! Cookies: [`DocumentCookie`], the [`Cookie`] record and jar backends.

mod cookies;
mod cookie_jar;
mod json;
#[cfg(feature = "wasm")]
mod browser;

pub use cookies::Cookie;
pub use cookies::DocumentCookieHandle;
pub use cookies::SameSite;
pub use cookies::{format_http_date, parse_http_date};

pub use cookie_jar::DocumentCookie;
pub use cookie_jar::InMemoryDocumentCookie;
pub use json::JsonDocumentCookie;

#[cfg(feature = "wasm")]
pub use browser::BrowserDocumentCookie;
