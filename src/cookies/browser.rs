//! `document.cookie` of the hosting browser, reached through wasm-bindgen.

use crate::cookies::DocumentCookie;
use anyhow::{anyhow, Result};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    type HtmlDocument;

    #[wasm_bindgen(thread_local_v2, js_name = document)]
    static DOCUMENT: Option<HtmlDocument>;

    #[wasm_bindgen(method, getter = cookie, catch)]
    fn cookie(this: &HtmlDocument) -> Result<String, JsValue>;

    #[wasm_bindgen(method, setter = cookie, catch)]
    fn set_cookie(this: &HtmlDocument, value: &str) -> Result<(), JsValue>;
}

/// The browser's own cookie store for the current document.
///
/// Holds no state; every call goes straight to `document.cookie`, so the
/// browser enforces expiry and SameSite itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDocumentCookie;

impl BrowserDocumentCookie {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentCookie for BrowserDocumentCookie {
    fn cookie_string(&self) -> Result<String> {
        DOCUMENT.with(|doc| match doc {
            Some(doc) => doc
                .cookie()
                .map_err(|e| anyhow!("document.cookie is not readable: {e:?}")),
            None => Err(anyhow!("no document available")),
        })
    }

    fn set_cookie(&self, assignment: &str) -> Result<()> {
        DOCUMENT.with(|doc| match doc {
            Some(doc) => doc
                .set_cookie(assignment)
                .map_err(|e| anyhow!("document.cookie is not writable: {e:?}")),
            None => Err(anyhow!("no document available")),
        })
    }
}
