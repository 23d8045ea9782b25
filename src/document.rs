// src/document.rs
//! Host document abstraction: the render target of the consent dialog.
//!
//! The presenter never touches a concrete DOM. It talks to a [`Document`],
//! which provides exactly the primitives the widget needs:
//! - the host language (`navigator.language`),
//! - a one-shot ready signal ([`DocumentReady`]),
//! - element lookup by id, creation of the dialog element in the body,
//! - class-marker queries inside the dialog,
//! - click listeners and visibility.
//!
//! Elements are addressed through copyable [`ElementHandle`]s, which the
//! presenter retains after creating the dialog instead of looking it up again.
//!
//! [`InMemoryDocument`] implements the trait for tests and native hosts and
//! can dispatch simulated clicks. With the `wasm` feature, `BrowserDocument`
//! implements it over the hosting page's DOM.

#[cfg(feature = "wasm")]
mod browser;
mod in_memory;
mod ready;

use anyhow::Result;
use std::fmt::Display;
use std::sync::Arc;
use uuid::Uuid;

#[cfg(feature = "wasm")]
pub use browser::BrowserDocument;
pub use in_memory::InMemoryDocument;
pub use ready::{DocumentReady, ReadySignal, ReadyState};

/// Invoked when an element is clicked.
pub type ClickListener = Arc<dyn Fn() + Send + Sync>;

/// A handle to a host document.
pub type DocumentHandle = Arc<dyn Document + Send + Sync>;

/// A unique identifier for an element in a host document.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(Uuid);

impl ElementHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ElementHandle {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The document the consent dialog is rendered into.
///
/// Implementations are internally synchronized; methods take `&self`.
pub trait Document: Send + Sync {
    /// Preferred language of the host (e.g. `"de-CH"`), if known.
    fn language(&self) -> Option<String>;

    /// Returns a waiter for the end of document loading.
    fn ready(&self) -> DocumentReady;

    /// Looks up an element by its `id` attribute.
    fn get_element_by_id(&self, id: &str) -> Option<ElementHandle>;

    /// Creates a `<div id="{id}">` with `inner_html` and appends it to the body.
    fn append_element(&self, id: &str, inner_html: &str) -> Result<ElementHandle>;

    /// Returns the first element below `root` carrying the class `class_marker`.
    fn query_selector(&self, root: ElementHandle, class_marker: &str) -> Option<ElementHandle>;

    /// Registers `listener` for clicks on `element`.
    fn add_click_listener(&self, element: ElementHandle, listener: ClickListener) -> Result<()>;

    /// Shows (`display: block`) or hides (`display: none`) `element`.
    fn set_visible(&self, element: ElementHandle, visible: bool) -> Result<()>;

    /// Whether `element` exists and is displayed.
    fn is_visible(&self, element: ElementHandle) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_handles_are_unique() {
        let a = ElementHandle::new();
        let b = ElementHandle::new();
        let copy = a;
        assert_ne!(a, b);
        assert_eq!(a, copy);
    }

    #[test]
    fn element_handle_from_uuid_displays_uuid() {
        let uuid = Uuid::new_v4();
        let handle = ElementHandle::from(uuid);
        assert_eq!(handle.to_string(), uuid.to_string());
    }
}
