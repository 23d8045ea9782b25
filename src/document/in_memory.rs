use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};

use super::ready::{DocumentReady, ReadySignal, ReadyState};
use super::{ClickListener, Document, ElementHandle};

#[derive(Default)]
struct Element {
    id: Option<String>,
    inner_html: String,
    visible: bool,
    listeners: Vec<ClickListener>,
}

#[derive(Default)]
struct DocumentState {
    elements: HashMap<ElementHandle, Element>,
    /// Top-level elements in append order.
    body: Vec<ElementHandle>,
    /// Elements materialized by `query_selector`, keyed by (root, class).
    children: HashMap<(ElementHandle, String), ElementHandle>,
}

/// In-memory document (no rendering). Used for tests and native hosts.
///
/// Markup is kept as a string per top-level element. Class-marker queries
/// parse that markup as an HTML fragment, run a `.class` selector on it and
/// hand out a stable handle per `(root, class)` pair, so listeners attached
/// to it can be triggered with [`click`](Self::click).
pub struct InMemoryDocument {
    language: Option<String>,
    ready: ReadySignal,
    state: Mutex<DocumentState>,
}

impl std::fmt::Debug for InMemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocument")
            .field("language", &self.language)
            .field("ready_state", &self.ready.state())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocument {
    /// A fully loaded document without a host language.
    pub fn new() -> Self {
        Self::with_state(None, ReadyState::Complete)
    }

    /// A document that is still loading. Call [`finish_loading`](Self::finish_loading)
    /// to release pending dialog renders.
    pub fn loading() -> Self {
        Self::with_state(None, ReadyState::Loading)
    }

    pub fn with_state(language: Option<String>, state: ReadyState) -> Self {
        Self {
            language,
            ready: ReadySignal::new(state),
            state: Mutex::new(DocumentState::default()),
        }
    }

    /// Sets the host language (`navigator.language`).
    pub fn with_language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready.state()
    }

    /// Signals the end of loading (`DOMContentLoaded`).
    pub fn finish_loading(&self) {
        self.ready.set(ReadyState::Complete);
    }

    /// Dispatches a click on `element`, invoking its listeners in registration order.
    pub fn click(&self, element: ElementHandle) -> Result<()> {
        // Listeners may call back into the document, so run them without the lock.
        let listeners = {
            let state = self.lock();
            let el = state
                .elements
                .get(&element)
                .ok_or_else(|| anyhow!("unknown element {element}"))?;
            el.listeners.clone()
        };

        for listener in listeners {
            listener();
        }
        Ok(())
    }

    /// Clicks the element with class `class_marker` inside the element with id `root_id`.
    pub fn click_selector(&self, root_id: &str, class_marker: &str) -> Result<()> {
        let root = self
            .get_element_by_id(root_id)
            .ok_or_else(|| anyhow!("no element with id {root_id}"))?;
        let target = self
            .query_selector(root, class_marker)
            .ok_or_else(|| anyhow!("no .{class_marker} inside #{root_id}"))?;
        self.click(target)
    }

    pub fn inner_html(&self, element: ElementHandle) -> Option<String> {
        self.lock().elements.get(&element).map(|el| el.inner_html.clone())
    }

    pub fn listener_count(&self, element: ElementHandle) -> usize {
        self.lock().elements.get(&element).map_or(0, |el| el.listeners.len())
    }

    /// Number of top-level elements appended to the body.
    pub fn body_len(&self) -> usize {
        self.lock().body.len()
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Document for InMemoryDocument {
    fn language(&self) -> Option<String> {
        self.language.clone()
    }

    fn ready(&self) -> DocumentReady {
        self.ready.subscribe()
    }

    fn get_element_by_id(&self, id: &str) -> Option<ElementHandle> {
        self.lock()
            .elements
            .iter()
            .find(|(_, el)| el.id.as_deref() == Some(id))
            .map(|(handle, _)| *handle)
    }

    fn append_element(&self, id: &str, inner_html: &str) -> Result<ElementHandle> {
        if self.ready.state() == ReadyState::Loading {
            return Err(anyhow!("document body is not available while loading"));
        }

        let mut state = self.lock();
        if state.elements.values().any(|el| el.id.as_deref() == Some(id)) {
            return Err(anyhow!("duplicate element id {id}"));
        }

        let handle = ElementHandle::new();
        state.elements.insert(
            handle,
            Element {
                id: Some(id.to_string()),
                inner_html: inner_html.to_string(),
                visible: true,
                listeners: Vec::new(),
            },
        );
        state.body.push(handle);
        log::debug!("appended #{id} to document body");

        Ok(handle)
    }

    fn query_selector(&self, root: ElementHandle, class_marker: &str) -> Option<ElementHandle> {
        let mut state = self.lock();
        let key = (root, class_marker.to_string());
        if let Some(child) = state.children.get(&key) {
            return Some(*child);
        }

        let html = &state.elements.get(&root)?.inner_html;
        if !contains_class(html, class_marker) {
            return None;
        }

        let child = ElementHandle::new();
        state.elements.insert(
            child,
            Element {
                visible: true,
                ..Element::default()
            },
        );
        state.children.insert(key, child);
        Some(child)
    }

    fn add_click_listener(&self, element: ElementHandle, listener: ClickListener) -> Result<()> {
        let mut state = self.lock();
        let el = state
            .elements
            .get_mut(&element)
            .ok_or_else(|| anyhow!("unknown element {element}"))?;
        el.listeners.push(listener);
        Ok(())
    }

    fn set_visible(&self, element: ElementHandle, visible: bool) -> Result<()> {
        let mut state = self.lock();
        let el = state
            .elements
            .get_mut(&element)
            .ok_or_else(|| anyhow!("unknown element {element}"))?;
        el.visible = visible;
        Ok(())
    }

    fn is_visible(&self, element: ElementHandle) -> bool {
        self.lock().elements.get(&element).is_some_and(|el| el.visible)
    }
}

/// Whether any element of the `html` fragment carries the class `class_marker`.
fn contains_class(html: &str, class_marker: &str) -> bool {
    let css = format!(".{class_marker}");
    let Ok(selector) = Selector::parse(&css) else {
        return false;
    };
    Html::parse_fragment(html).select(&selector).next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const MARKUP: &str = r#"<div class="box"><button class='btn-ok btn'>OK</button></div>"#;

    #[test]
    fn append_and_lookup_by_id() {
        let doc = InMemoryDocument::new();
        assert!(doc.get_element_by_id("dialog").is_none());

        let el = doc.append_element("dialog", MARKUP).unwrap();
        assert_eq!(doc.get_element_by_id("dialog"), Some(el));
        assert_eq!(doc.inner_html(el).as_deref(), Some(MARKUP));
        assert!(doc.is_visible(el));
        assert_eq!(doc.body_len(), 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doc = InMemoryDocument::new();
        doc.append_element("dialog", MARKUP).unwrap();
        assert!(doc.append_element("dialog", MARKUP).is_err());
        assert_eq!(doc.body_len(), 1);
    }

    #[test]
    fn append_fails_while_loading() {
        let doc = InMemoryDocument::loading();
        assert!(doc.append_element("dialog", MARKUP).is_err());
        doc.finish_loading();
        assert!(doc.append_element("dialog", MARKUP).is_ok());
    }

    #[test]
    fn query_selector_matches_whole_class_tokens() {
        let doc = InMemoryDocument::new();
        let root = doc.append_element("dialog", MARKUP).unwrap();

        let a = doc.query_selector(root, "btn-ok").unwrap();
        let b = doc.query_selector(root, "btn-ok").unwrap();
        assert_eq!(a, b);
        assert!(doc.query_selector(root, "box").is_some());
        assert!(doc.query_selector(root, "btn-o").is_none());
        assert!(doc.query_selector(root, "missing").is_none());
    }

    #[test]
    fn click_runs_listeners_in_order() {
        let doc = Arc::new(InMemoryDocument::new());
        let root = doc.append_element("dialog", MARKUP).unwrap();
        let button = doc.query_selector(root, "btn-ok").unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        doc.add_click_listener(button, Arc::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

        // A listener that re-enters the document must not deadlock.
        let d = doc.clone();
        doc.add_click_listener(button, Arc::new(move || {
            d.set_visible(root, false).unwrap();
        }))
        .unwrap();

        doc.click_selector("dialog", "btn-ok").unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!doc.is_visible(root));
        assert_eq!(doc.listener_count(button), 2);
    }

    #[test]
    fn unknown_elements_error() {
        let doc = InMemoryDocument::new();
        let ghost = ElementHandle::new();
        assert!(doc.click(ghost).is_err());
        assert!(doc.set_visible(ghost, true).is_err());
        assert!(doc.add_click_listener(ghost, Arc::new(|| {})).is_err());
        assert!(doc.click_selector("nope", "btn").is_err());
    }

    #[test]
    fn class_lookup_handles_every_attribute_syntax() {
        let html = r#"<a class="x y"><b class='z'></b><c class=bare></c></a>"#;
        for class in ["x", "y", "z", "bare"] {
            assert!(contains_class(html, class), "class {class}");
        }
        assert!(!contains_class(html, "x y"));
        assert!(!contains_class(html, ""));
    }

    #[test]
    fn stray_class_text_does_not_hide_later_buttons() {
        let doc = InMemoryDocument::new();
        let markup = r#"<p>write class="x to style it</p><button class='btn-ok'>OK</button>"#;
        let root = doc.append_element("dialog", markup).unwrap();
        assert!(doc.query_selector(root, "btn-ok").is_some());
    }

    #[test]
    fn language_and_state() {
        let doc = InMemoryDocument::loading().with_language("de-CH");
        assert_eq!(doc.language().as_deref(), Some("de-CH"));
        assert_eq!(doc.ready_state(), ReadyState::Loading);
        assert!(!doc.ready().is_ready());
    }
}
