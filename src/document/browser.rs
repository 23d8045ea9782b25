//! The hosting page's DOM, reached through wasm-bindgen.
//!
//! JS objects cannot leave the thread that created them, so the elements
//! behind [`ElementHandle`]s live in a thread-local registry. The document
//! value itself only carries the ready signal and stays `Send + Sync`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use wasm_bindgen::prelude::*;

use super::ready::{DocumentReady, ReadySignal, ReadyState};
use super::{ClickListener, Document, ElementHandle};

#[wasm_bindgen]
extern "C" {
    type DomDocument;

    #[wasm_bindgen(thread_local_v2, js_name = document)]
    static DOCUMENT: Option<DomDocument>;

    #[wasm_bindgen(method, getter = readyState)]
    fn ready_state(this: &DomDocument) -> String;

    #[wasm_bindgen(method, getter)]
    fn body(this: &DomDocument) -> Option<DomElement>;

    #[wasm_bindgen(method, js_name = getElementById)]
    fn get_element_by_id(this: &DomDocument, id: &str) -> Option<DomElement>;

    #[wasm_bindgen(method, catch, js_name = createElement)]
    fn create_element(this: &DomDocument, tag: &str) -> Result<DomElement, JsValue>;

    #[wasm_bindgen(method, js_name = addEventListener)]
    fn add_document_listener(this: &DomDocument, kind: &str, listener: &JsValue);

    type DomElement;

    #[wasm_bindgen(method, setter = id)]
    fn set_id(this: &DomElement, id: &str);

    #[wasm_bindgen(method, setter = innerHTML)]
    fn set_inner_html(this: &DomElement, html: &str);

    #[wasm_bindgen(method, catch)]
    fn append(this: &DomElement, child: &DomElement) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = querySelector)]
    fn query_selector(this: &DomElement, selectors: &str) -> Result<Option<DomElement>, JsValue>;

    #[wasm_bindgen(method, js_name = addEventListener)]
    fn add_event_listener(this: &DomElement, kind: &str, listener: &JsValue);

    #[wasm_bindgen(method, getter)]
    fn style(this: &DomElement) -> CssStyle;

    type CssStyle;

    #[wasm_bindgen(method, getter)]
    fn display(this: &CssStyle) -> String;

    #[wasm_bindgen(method, setter)]
    fn set_display(this: &CssStyle, value: &str);

    type Navigator;

    #[wasm_bindgen(thread_local_v2, js_name = navigator)]
    static NAVIGATOR: Option<Navigator>;

    #[wasm_bindgen(method, getter)]
    fn language(this: &Navigator) -> Option<String>;
}

#[derive(Default)]
struct Registry {
    elements: HashMap<ElementHandle, DomElement>,
    /// Elements handed out by `query_selector`, keyed by (root, class).
    children: HashMap<(ElementHandle, String), ElementHandle>,
}

impl Registry {
    /// Returns the handle of `element`, registering it on first sight.
    fn handle_for(&mut self, element: DomElement) -> ElementHandle {
        let known = self
            .elements
            .iter()
            .find(|(_, el)| <JsValue as PartialEq>::eq(el, &element))
            .map(|(handle, _)| *handle);
        known.unwrap_or_else(|| {
            let handle = ElementHandle::new();
            self.elements.insert(handle, element);
            handle
        })
    }

    fn get(&self, handle: ElementHandle) -> Result<&DomElement> {
        self.elements
            .get(&handle)
            .ok_or_else(|| anyhow!("unknown element {handle}"))
    }
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

fn with_document<T>(f: impl FnOnce(&DomDocument) -> Result<T>) -> Result<T> {
    DOCUMENT.with(|doc| match doc {
        Some(doc) => f(doc),
        None => Err(anyhow!("no document available")),
    })
}

fn parse_ready_state(state: &str) -> ReadyState {
    match state {
        "loading" => ReadyState::Loading,
        "interactive" => ReadyState::Interactive,
        _ => ReadyState::Complete,
    }
}

/// The page the module runs in.
///
/// Readiness follows `document.readyState`; while the page is still loading,
/// a `DOMContentLoaded` listener releases pending dialog renders.
pub struct BrowserDocument {
    ready: Arc<ReadySignal>,
}

impl std::fmt::Debug for BrowserDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserDocument")
            .field("ready_state", &self.ready.state())
            .finish()
    }
}

impl BrowserDocument {
    pub fn new() -> Result<Self> {
        let state = with_document(|doc| Ok(parse_ready_state(&doc.ready_state())))?;
        let ready = Arc::new(ReadySignal::new(state));

        if state == ReadyState::Loading {
            let signal = ready.clone();
            let on_loaded = Closure::once_into_js(move || signal.set(ReadyState::Interactive));
            with_document(|doc| {
                doc.add_document_listener("DOMContentLoaded", &on_loaded);
                Ok(())
            })?;
        }

        Ok(Self { ready })
    }
}

impl Document for BrowserDocument {
    fn language(&self) -> Option<String> {
        NAVIGATOR.with(|nav| nav.as_ref().and_then(Navigator::language))
    }

    fn ready(&self) -> DocumentReady {
        self.ready.subscribe()
    }

    fn get_element_by_id(&self, id: &str) -> Option<ElementHandle> {
        let element = with_document(|doc| Ok(doc.get_element_by_id(id))).ok().flatten()?;
        Some(REGISTRY.with(|r| r.borrow_mut().handle_for(element)))
    }

    fn append_element(&self, id: &str, inner_html: &str) -> Result<ElementHandle> {
        let element = with_document(|doc| {
            let body = doc
                .body()
                .ok_or_else(|| anyhow!("document has no body"))?;
            let element = doc
                .create_element("div")
                .map_err(|e| anyhow!("cannot create element: {e:?}"))?;
            element.set_id(id);
            element.set_inner_html(inner_html);
            body.append(&element)
                .map_err(|e| anyhow!("cannot append #{id}: {e:?}"))?;
            Ok(element)
        })?;
        log::debug!("appended #{id} to document body");

        Ok(REGISTRY.with(|r| r.borrow_mut().handle_for(element)))
    }

    fn query_selector(&self, root: ElementHandle, class_marker: &str) -> Option<ElementHandle> {
        REGISTRY.with(|r| {
            let mut registry = r.borrow_mut();
            let key = (root, class_marker.to_string());
            if let Some(child) = registry.children.get(&key) {
                return Some(*child);
            }

            let found = registry
                .get(root)
                .ok()?
                .query_selector(&format!(".{class_marker}"))
                .ok()
                .flatten()?;
            let child = registry.handle_for(found);
            registry.children.insert(key, child);
            Some(child)
        })
    }

    fn add_click_listener(&self, element: ElementHandle, listener: ClickListener) -> Result<()> {
        REGISTRY.with(|r| {
            let registry = r.borrow();
            let element = registry.get(element)?;
            let closure = Closure::<dyn FnMut()>::new(move || listener());
            element.add_event_listener("click", closure.as_ref());
            // Lives as long as the element.
            closure.forget();
            Ok(())
        })
    }

    fn set_visible(&self, element: ElementHandle, visible: bool) -> Result<()> {
        REGISTRY.with(|r| {
            let registry = r.borrow();
            let element = registry.get(element)?;
            element.style().set_display(if visible { "block" } else { "none" });
            Ok(())
        })
    }

    fn is_visible(&self, element: ElementHandle) -> bool {
        REGISTRY.with(|r| {
            r.borrow()
                .get(element)
                .is_ok_and(|el| el.style().display() != "none")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_state_strings() {
        assert_eq!(parse_ready_state("loading"), ReadyState::Loading);
        assert_eq!(parse_ready_state("interactive"), ReadyState::Interactive);
        assert_eq!(parse_ready_state("complete"), ReadyState::Complete);
    }
}
