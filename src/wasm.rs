//! WASM bindings for cookie-consent.
//!
//! Exposes the `CookieConsent` class, which renders the dialog into the
//! hosting page, plus free functions that only query or update the consent
//! cookie through the page's own `document.cookie`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::choice::ConsentChoice;
use crate::config::{ConsentConfig, PostSelectionCallback};
use crate::cookies::BrowserDocumentCookie;
use crate::document::BrowserDocument;
use crate::presenter::ConsentPresenter;
use crate::store::{ConsentStore, CONSENT_TTL_DAYS};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = JSON, catch)]
    fn stringify(value: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = Reflect, js_name = get, catch)]
    fn reflect_get(target: &JsValue, key: &JsValue) -> Result<JsValue, JsValue>;

    type JsCallback;

    #[wasm_bindgen(method, catch, js_name = call)]
    fn call(this: &JsCallback, this_arg: &JsValue) -> Result<JsValue, JsValue>;
}

thread_local! {
    /// JS callbacks stay on the page's thread; presenter closures refer to them by key.
    static CALLBACKS: RefCell<HashMap<Uuid, JsCallback>> = RefCell::new(HashMap::new());
}

/// Wraps `props.postSelectionCallback`, if it is a function.
fn post_selection_callback(props: &JsValue) -> Option<PostSelectionCallback> {
    let value = reflect_get(props, &JsValue::from_str("postSelectionCallback")).ok()?;
    if !value.is_function() {
        return None;
    }

    let key = Uuid::new_v4();
    CALLBACKS.with(|c| c.borrow_mut().insert(key, value.unchecked_into::<JsCallback>()));

    Some(Arc::new(move || {
        CALLBACKS.with(|c| {
            if let Some(callback) = c.borrow().get(&key) {
                if let Err(e) = callback.call(&JsValue::NULL) {
                    log::warn!("post-selection callback failed: {e:?}");
                }
            }
        })
    }))
}

fn config_from_props(props: &JsValue) -> Result<ConsentConfig, JsError> {
    if props.is_undefined() || props.is_null() {
        return Ok(ConsentConfig::default());
    }

    // Functions are dropped by JSON.stringify; the callback is picked up separately.
    let json = stringify(props)
        .ok()
        .and_then(|v| v.as_string())
        .ok_or_else(|| JsError::new("props cannot be serialized to JSON"))?;
    let mut config = ConsentConfig::from_json(&json).map_err(|e| JsError::new(&e.to_string()))?;
    if let Some(callback) = post_selection_callback(props) {
        config.post_selection_callback = Some(callback);
    }
    Ok(config)
}

/// The consent dialog bound to the hosting page.
#[wasm_bindgen]
pub struct CookieConsent {
    presenter: Arc<ConsentPresenter>,
}

#[wasm_bindgen]
impl CookieConsent {
    /// Creates the widget from a props object (camelCase keys, all optional).
    #[wasm_bindgen(constructor)]
    pub fn new(props: JsValue) -> Result<CookieConsent, JsError> {
        let config = config_from_props(&props)?;
        let document = BrowserDocument::new().map_err(|e| JsError::new(&e.to_string()))?;
        let presenter = ConsentPresenter::new(
            config,
            Arc::new(document),
            Arc::new(BrowserDocumentCookie::new()),
        );
        Ok(Self {
            presenter: Arc::new(presenter),
        })
    }

    /// Shows the dialog once the page has loaded, unless a decision is recorded.
    pub fn init(&self) {
        let presenter = self.presenter.clone();
        spawn_local(async move { presenter.init().await });
    }

    #[wasm_bindgen(js_name = showDialog)]
    pub fn show_dialog(&self) {
        let presenter = self.presenter.clone();
        spawn_local(async move { presenter.show_dialog().await });
    }

    #[wasm_bindgen(js_name = hideDialog)]
    pub fn hide_dialog(&self) {
        self.presenter.hide_dialog();
    }

    /// Clears the recorded decision and shows the dialog again.
    pub fn reset(&self) {
        let presenter = self.presenter.clone();
        spawn_local(async move { presenter.reset().await });
    }

    #[wasm_bindgen(js_name = trackingAllowed)]
    pub fn tracking_allowed(&self) -> bool {
        self.presenter.tracking_allowed()
    }

    /// The language the dialog is displayed in.
    #[wasm_bindgen(getter)]
    pub fn language(&self) -> String {
        self.presenter.language().to_string()
    }
}

fn store(cookie_name: &str) -> ConsentStore {
    ConsentStore::new(cookie_name, Arc::new(BrowserDocumentCookie::new()))
}

/// `true` iff the user accepted all cookies.
#[wasm_bindgen(js_name = "trackingAllowed")]
pub fn tracking_allowed(cookie_name: &str) -> bool {
    store(cookie_name).read().tracking_allowed()
}

/// Records the user's choice: `true` for "accept all", `false` for "necessary only".
#[wasm_bindgen(js_name = "recordConsent")]
pub fn record_consent(cookie_name: &str, tracking_allowed: bool) -> bool {
    let choice = if tracking_allowed {
        ConsentChoice::AcceptAll
    } else {
        ConsentChoice::AcceptNecessaryOnly
    };
    store(cookie_name).write(choice, CONSENT_TTL_DAYS)
}

/// Clears the recorded choice.
#[wasm_bindgen(js_name = "resetConsent")]
pub fn reset_consent(cookie_name: &str) -> bool {
    store(cookie_name).clear()
}
