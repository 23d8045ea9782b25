//! The consent presenter: decides whether to show the dialog and records the
//! user's decision.
//!
//! # Lifecycle
//! 1. [`ConsentPresenter::new`] resolves the display language and builds the
//!    dialog markup once.
//! 2. [`init`](ConsentPresenter::init) shows the dialog when no decision is
//!    recorded and auto-show is enabled.
//! 3. The first [`show_dialog`](ConsentPresenter::show_dialog) waits for the
//!    document to finish loading, appends the dialog element and attaches the
//!    two click handlers. Later calls only make the retained element visible.
//! 4. A click on either button writes the consent cookie, hides the dialog and
//!    invokes the post-selection callback.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use cookie_consent::config::ConsentConfig;
//! use cookie_consent::cookies::InMemoryDocumentCookie;
//! use cookie_consent::document::InMemoryDocument;
//! use cookie_consent::presenter::ConsentPresenter;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let document = Arc::new(InMemoryDocument::new().with_language("en-US"));
//! let cookies = Arc::new(InMemoryDocumentCookie::new());
//! let consent = ConsentPresenter::new(ConsentConfig::default(), document.clone(), cookies);
//!
//! consent.init().await;
//! assert!(consent.is_dialog_visible());
//!
//! document.click_selector("cookieConsentModal", "btn-accept-all")?;
//! assert!(consent.tracking_allowed());
//! assert!(!consent.is_dialog_visible());
//! # Ok(()) }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::broadcast;

use crate::choice::ConsentChoice;
use crate::config::{ConsentConfig, PostSelectionCallback};
use crate::content::FALLBACK_LANGUAGE;
use crate::cookies::DocumentCookieHandle;
use crate::dialog::{build_markup, ACCEPT_ALL_CLASS, ACCEPT_NECESSARY_CLASS};
use crate::document::{ClickListener, Document, DocumentHandle, ElementHandle};
use crate::events::{ConsentEvent, DEFAULT_CHANNEL_CAPACITY};
use crate::store::{ConsentStore, CONSENT_TTL_DAYS};

pub struct ConsentPresenter {
    config: ConsentConfig,
    /// Language the dialog is displayed in.
    language: String,
    /// Dialog markup, built once.
    markup: String,
    store: Arc<ConsentStore>,
    document: DocumentHandle,
    /// The dialog element, retained after it has been created or adopted.
    dialog: Mutex<Option<ElementHandle>>,
    event_tx: broadcast::Sender<ConsentEvent>,
}

impl std::fmt::Debug for ConsentPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentPresenter")
            .field("language", &self.language)
            .field("store", &self.store)
            .field("dialog", &*self.dialog_slot())
            .finish_non_exhaustive()
    }
}

/// Everything a click handler needs, without a reference back to the presenter.
///
/// The document is held weakly: it owns the listeners built from this.
#[derive(Clone)]
struct Selection {
    store: Arc<ConsentStore>,
    document: Weak<dyn Document + Send + Sync>,
    dialog: ElementHandle,
    callback: Option<PostSelectionCallback>,
    event_tx: broadcast::Sender<ConsentEvent>,
}

impl Selection {
    fn listener(self, choice: ConsentChoice) -> ClickListener {
        Arc::new(move || self.select(choice))
    }

    fn select(&self, choice: ConsentChoice) {
        log::debug!("user selected {choice}");
        if self.store.write(choice, CONSENT_TTL_DAYS) {
            let _ = self.event_tx.send(ConsentEvent::ChoiceRecorded { choice });
        }

        let hidden = match self.document.upgrade() {
            Some(document) => document.set_visible(self.dialog, false),
            None => Err(anyhow::anyhow!("document is gone")),
        };
        match hidden {
            Ok(()) => {
                let _ = self.event_tx.send(ConsentEvent::DialogHidden);
            }
            Err(e) => log::warn!("cannot hide consent dialog: {e}"),
        }

        if let Some(callback) = &self.callback {
            callback();
        }
    }
}

impl ConsentPresenter {
    /// Creates a presenter rendering into `document` and persisting through `cookies`.
    ///
    /// The requested language is `config.lang`, else the document's language,
    /// else the fallback language; its primary subtag picks the content entry.
    pub fn new(config: ConsentConfig, document: DocumentHandle, cookies: DocumentCookieHandle) -> Self {
        let requested = config
            .lang
            .clone()
            .or_else(|| document.language())
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string());
        let language = config.content.resolve_language(&requested);
        let markup = build_markup(&config, config.content.for_language(&language));

        log::debug!("consent dialog language: requested {requested}, using {language}");

        let store = Arc::new(ConsentStore::new(config.cookie_name.clone(), cookies));
        let (event_tx, _first_rx) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);

        Self {
            config,
            language,
            markup,
            store,
            document,
            dialog: Mutex::new(None),
            event_tx,
        }
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    /// The language the dialog is displayed in.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// The dialog markup.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn store(&self) -> &ConsentStore {
        &self.store
    }

    /// Subscribe to presenter events. Only events sent after subscribing are received.
    pub fn subscribe(&self) -> broadcast::Receiver<ConsentEvent> {
        self.event_tx.subscribe()
    }

    /// Shows the dialog if no decision is recorded and auto-show is enabled.
    pub async fn init(&self) {
        if self.store.read() == ConsentChoice::Unset && self.config.auto_show_modal {
            self.show_dialog().await;
        }
    }

    /// Shows the dialog once the document is ready.
    ///
    /// The first call creates the dialog element and attaches the click
    /// handlers; later calls make the existing element visible again.
    pub async fn show_dialog(&self) {
        self.document.ready().wait().await;

        let mut slot = self.dialog_slot();
        if let Some(dialog) = *slot {
            self.set_dialog_visible(dialog, true);
            return;
        }

        if let Some(existing) = self.document.get_element_by_id(&self.config.modal_id) {
            log::debug!("adopting existing #{} element", self.config.modal_id);
            *slot = Some(existing);
            self.set_dialog_visible(existing, true);
            return;
        }

        match self.create_dialog() {
            Ok(dialog) => {
                *slot = Some(dialog);
                let _ = self.event_tx.send(ConsentEvent::DialogCreated);
                let _ = self.event_tx.send(ConsentEvent::DialogShown);
            }
            Err(e) => log::warn!("cannot create consent dialog: {e}"),
        }
    }

    /// Hides the dialog. The element stays in the document.
    pub fn hide_dialog(&self) {
        if let Some(dialog) = *self.dialog_slot() {
            self.set_dialog_visible(dialog, false);
        }
    }

    /// Clears the recorded decision and shows the dialog, regardless of auto-show.
    pub async fn reset(&self) {
        if self.store.clear() {
            let _ = self.event_tx.send(ConsentEvent::ConsentReset);
        }
        self.show_dialog().await;
    }

    /// `true` iff the recorded decision allows tracking.
    pub fn tracking_allowed(&self) -> bool {
        self.store.read().tracking_allowed()
    }

    /// The recorded decision.
    pub fn choice(&self) -> ConsentChoice {
        self.store.read()
    }

    /// The retained dialog element, if it has been shown at least once.
    pub fn dialog_element(&self) -> Option<ElementHandle> {
        *self.dialog_slot()
    }

    /// Whether the dialog exists and is currently visible.
    pub fn is_dialog_visible(&self) -> bool {
        self.dialog_element()
            .is_some_and(|dialog| self.document.is_visible(dialog))
    }

    fn create_dialog(&self) -> anyhow::Result<ElementHandle> {
        let dialog = self.document.append_element(&self.config.modal_id, &self.markup)?;

        let selection = Selection {
            store: self.store.clone(),
            document: Arc::downgrade(&self.document),
            dialog,
            callback: self.config.post_selection_callback.clone(),
            event_tx: self.event_tx.clone(),
        };

        for (class_marker, choice) in [
            (ACCEPT_NECESSARY_CLASS, ConsentChoice::AcceptNecessaryOnly),
            (ACCEPT_ALL_CLASS, ConsentChoice::AcceptAll),
        ] {
            let button = self
                .document
                .query_selector(dialog, class_marker)
                .ok_or_else(|| anyhow::anyhow!("dialog markup has no .{class_marker} button"))?;
            self.document
                .add_click_listener(button, selection.clone().listener(choice))?;
        }

        log::debug!("created consent dialog #{}", self.config.modal_id);
        Ok(dialog)
    }

    fn set_dialog_visible(&self, dialog: ElementHandle, visible: bool) {
        match self.document.set_visible(dialog, visible) {
            Ok(()) => {
                let event = if visible { ConsentEvent::DialogShown } else { ConsentEvent::DialogHidden };
                let _ = self.event_tx.send(event);
            }
            Err(e) => log::warn!("cannot change consent dialog visibility: {e}"),
        }
    }

    fn dialog_slot(&self) -> MutexGuard<'_, Option<ElementHandle>> {
        self.dialog.lock().unwrap_or_else(|e| e.into_inner())
    }
}
