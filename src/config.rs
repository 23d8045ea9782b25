//! Consent widget configuration.
//!
//! `ConsentConfig` controls the look and behavior of a single
//! [`ConsentPresenter`](crate::presenter::ConsentPresenter): button classes,
//! the privacy policy link, the language, the dialog position, the localized
//! texts and the cookie that records the decision.
//!
//! `ConsentConfig` provides the stock defaults via [`Default`], a fluent
//! [`ConsentConfig::builder()`] with validation, and
//! [`ConsentConfig::from_json`] for callers that hand over a partial JSON
//! object of overrides (as a web page would).
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use cookie_consent::config::ConsentConfig;
//! let cfg = ConsentConfig::default();
//! assert_eq!(cfg.cookie_name, "cookie-consent-tracking-allowed");
//! assert!(cfg.auto_show_modal);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use cookie_consent::config::ConsentConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ConsentConfig::builder()
//!     .lang("de-CH")
//!     .privacy_policy_url("/datenschutz")
//!     .block_access(true)
//!     .position("left")
//!     .post_selection_callback(|| println!("decided"))
//!     .build()?; // returns Result<ConsentConfig, ConfigError>
//! # Ok(()) }
//! ```
//!
//! ## Overrides from JSON
//! ```rust
//! use cookie_consent::config::ConsentConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ConsentConfig::from_json(r#"{ "autoShowModal": false, "cookieName": "consent" }"#)?;
//! assert!(!cfg.auto_show_modal);
//! assert_eq!(cfg.cookie_name, "consent");
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`ConfigError`] when the cookie name is empty or
//! not a valid cookie token, or when the modal id is empty.

use crate::content::{ContentBundle, LocalizedContent};
use crate::errors::ConsentError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_COOKIE_NAME: &str = "cookie-consent-tracking-allowed";
pub const DEFAULT_MODAL_ID: &str = "cookieConsentModal";

/// Invoked without arguments after every user decision.
pub type PostSelectionCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct ConsentConfig {
    /// Classes of the "accept all" button.
    pub button_primary_class: String,
    /// Classes of the "accept necessary" button.
    pub button_secondary_class: String,
    /// Target of the privacy policy link in the dialog body.
    pub privacy_policy_url: String,
    /// Show the dialog from `init()` when no decision is recorded.
    pub auto_show_modal: bool,
    /// Requested locale. `None` uses the host document's language.
    pub lang: Option<String>,
    /// Adds the `block-access` modifier, which overlays the whole page.
    pub block_access: bool,
    /// Position modifier class of the dialog (`"right"`, `"left"`, ...).
    pub position: String,
    pub post_selection_callback: Option<PostSelectionCallback>,
    /// Dialog texts per language.
    pub content: ContentBundle,
    /// Name of the cookie recording the decision.
    pub cookie_name: String,
    /// Id of the dialog element.
    pub modal_id: String,
}

impl fmt::Debug for ConsentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsentConfig")
            .field("button_primary_class", &self.button_primary_class)
            .field("button_secondary_class", &self.button_secondary_class)
            .field("privacy_policy_url", &self.privacy_policy_url)
            .field("auto_show_modal", &self.auto_show_modal)
            .field("lang", &self.lang)
            .field("block_access", &self.block_access)
            .field("position", &self.position)
            .field("post_selection_callback", &self.post_selection_callback.as_ref().map(|_| "Fn()"))
            .field("content", &self.content.languages().collect::<Vec<_>>())
            .field("cookie_name", &self.cookie_name)
            .field("modal_id", &self.modal_id)
            .finish()
    }
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            button_primary_class: "btn btn-primary".into(),
            button_secondary_class: "btn btn-secondary".into(),
            privacy_policy_url: "privacy-policy.html".into(),
            auto_show_modal: true,
            lang: None,
            block_access: false,
            position: "right".into(),
            post_selection_callback: None,
            content: ContentBundle::default(),
            cookie_name: DEFAULT_COOKIE_NAME.into(),
            modal_id: DEFAULT_MODAL_ID.into(),
        }
    }
}

impl ConsentConfig {
    pub fn builder() -> ConsentConfigBuilder {
        ConsentConfigBuilder::default()
    }

    /// Builds a configuration from a JSON object of overrides on top of the defaults.
    ///
    /// Unknown keys are ignored. `content` entries are merged into the
    /// built-in bundle.
    pub fn from_json(json: &str) -> Result<ConsentConfig, ConsentError> {
        let overrides: ConfigOverrides = serde_json::from_str(json)?;
        Ok(ConsentConfig::builder().overrides(overrides).build()?)
    }
}

/// Partial configuration as supplied by a caller. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigOverrides {
    pub button_primary_class: Option<String>,
    pub button_secondary_class: Option<String>,
    pub privacy_policy_url: Option<String>,
    pub auto_show_modal: Option<bool>,
    pub lang: Option<String>,
    pub block_access: Option<bool>,
    pub position: Option<String>,
    pub content: Option<BTreeMap<String, LocalizedContent>>,
    pub cookie_name: Option<String>,
    pub modal_id: Option<String>,
}

impl ConfigOverrides {
    /// Applies every present field onto `config`.
    pub fn apply(self, config: &mut ConsentConfig) {
        if let Some(v) = self.button_primary_class {
            config.button_primary_class = v;
        }
        if let Some(v) = self.button_secondary_class {
            config.button_secondary_class = v;
        }
        if let Some(v) = self.privacy_policy_url {
            config.privacy_policy_url = v;
        }
        if let Some(v) = self.auto_show_modal {
            config.auto_show_modal = v;
        }
        if let Some(v) = self.lang {
            config.lang = Some(v);
        }
        if let Some(v) = self.block_access {
            config.block_access = v;
        }
        if let Some(v) = self.position {
            config.position = v;
        }
        if let Some(v) = self.content {
            config.content.extend(v);
        }
        if let Some(v) = self.cookie_name {
            config.cookie_name = v;
        }
        if let Some(v) = self.modal_id {
            config.modal_id = v;
        }
    }
}

/// Builder for [`ConsentConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConsentConfigBuilder {
    inner: ConsentConfig,
}

impl ConsentConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ConsentConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn button_primary_class<S: Into<String>>(self, class: S) -> Self { self.map(|c| c.button_primary_class = class.into()) }
    pub fn button_secondary_class<S: Into<String>>(self, class: S) -> Self { self.map(|c| c.button_secondary_class = class.into()) }
    pub fn privacy_policy_url<S: Into<String>>(self, url: S) -> Self { self.map(|c| c.privacy_policy_url = url.into()) }
    pub fn auto_show_modal(self, on: bool) -> Self { self.map(|c| c.auto_show_modal = on) }
    pub fn lang<S: Into<String>>(self, lang: S) -> Self { self.map(|c| c.lang = Some(lang.into())) }
    pub fn block_access(self, on: bool) -> Self { self.map(|c| c.block_access = on) }
    pub fn position<S: Into<String>>(self, position: S) -> Self { self.map(|c| c.position = position.into()) }
    pub fn cookie_name<S: Into<String>>(self, name: S) -> Self { self.map(|c| c.cookie_name = name.into()) }
    pub fn modal_id<S: Into<String>>(self, id: S) -> Self { self.map(|c| c.modal_id = id.into()) }

    pub fn post_selection_callback<F>(self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.map(|c| c.post_selection_callback = Some(Arc::new(f)))
    }

    /// Adds or replaces the texts for `lang`.
    pub fn content<S: Into<String>>(self, lang: S, content: LocalizedContent) -> Self {
        self.map(|c| c.content.insert(lang, content))
    }

    /// Applies a set of caller overrides.
    pub fn overrides(self, overrides: ConfigOverrides) -> Self { self.map(|c| overrides.apply(c)) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ConsentConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ConsentConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyCookieName,
    InvalidCookieName(String),
    EmptyModalId,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyCookieName =>
                write!(f, "cookie_name must not be empty"),
            ConfigError::InvalidCookieName(name) =>
                write!(f, "cookie_name {name:?} contains characters not allowed in a cookie name"),
            ConfigError::EmptyModalId =>
                write!(f, "modal_id must not be empty"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(c: &ConsentConfig) -> Result<(), ConfigError> {
    if c.cookie_name.is_empty() {
        return Err(ConfigError::EmptyCookieName);
    }
    if c.cookie_name.chars().any(|ch| ch == '=' || ch == ';' || ch == ',' || ch.is_whitespace() || ch.is_control()) {
        return Err(ConfigError::InvalidCookieName(c.cookie_name.clone()));
    }
    if c.modal_id.trim().is_empty() {
        return Err(ConfigError::EmptyModalId);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn defaults_match_stock_widget() {
        let c = ConsentConfig::default();
        assert_eq!(c.button_primary_class, "btn btn-primary");
        assert_eq!(c.button_secondary_class, "btn btn-secondary");
        assert_eq!(c.privacy_policy_url, "privacy-policy.html");
        assert!(c.auto_show_modal);
        assert!(c.lang.is_none());
        assert!(!c.block_access);
        assert_eq!(c.position, "right");
        assert!(c.post_selection_callback.is_none());
        assert!(c.content.contains("de"));
        assert!(c.content.contains("en"));
        assert_eq!(c.cookie_name, DEFAULT_COOKIE_NAME);
        assert_eq!(c.modal_id, DEFAULT_MODAL_ID);
    }

    #[test]
    fn builder_sets_fields() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let c = ConsentConfig::builder()
            .button_primary_class("primary")
            .button_secondary_class("secondary")
            .privacy_policy_url("/privacy")
            .auto_show_modal(false)
            .lang("de-CH")
            .block_access(true)
            .position("left")
            .cookie_name("consent")
            .modal_id("consentDialog")
            .post_selection_callback(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        assert_eq!(c.button_primary_class, "primary");
        assert_eq!(c.button_secondary_class, "secondary");
        assert_eq!(c.privacy_policy_url, "/privacy");
        assert!(!c.auto_show_modal);
        assert_eq!(c.lang.as_deref(), Some("de-CH"));
        assert!(c.block_access);
        assert_eq!(c.position, "left");
        assert_eq!(c.cookie_name, "consent");
        assert_eq!(c.modal_id, "consentDialog");

        (c.post_selection_callback.unwrap())();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn validation_rejects_bad_cookie_names() {
        assert_eq!(
            ConsentConfig::builder().cookie_name("").build().unwrap_err(),
            ConfigError::EmptyCookieName
        );
        for bad in ["a=b", "a;b", "a b", "a,b"] {
            assert!(matches!(
                ConsentConfig::builder().cookie_name(bad).build(),
                Err(ConfigError::InvalidCookieName(_))
            ));
        }
    }

    #[test]
    fn validation_rejects_empty_modal_id() {
        assert_eq!(
            ConsentConfig::builder().modal_id(" ").build().unwrap_err(),
            ConfigError::EmptyModalId
        );
    }

    #[test]
    fn json_overrides_apply_on_defaults() {
        let c = ConsentConfig::from_json(
            r#"{
                "buttonPrimaryClass": "button is-primary",
                "autoShowModal": false,
                "lang": "fr",
                "content": {
                    "fr": {
                        "title": "Cookies",
                        "body": "Voir --privacy-policy--",
                        "privacyPolicy": "confidentialité",
                        "buttonAcceptAll": "Tout accepter",
                        "buttonAcceptTechnical": "Nécessaires uniquement"
                    }
                },
                "somethingUnknown": 42
            }"#,
        )
        .unwrap();

        assert_eq!(c.button_primary_class, "button is-primary");
        assert_eq!(c.button_secondary_class, "btn btn-secondary");
        assert!(!c.auto_show_modal);
        assert_eq!(c.lang.as_deref(), Some("fr"));
        assert!(c.content.contains("fr"));
        assert!(c.content.contains("en"));
        assert!(c.content.contains("de"));
    }

    #[test]
    fn json_overrides_are_validated() {
        let err = ConsentConfig::from_json(r#"{ "cookieName": "bad name" }"#).unwrap_err();
        assert!(matches!(err, ConsentError::InvalidConfig(ConfigError::InvalidCookieName(_))));

        let err = ConsentConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConsentError::Json(_)));
    }

    #[test]
    fn debug_hides_callback() {
        let c = ConsentConfig::builder().post_selection_callback(|| {}).build().unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("ConsentConfig"));
        assert!(dbg.contains("Fn()"));
    }
}
