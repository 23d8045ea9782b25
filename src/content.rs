//! Localized dialog content.
//!
//! A [`ContentBundle`] maps language codes (`"de"`, `"en"`, ...) to the
//! [`LocalizedContent`] shown in the consent dialog. The built-in bundle ships
//! German and English; callers may add languages or override the built-in
//! texts, but the fallback language ([`FALLBACK_LANGUAGE`]) is always present.
//!
//! # Example
//! ```rust
//! use cookie_consent::content::{ContentBundle, LocalizedContent};
//!
//! let mut bundle = ContentBundle::default();
//! bundle.insert("fr", LocalizedContent {
//!     title: "Paramètres des cookies".into(),
//!     body: "Voir notre --privacy-policy--.".into(),
//!     privacy_policy: "politique de confidentialité".into(),
//!     button_accept_all: "Accepter tous les cookies".into(),
//!     button_accept_technical: "Cookies techniques uniquement".into(),
//! });
//!
//! assert_eq!(bundle.resolve_language("fr-CA"), "fr");
//! assert_eq!(bundle.resolve_language("it"), "en");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language used whenever the requested language has no content entry.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Placeholder in [`LocalizedContent::body`] that is replaced by the privacy policy link.
pub const PRIVACY_POLICY_PLACEHOLDER: &str = "--privacy-policy--";

/// The texts of the consent dialog for a single language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedContent {
    /// Dialog title.
    pub title: String,
    /// Dialog body. May contain markup and the [`PRIVACY_POLICY_PLACEHOLDER`].
    pub body: String,
    /// Label of the privacy policy link.
    pub privacy_policy: String,
    /// Label of the "accept all" button.
    pub button_accept_all: String,
    /// Label of the "accept necessary only" button.
    pub button_accept_technical: String,
}

impl LocalizedContent {
    /// Returns the body with the placeholder replaced by `link`.
    ///
    /// Only the first placeholder occurrence is substituted.
    pub fn body_with_link(&self, link: &str) -> String {
        self.body.replacen(PRIVACY_POLICY_PLACEHOLDER, link, 1)
    }

    fn german() -> Self {
        Self {
            title: "Cookie-Einstellungen".into(),
            body: "Wir nutzen Cookies, um Inhalte zu personalisieren und die Zugriffe auf unsere Website zu analysieren. \
                   Sie können wählen, ob Sie nur für die Funktion der Website notwendige Cookies akzeptieren oder auch \
                   Tracking-Cookies zulassen möchten. Weitere Informationen finden Sie in unserer --privacy-policy--."
                .into(),
            privacy_policy: "Datenschutzerklärung".into(),
            button_accept_all: "Alle Cookies akzeptieren".into(),
            button_accept_technical: "Nur technisch notwendige Cookies akzeptieren".into(),
        }
    }

    fn english() -> Self {
        Self {
            title: "Cookie settings".into(),
            body: "We use cookies to personalize content and analyze access to our website. \
                   You can choose whether you only accept cookies that are necessary for the functioning of the website \
                   or whether you also want to allow tracking cookies. For more information, please refer to our --privacy-policy--."
                .into(),
            privacy_policy: "privacy policy".into(),
            button_accept_all: "Accept all cookies".into(),
            button_accept_technical: "Only accept technically necessary cookies".into(),
        }
    }
}

/// Localized content keyed by language code.
///
/// The bundle can never lose its fallback entry: [`ContentBundle::insert`] only
/// adds or replaces, and there is no removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBundle {
    entries: BTreeMap<String, LocalizedContent>,
}

impl Default for ContentBundle {
    /// The built-in `de` / `en` bundle.
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("de".to_string(), LocalizedContent::german());
        entries.insert(FALLBACK_LANGUAGE.to_string(), LocalizedContent::english());
        Self { entries }
    }
}

impl ContentBundle {
    /// Adds or replaces the content for `lang`.
    pub fn insert<S: Into<String>>(&mut self, lang: S, content: LocalizedContent) {
        self.entries.insert(lang.into(), content);
    }

    /// Merges `other` on top of this bundle, replacing languages present in both.
    pub fn extend<I>(&mut self, other: I)
    where
        I: IntoIterator<Item = (String, LocalizedContent)>,
    {
        self.entries.extend(other);
    }

    pub fn get(&self, lang: &str) -> Option<&LocalizedContent> {
        self.entries.get(lang)
    }

    pub fn contains(&self, lang: &str) -> bool {
        self.entries.contains_key(lang)
    }

    /// Language codes present in the bundle, in sorted order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolves the language that will actually be displayed for `requested`.
    ///
    /// The primary subtag (text before the first `-`) is looked up; when the
    /// bundle has no entry for it, [`FALLBACK_LANGUAGE`] is used.
    pub fn resolve_language(&self, requested: &str) -> String {
        let primary = primary_subtag(requested);
        if self.entries.contains_key(primary) {
            primary.to_string()
        } else {
            FALLBACK_LANGUAGE.to_string()
        }
    }

    /// Returns the content for `requested`, falling back like [`resolve_language`](Self::resolve_language).
    pub fn for_language(&self, requested: &str) -> &LocalizedContent {
        let lang = self.resolve_language(requested);
        self.entries
            .get(&lang)
            .or_else(|| self.entries.get(FALLBACK_LANGUAGE))
            .unwrap_or_else(|| unreachable!("content bundle always holds the fallback language"))
    }
}

/// Returns the text before the first hyphen (`"de-CH"` → `"de"`).
pub fn primary_subtag(locale: &str) -> &str {
    let locale = locale.trim();
    match locale.split_once('-') {
        Some((primary, _)) => primary,
        None => locale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bundle_has_de_and_en() {
        let bundle = ContentBundle::default();
        let langs: Vec<&str> = bundle.languages().collect();
        assert_eq!(langs, vec!["de", "en"]);
        assert_eq!(bundle.get("de").unwrap().title, "Cookie-Einstellungen");
        assert_eq!(bundle.get("en").unwrap().title, "Cookie settings");
    }

    #[test]
    fn region_subtag_resolves_to_primary() {
        let bundle = ContentBundle::default();
        assert_eq!(bundle.resolve_language("de-CH"), "de");
        assert_eq!(bundle.resolve_language("en-US"), "en");
        assert_eq!(bundle.for_language("de-AT").button_accept_all, "Alle Cookies akzeptieren");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let bundle = ContentBundle::default();
        assert_eq!(bundle.resolve_language("fr"), "en");
        assert_eq!(bundle.resolve_language(""), "en");
        assert_eq!(bundle.for_language("fr-FR").title, "Cookie settings");
    }

    #[test]
    fn inserted_language_is_resolved_and_can_override() {
        let mut bundle = ContentBundle::default();
        let mut custom = LocalizedContent::english();
        custom.title = "Cookies!".into();
        bundle.insert("en", custom);
        bundle.insert("nl", LocalizedContent::english());

        assert_eq!(bundle.resolve_language("nl-BE"), "nl");
        assert_eq!(bundle.for_language("en").title, "Cookies!");
        assert!(bundle.contains("de"));
    }

    #[test]
    fn body_link_substitution_replaces_first_placeholder_only() {
        let content = LocalizedContent {
            title: "t".into(),
            body: "see --privacy-policy-- and --privacy-policy--".into(),
            privacy_policy: "p".into(),
            button_accept_all: "a".into(),
            button_accept_technical: "n".into(),
        };
        assert_eq!(
            content.body_with_link("<a>x</a>"),
            "see <a>x</a> and --privacy-policy--"
        );
    }

    #[test]
    fn content_deserializes_from_camel_case_json() {
        let json = r#"{
            "title": "Réglages",
            "body": "--privacy-policy--",
            "privacyPolicy": "politique",
            "buttonAcceptAll": "Tout accepter",
            "buttonAcceptTechnical": "Nécessaires"
        }"#;
        let content: LocalizedContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.privacy_policy, "politique");
        assert_eq!(content.button_accept_technical, "Nécessaires");
    }
}
