//! Dialog markup.
//!
//! The dialog is built once, at presenter construction, from the configuration
//! and the resolved [`LocalizedContent`]:
//!
//! ```text
//! div.cookie-consent-modal[.block-access]
//! └ div.modal-content-wrap.<position>
//!   └ div.modal-content
//!     ├ div.modal-header  > h3.modal-title
//!     ├ div.modal-body    (body text with the privacy policy link)
//!     └ div.modal-footer  > div.buttons > button.btn-accept-necessary, button.btn-accept-all
//! ```
//!
//! Localized texts are inserted as markup (the body template may carry tags).
//! Attribute values taken from the configuration are escaped.

use crate::config::ConsentConfig;
use crate::content::LocalizedContent;
use html_escape::encode_quoted_attribute;

/// Class marker of the "accept necessary only" button.
pub const ACCEPT_NECESSARY_CLASS: &str = "btn-accept-necessary";
/// Class marker of the "accept all" button.
pub const ACCEPT_ALL_CLASS: &str = "btn-accept-all";
/// Modifier that makes the dialog overlay (and block) the whole page.
pub const BLOCK_ACCESS_CLASS: &str = "block-access";

/// Builds the inner markup of the dialog element.
pub fn build_markup(config: &ConsentConfig, content: &LocalizedContent) -> String {
    let mut modal_class = String::from("cookie-consent-modal");
    if config.block_access {
        modal_class.push(' ');
        modal_class.push_str(BLOCK_ACCESS_CLASS);
    }

    let link = format!(
        "<a href=\"{}\">{}</a>",
        encode_quoted_attribute(&config.privacy_policy_url),
        content.privacy_policy
    );

    let header = format!("<h3 class=\"modal-title\">{}</h3>", content.title);
    let body = content.body_with_link(&link);
    let footer = format!(
        "<div class='buttons'>\
         <button class='{ACCEPT_NECESSARY_CLASS} {}'>{}</button>\
         <button class='{ACCEPT_ALL_CLASS} {}'>{}</button>\
         </div>",
        encode_quoted_attribute(&config.button_secondary_class),
        content.button_accept_technical,
        encode_quoted_attribute(&config.button_primary_class),
        content.button_accept_all,
    );

    format!(
        "<div class=\"{}\">\
         <div class=\"modal-content-wrap {}\">\
         <div class=\"modal-content\">\
         <div class=\"modal-header\">{header}</div>\
         <div class=\"modal-body\">{body}</div>\
         <div class=\"modal-footer\">{footer}</div>\
         </div></div></div>",
        modal_class,
        encode_quoted_attribute(&config.position),
    )
}
