use cookie_consent::config::ConsentConfig;
use cookie_consent::cookies::JsonDocumentCookie;
use cookie_consent::dialog::ACCEPT_NECESSARY_CLASS;
use cookie_consent::document::InMemoryDocument;
use cookie_consent::{ConsentError, ConsentPresenter};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), ConsentError> {
    env_logger::init();

    // Configure the widget the way a page would: a partial JSON object of
    // overrides on top of the stock defaults.
    let config = ConsentConfig::from_json(
        r#"{
            "privacyPolicyUrl": "/privacy",
            "blockAccess": true,
            "position": "left"
        }"#,
    )?;

    // Cookies are kept in a JSON file, so a decision made in one run is still
    // there in the next one. Delete the file to see the dialog again.
    let cookie_path = std::env::temp_dir().join("cookie-consent-demo.json");
    let cookies = Arc::new(JsonDocumentCookie::open(cookie_path.clone())?);

    // The document starts out loading; the dialog is rendered once it is ready.
    let document = Arc::new(InMemoryDocument::loading().with_language("de-CH"));

    let modal_id = config.modal_id.clone();
    let config = ConsentConfig {
        post_selection_callback: Some(Arc::new(|| println!("post-selection callback invoked"))),
        ..config
    };
    let consent = Arc::new(ConsentPresenter::new(config, document.clone(), cookies));
    println!("dialog language: {}", consent.language());

    let mut events = consent.subscribe();
    let init = {
        let consent = consent.clone();
        tokio::spawn(async move { consent.init().await })
    };

    document.finish_loading();
    init.await.map_err(|e| ConsentError::Document(e.to_string()))?;

    match consent.dialog_element() {
        Some(dialog) => {
            println!("dialog markup:\n{}", document.inner_html(dialog).unwrap_or_default());
            document
                .click_selector(&modal_id, ACCEPT_NECESSARY_CLASS)
                .map_err(|e| ConsentError::Document(e.to_string()))?;
        }
        None => println!("decision already recorded in {}", cookie_path.display()),
    }

    while let Ok(event) = events.try_recv() {
        println!("event: {event}");
    }

    println!("choice: {}", consent.choice());
    println!("tracking allowed: {}", consent.tracking_allowed());

    Ok(())
}
