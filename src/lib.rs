pub mod choice;
pub mod config;
pub mod content;
pub mod cookies;
pub mod dialog;
pub mod document;
pub mod errors;
pub mod events;
pub mod presenter;
pub mod store;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use choice::ConsentChoice;
pub use config::{ConfigOverrides, ConsentConfig};
pub use errors::ConsentError;
pub use events::ConsentEvent;
pub use presenter::ConsentPresenter;
pub use store::ConsentStore;
