//! Consent widget events.
//!
//! A [`ConsentPresenter`](crate::presenter::ConsentPresenter) publishes
//! [`ConsentEvent`]s on a broadcast channel. Subscribe with
//! [`ConsentPresenter::subscribe`](crate::presenter::ConsentPresenter::subscribe);
//! you only receive events sent after subscribing.

use crate::choice::ConsentChoice;
use std::fmt::Display;

/// Capacity of the presenter's event channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Events emitted by the consent presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentEvent {
    /// The dialog element was created and its click handlers attached.
    DialogCreated,
    /// The dialog became visible.
    DialogShown,
    /// The dialog was hidden.
    DialogHidden,
    /// The user picked a choice and it was written to the consent cookie.
    ChoiceRecorded { choice: ConsentChoice },
    /// `reset()` cleared the stored choice.
    ConsentReset,
}

impl Display for ConsentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsentEvent::DialogCreated => write!(f, "dialog created"),
            ConsentEvent::DialogShown => write!(f, "dialog shown"),
            ConsentEvent::DialogHidden => write!(f, "dialog hidden"),
            ConsentEvent::ChoiceRecorded { choice } => write!(f, "choice recorded: {choice}"),
            ConsentEvent::ConsentReset => write!(f, "consent reset"),
        }
    }
}
