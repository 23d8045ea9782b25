use std::fmt::Display;

/// The user's recorded decision about cookie / tracking usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConsentChoice {
    /// Tracking cookies are allowed.
    AcceptAll,
    /// Only cookies necessary for the site to function are allowed.
    AcceptNecessaryOnly,
    /// No decision has been recorded (or it could not be read).
    #[default]
    Unset,
}

impl ConsentChoice {
    /// Cookie value for this choice. `Unset` has no value: it is represented by
    /// the absence of the cookie.
    pub fn as_cookie_value(self) -> Option<&'static str> {
        match self {
            ConsentChoice::AcceptAll => Some("true"),
            ConsentChoice::AcceptNecessaryOnly => Some("false"),
            ConsentChoice::Unset => None,
        }
    }

    /// Maps the value of a present cookie back to a choice.
    ///
    /// A present cookie always records a decision: only `"true"` allows
    /// tracking, any other value (including an empty one) counts as
    /// [`AcceptNecessaryOnly`](ConsentChoice::AcceptNecessaryOnly).
    pub fn from_cookie_value(value: &str) -> Self {
        match value {
            "true" => ConsentChoice::AcceptAll,
            _ => ConsentChoice::AcceptNecessaryOnly,
        }
    }

    pub fn is_set(self) -> bool {
        self != ConsentChoice::Unset
    }

    pub fn tracking_allowed(self) -> bool {
        self == ConsentChoice::AcceptAll
    }
}

impl Display for ConsentChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsentChoice::AcceptAll => write!(f, "AcceptAll"),
            ConsentChoice::AcceptNecessaryOnly => write!(f, "AcceptNecessaryOnly"),
            ConsentChoice::Unset => write!(f, "Unset"),
        }
    }
}
