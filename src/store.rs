//! Persistence of the consent choice in a single named cookie.
//!
//! The cookie value is `"true"` (tracking allowed) or `"false"` (only
//! necessary cookies). It is written with `Path=/`, `SameSite=Strict` and an
//! expiry of *now + TTL*. Clearing writes an empty value that expired at the
//! epoch, which the cookie store drops immediately.
//!
//! The store never reports errors to its caller. An unavailable cookie
//! primitive reads as [`ConsentChoice::Unset`], and failed writes are logged
//! and otherwise ignored.

use crate::choice::ConsentChoice;
use crate::cookies::{Cookie, DocumentCookieHandle, SameSite};
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// Validity window of a recorded decision, in days.
pub const CONSENT_TTL_DAYS: i64 = 365;

/// Expiry used to invalidate the cookie.
const EXPIRED: OffsetDateTime = time::macros::datetime!(1970-01-01 00:00:01 UTC);

const SECONDS_PER_DAY: i64 = 86_400;

pub struct ConsentStore {
    cookie_name: String,
    cookies: DocumentCookieHandle,
}

impl std::fmt::Debug for ConsentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsentStore")
            .field("cookie_name", &self.cookie_name)
            .field("cookies", &"Arc<dyn DocumentCookie>")
            .finish()
    }
}

impl ConsentStore {
    pub fn new<S: Into<String>>(cookie_name: S, cookies: DocumentCookieHandle) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            cookies,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Records `choice` for `ttl_days` days. Writing [`ConsentChoice::Unset`] clears the cookie.
    ///
    /// Returns `false` when the cookie storage refused the write.
    pub fn write(&self, choice: ConsentChoice, ttl_days: i64) -> bool {
        let Some(value) = choice.as_cookie_value() else {
            return self.clear();
        };

        let expires = expiry_after(OffsetDateTime::now_utc(), ttl_days);
        let assignment = self.set_cookie_string(value, expires);
        match self.cookies.set_cookie(&assignment) {
            Ok(()) => {
                log::debug!("stored consent choice {} in cookie {}", choice, self.cookie_name);
                true
            }
            Err(e) => {
                log::warn!("cannot store consent cookie {}: {}", self.cookie_name, e);
                false
            }
        }
    }

    /// Reads the recorded choice. Only a missing cookie or unavailable storage is `Unset`.
    pub fn read(&self) -> ConsentChoice {
        match self.cookies.cookie_string() {
            Ok(raw) => find_cookie_value(&raw, &self.cookie_name)
                .map(ConsentChoice::from_cookie_value)
                .unwrap_or(ConsentChoice::Unset),
            Err(e) => {
                log::debug!("cookie storage unavailable, treating consent as unset: {}", e);
                ConsentChoice::Unset
            }
        }
    }

    /// Invalidates the consent cookie. Returns `false` when the cookie storage refused the write.
    pub fn clear(&self) -> bool {
        let assignment = self.set_cookie_string("", EXPIRED);
        match self.cookies.set_cookie(&assignment) {
            Ok(()) => {
                log::debug!("cleared consent cookie {}", self.cookie_name);
                true
            }
            Err(e) => {
                log::warn!("cannot clear consent cookie {}: {}", self.cookie_name, e);
                false
            }
        }
    }

    /// Builds the `document.cookie` assignment for `value` expiring at `expires`.
    pub fn set_cookie_string(&self, value: &str, expires: OffsetDateTime) -> String {
        Cookie::new(self.cookie_name.as_str(), value)
            .with_expires(expires)
            .with_path("/")
            .with_same_site(SameSite::Strict)
            .to_assignment()
    }
}

/// `now + ttl_days`, clamped to the representable range.
fn expiry_after(now: OffsetDateTime, ttl_days: i64) -> OffsetDateTime {
    ttl_days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|secs| now.checked_add(Duration::seconds(secs)))
        .unwrap_or_else(|| {
            log::warn!("consent TTL of {ttl_days} days is out of range, clamping the expiry");
            if ttl_days > 0 {
                PrimitiveDateTime::MAX.assume_utc()
            } else {
                EXPIRED
            }
        })
}

/// Finds the value of cookie `name` in a raw `document.cookie` string.
///
/// Pairs are separated by `;`. Leading spaces of each pair are skipped and the
/// pair must start with exactly `name=`, so `name` never matches a cookie
/// whose name merely starts with it.
pub fn find_cookie_value<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.split(';')
        .map(|pair| pair.trim_start_matches(' '))
        .find_map(|pair| {
            pair.strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{DocumentCookie, InMemoryDocumentCookie};
    use std::sync::Arc;

    const NAME: &str = "cookie-consent-tracking-allowed";

    fn store() -> (ConsentStore, Arc<InMemoryDocumentCookie>) {
        let jar = Arc::new(InMemoryDocumentCookie::new());
        (ConsentStore::new(NAME, jar.clone()), jar)
    }

    #[test]
    fn write_then_read_round_trips_both_choices() {
        let (store, _) = store();

        store.write(ConsentChoice::AcceptAll, CONSENT_TTL_DAYS);
        assert_eq!(store.read(), ConsentChoice::AcceptAll);

        store.write(ConsentChoice::AcceptNecessaryOnly, CONSENT_TTL_DAYS);
        assert_eq!(store.read(), ConsentChoice::AcceptNecessaryOnly);
    }

    #[test]
    fn fresh_store_reads_unset() {
        let (store, _) = store();
        assert_eq!(store.read(), ConsentChoice::Unset);
    }

    #[test]
    fn clear_then_read_is_unset() {
        let (store, jar) = store();
        store.write(ConsentChoice::AcceptAll, CONSENT_TTL_DAYS);
        store.clear();

        assert_eq!(store.read(), ConsentChoice::Unset);
        assert!(jar.get(NAME).is_none());
    }

    #[test]
    fn writing_unset_clears() {
        let (store, _) = store();
        store.write(ConsentChoice::AcceptNecessaryOnly, CONSENT_TTL_DAYS);
        store.write(ConsentChoice::Unset, CONSENT_TTL_DAYS);
        assert_eq!(store.read(), ConsentChoice::Unset);
    }

    #[test]
    fn written_cookie_has_path_samesite_and_future_expiry() {
        let (store, jar) = store();
        store.write(ConsentChoice::AcceptAll, CONSENT_TTL_DAYS);

        let cookie = jar.get(NAME).unwrap();
        assert_eq!(cookie.value, "true");
        assert_eq!(cookie.path.as_deref(), Some("/"));
        assert_eq!(cookie.same_site, Some(SameSite::Strict));

        let expires = cookie.expires_at().unwrap();
        let expected = OffsetDateTime::now_utc() + Duration::days(CONSENT_TTL_DAYS);
        assert!((expected - expires).abs() < Duration::minutes(1));
    }

    #[test]
    fn clear_string_uses_epoch_expiry() {
        let (store, _) = store();
        assert_eq!(
            store.set_cookie_string("", EXPIRED),
            "cookie-consent-tracking-allowed=; Expires=Thu, 01 Jan 1970 00:00:01 GMT; Path=/; SameSite=Strict;"
        );
    }

    #[test]
    fn unavailable_storage_reads_unset_and_writes_silently() {
        let jar = Arc::new(InMemoryDocumentCookie::disabled());
        let store = ConsentStore::new(NAME, jar);

        assert!(!store.write(ConsentChoice::AcceptAll, CONSENT_TTL_DAYS));
        assert!(!store.clear());
        assert_eq!(store.read(), ConsentChoice::Unset);
    }

    #[test]
    fn write_reports_success() {
        let (store, _) = store();
        assert!(store.write(ConsentChoice::AcceptAll, CONSENT_TTL_DAYS));
        assert!(store.clear());
    }

    #[test]
    fn huge_ttl_clamps_to_latest_expiry() {
        let (store, jar) = store();

        for ttl in [4_000_000, i64::MAX] {
            assert!(store.write(ConsentChoice::AcceptAll, ttl));
            assert_eq!(store.read(), ConsentChoice::AcceptAll);

            let expires = jar.get(NAME).unwrap().expires_at().unwrap();
            assert_eq!(expires.year(), 9999);
        }
    }

    #[test]
    fn hugely_negative_ttl_expires_the_cookie() {
        let (store, jar) = store();
        store.write(ConsentChoice::AcceptAll, CONSENT_TTL_DAYS);

        store.write(ConsentChoice::AcceptAll, i64::MIN);
        assert!(jar.get(NAME).is_none());
        assert_eq!(store.read(), ConsentChoice::Unset);
    }

    #[test]
    fn present_cookie_with_unknown_value_is_a_decision() {
        let (store, jar) = store();
        for value in ["maybe", ""] {
            jar.set_cookie(&format!("{NAME}={value}; Path=/")).unwrap();
            assert_eq!(store.read(), ConsentChoice::AcceptNecessaryOnly, "value {value:?}");
        }
    }

    #[test]
    fn find_skips_leading_whitespace() {
        let raw = "a=1;   cookie-consent-tracking-allowed=true; b=2";
        assert_eq!(find_cookie_value(raw, NAME), Some("true"));
    }

    #[test]
    fn find_does_not_match_name_prefix() {
        let raw = "cookie-consent-tracking-allowed-v2=true; other=1";
        assert_eq!(find_cookie_value(raw, NAME), None);

        let raw = "consent-extra=true; consent=false";
        assert_eq!(find_cookie_value(raw, "consent"), Some("false"));
    }

    #[test]
    fn find_does_not_match_inside_other_value() {
        let raw = "x=consent=true";
        assert_eq!(find_cookie_value(raw, "consent"), None);
    }

    #[test]
    fn find_first_match_wins() {
        assert_eq!(find_cookie_value("a=1; a=2", "a"), Some("1"));
        assert_eq!(find_cookie_value("", "a"), None);
        assert_eq!(find_cookie_value("a=", "a"), Some(""));
    }
}
