use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use dashmap::DashMap;

use crate::models::SearchResult;

pub const SESSION_COOKIE: &str = "sid";
pub const FLASH_COOKIE: &str = "flash";

/// Pending search results per browser session, kept until picked up or expired.
#[derive(Clone)]
pub struct SearchStash {
    entries: Arc<DashMap<String, StashEntry>>,
    ttl_seconds: i64,
}

struct StashEntry {
    results: Vec<SearchResult>,
    stored_at: i64,
}

impl SearchStash {
    pub fn new(ttl_seconds: i64) -> Self {
        Self { entries: Arc::new(DashMap::new()), ttl_seconds }
    }

    /// Stores the latest results for a session, replacing whatever was there.
    pub fn put(&self, session_id: &str, results: Vec<SearchResult>) {
        self.put_at(session_id, results, now_sec());
    }

    /// Removes and returns the session's results. Expired entries read as absent.
    pub fn take(&self, session_id: &str) -> Option<Vec<SearchResult>> {
        self.take_at(session_id, now_sec())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn put_at(&self, session_id: &str, results: Vec<SearchResult>, now: i64) {
        self.sweep(now);
        self.entries.insert(session_id.to_string(), StashEntry { results, stored_at: now });
    }

    fn take_at(&self, session_id: &str, now: i64) -> Option<Vec<SearchResult>> {
        let (_, entry) = self.entries.remove(session_id)?;
        self.is_fresh(entry.stored_at, now).then_some(entry.results)
    }

    fn sweep(&self, now: i64) {
        self.entries.retain(|_, entry| self.is_fresh(entry.stored_at, now));
    }

    fn is_fresh(&self, stored_at: i64, now: i64) -> bool {
        now.saturating_sub(stored_at) <= self.ttl_seconds
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

/// Returns the session id carried by the signed cookie, issuing a new one if absent.
pub fn ensure_session(jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(existing) = jar.get(SESSION_COOKIE) {
        let id = existing.value().to_string();
        return (jar, id);
    }

    let id = uuid::Uuid::new_v4().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), id)
}

pub fn session_id(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub fn set_flash(jar: SignedCookieJar, message: &str) -> SignedCookieJar {
    let cookie = Cookie::build((FLASH_COOKIE, message.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(5))
        .build();
    jar.add(cookie)
}

/// Reads the one-shot flash message and clears it.
pub fn take_flash(jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
    match jar.get(FLASH_COOKIE) {
        Some(cookie) => {
            let message = cookie.value().to_string();
            (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), Some(message))
        },
        None => (jar, None),
    }
}
