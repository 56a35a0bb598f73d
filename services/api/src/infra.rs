use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use metrics_exporter_prometheus::PrometheusHandle;
use terraviva::db::Database;
use terraviva::domain::Language;
use terraviva::uploads::UploadPolicy;
use tower_cookies::{cookie::Cookie, Cookies};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) db: Database,
    pub(crate) uploads: UploadPolicy,
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) const LANGUAGE_COOKIE: &str = "language";

pub(crate) fn language_cookie(language: Language) -> Cookie<'static> {
    Cookie::build((LANGUAGE_COOKIE, language.as_str()))
        .path("/")
        .build()
}

/// Cookie first, Accept-Language second. The resolved value is written back
/// so the preference sticks for the rest of the session.
pub(crate) fn resolve_language(headers: &HeaderMap, cookies: &Cookies) -> Language {
    if let Some(cookie) = cookies.get(LANGUAGE_COOKIE) {
        if let Some(language) = Language::parse(cookie.value()) {
            return language;
        }
    }

    let header = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let language = Language::from_accept_language(header);
    cookies.add(language_cookie(language));
    language
}
