use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;
use terraviva::auth::session::OptionalSession;
use terraviva::domain::{Language, NewProspect, DEFAULT_PROSPECT_SOURCE};
use terraviva::repository::{properties, prospects};

use super::storage_failure;
use crate::infra::{language_cookie, resolve_language, AppState};
use crate::views;
use tower_cookies::Cookies;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/propiedades", get(list_properties))
        .route("/propiedad/:id", get(property_landing))
        .route("/set_language/:language", get(set_language))
        .route("/prospecto", get(prospect_form).post(submit_prospect))
        .route("/gracias", get(thank_you))
}

async fn home(session: OptionalSession) -> Redirect {
    if session.0.is_some() {
        Redirect::to("/crm/dashboard")
    } else {
        Redirect::to("/propiedades")
    }
}

async fn list_properties(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
) -> Response {
    let language = resolve_language(&headers, &cookies);
    match properties::list(&state.db) {
        Ok(list) => views::property_list(&list, language).into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn property_landing(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    cookies: Cookies,
) -> Response {
    let language = resolve_language(&headers, &cookies);
    match properties::get(&state.db, id) {
        Ok(Some(property)) => views::property_landing(&property, language).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Propiedad no encontrada").into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn set_language(
    Path(language): Path<String>,
    headers: HeaderMap,
    cookies: Cookies,
) -> Redirect {
    if let Some(language) = Language::parse(&language) {
        cookies.add(language_cookie(language));
    }

    let back = headers
        .get(header::REFERER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("/propiedades");
    Redirect::to(back)
}

#[derive(Debug, Deserialize)]
struct ProspectFormQuery {
    #[serde(default)]
    phone: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    propiedad_id: Option<i64>,
}

async fn prospect_form(
    Query(query): Query<ProspectFormQuery>,
    headers: HeaderMap,
    cookies: Cookies,
) -> Response {
    let language = resolve_language(&headers, &cookies);
    let source = if query.source.trim().is_empty() {
        DEFAULT_PROSPECT_SOURCE
    } else {
        query.source.trim()
    };
    views::prospect_form(language, &query.phone, source, query.propiedad_id).into_response()
}

#[derive(Debug, Deserialize)]
struct ProspectSubmission {
    #[serde(default)]
    nombre: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    telefono: String,
    #[serde(default)]
    fuente: String,
    #[serde(default)]
    propiedad_id: String,
}

async fn submit_prospect(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookies: Cookies,
    Form(form): Form<ProspectSubmission>,
) -> Response {
    let language = resolve_language(&headers, &cookies);

    let name = form.nombre.trim();
    let phone = form.telefono.trim();
    if name.is_empty() || phone.is_empty() {
        return (StatusCode::BAD_REQUEST, "Faltan campos obligatorios").into_response();
    }

    let property_id = form.propiedad_id.trim().parse::<i64>().ok();
    let property_label = match property_id {
        Some(id) => match properties::get(&state.db, id) {
            Ok(Some(property)) => format!("{} (ID: {})", property.title_es, id),
            Ok(None) => String::new(),
            Err(err) => return storage_failure(err),
        },
        None => String::new(),
    };

    let source = form.fuente.trim();
    let prospect = NewProspect {
        name: name.to_string(),
        email: form.email.trim().to_string(),
        phone: phone.to_string(),
        source: if source.is_empty() {
            DEFAULT_PROSPECT_SOURCE.to_string()
        } else {
            source.to_string()
        },
        property_label: if property_label.is_empty() {
            "Interés general".to_string()
        } else {
            property_label
        },
        property_id,
        language: language.as_str().to_string(),
    };

    match prospects::insert(&state.db, &prospect) {
        Ok(_) => Redirect::to("/gracias").into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn thank_you(headers: HeaderMap, cookies: Cookies) -> Response {
    let language = resolve_language(&headers, &cookies);
    views::thank_you(language).into_response()
}
