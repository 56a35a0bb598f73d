use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Form, Router};
use serde::Deserialize;
use terraviva::auth::session::{self, CrmSession, OptionalSession, SessionConfig};
use terraviva::domain::{
    NewOwner, NewProperty, DEFAULT_PROPERTY_KIND, DEFAULT_PROPERTY_STATUS,
};
use terraviva::repository::{owners, properties, prospects, users, RepositoryError};
use tower_cookies::Cookies;
use tracing::warn;

use super::storage_failure;
use crate::infra::AppState;
use crate::views;

const NO_OWNERS_REDIRECT: &str = "/crm/propietarios?aviso=sin_propietarios";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/crm/login", get(login_form).post(login_submit))
        .route("/crm/logout", get(logout))
        .route("/crm/dashboard", get(dashboard))
        .route("/crm/propietarios", get(owners_screen).post(create_owner))
        .route(
            "/crm/propietarios/nuevo",
            get(new_owner_form).post(create_owner),
        )
        .route(
            "/crm/propietarios/editar/:id",
            get(edit_owner_form).post(update_owner),
        )
        .route("/crm/propietarios/eliminar/:id", get(delete_owner))
        .route("/crm/propietarios/:id", get(owner_detail))
        .route(
            "/crm/propiedades",
            get(properties_screen).post(create_property),
        )
        .route(
            "/crm/propiedades/nueva",
            get(new_property_form).post(create_property),
        )
        .route(
            "/crm/propiedades/editar/:id",
            get(edit_property_form).post(update_property),
        )
        .route("/crm/propiedades/eliminar/:id", get(delete_property))
        .route("/prospectos", get(prospects_screen))
}

// ---- session ----------------------------------------------------------

async fn login_form(session: OptionalSession) -> Response {
    if session.0.is_some() {
        return Redirect::to("/crm/dashboard").into_response();
    }
    views::login(false).into_response()
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login_submit(
    State(state): State<AppState>,
    Extension(session_config): Extension<SessionConfig>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return (StatusCode::BAD_REQUEST, "Faltan campos obligatorios").into_response();
    }

    match users::authenticate(&state.db, username, &form.password) {
        Ok(Some(user)) => match session::issue_token(&user, &session_config) {
            Ok(token) => {
                cookies.add(session::session_cookie(token));
                Redirect::to("/crm/dashboard").into_response()
            }
            Err(err) => {
                warn!(%err, "session issuance failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor").into_response()
            }
        },
        Ok(None) => views::login(true).into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn logout(_session: CrmSession, cookies: Cookies) -> Redirect {
    cookies.remove(session::removal_cookie());
    Redirect::to("/")
}

async fn dashboard(session: CrmSession, State(state): State<AppState>) -> Response {
    match owners::list(&state.db) {
        Ok(list) => views::dashboard(&session.0.display_name, &list).into_response(),
        Err(err) => storage_failure(err),
    }
}

// ---- owners -----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OwnersQuery {
    #[serde(default)]
    aviso: Option<String>,
}

async fn owners_screen(
    _session: CrmSession,
    State(state): State<AppState>,
    Query(query): Query<OwnersQuery>,
) -> Response {
    let owners = match owners::list(&state.db) {
        Ok(list) => list,
        Err(err) => return storage_failure(err),
    };
    let properties = match properties::list(&state.db) {
        Ok(list) => list,
        Err(err) => return storage_failure(err),
    };
    let warn_no_owners = query.aviso.as_deref() == Some("sin_propietarios");
    views::owners_page(&owners, &properties, warn_no_owners).into_response()
}

async fn new_owner_form(_session: CrmSession) -> Response {
    views::owner_form(None).into_response()
}

#[derive(Debug, Deserialize)]
struct OwnerForm {
    #[serde(default)]
    nombre: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    telefono: String,
}

impl OwnerForm {
    fn into_record(self) -> Option<NewOwner> {
        let name = self.nombre.trim().to_string();
        if name.is_empty() {
            return None;
        }
        Some(NewOwner {
            name,
            email: self.email.trim().to_string(),
            phone: self.telefono.trim().to_string(),
        })
    }
}

async fn create_owner(
    _session: CrmSession,
    State(state): State<AppState>,
    Form(form): Form<OwnerForm>,
) -> Response {
    let Some(owner) = form.into_record() else {
        return (StatusCode::BAD_REQUEST, "Faltan campos obligatorios").into_response();
    };
    match owners::insert(&state.db, &owner) {
        Ok(_) => Redirect::to("/crm/propietarios").into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn edit_owner_form(
    _session: CrmSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Response {
    match owners::get(&state.db, id) {
        Ok(Some(owner)) => views::owner_form(Some(&owner)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Propietario no encontrado").into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn update_owner(
    _session: CrmSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<OwnerForm>,
) -> Response {
    let Some(owner) = form.into_record() else {
        return (StatusCode::BAD_REQUEST, "Faltan campos obligatorios").into_response();
    };
    match owners::update(&state.db, id, &owner) {
        Ok(()) => Redirect::to("/crm/propietarios").into_response(),
        Err(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "Propietario no encontrado").into_response()
        }
        Err(err) => storage_failure(err),
    }
}

async fn delete_owner(
    _session: CrmSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Response {
    match owners::soft_delete(&state.db, id) {
        Ok(()) => Redirect::to("/crm/propietarios").into_response(),
        Err(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "Propietario no encontrado").into_response()
        }
        Err(err) => storage_failure(err),
    }
}

async fn owner_detail(
    _session: CrmSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Response {
    let owner = match owners::get(&state.db, id) {
        Ok(Some(owner)) => owner,
        Ok(None) => return (StatusCode::NOT_FOUND, "Propietario no encontrado").into_response(),
        Err(err) => return storage_failure(err),
    };
    match properties::list_by_owner(&state.db, id) {
        Ok(list) => views::owner_detail(&owner, &list).into_response(),
        Err(err) => storage_failure(err),
    }
}

// ---- properties -------------------------------------------------------

async fn properties_screen(_session: CrmSession, State(state): State<AppState>) -> Response {
    let owners = match owners::list(&state.db) {
        Ok(list) => list,
        Err(err) => return storage_failure(err),
    };
    let properties = match properties::list(&state.db) {
        Ok(list) => list,
        Err(err) => return storage_failure(err),
    };
    views::properties_page(&owners, &properties).into_response()
}

/// Creating a property requires at least one registered owner; the form is
/// never shown without one.
async fn new_property_form(_session: CrmSession, State(state): State<AppState>) -> Response {
    match owners::list(&state.db) {
        Ok(list) if list.is_empty() => Redirect::to(NO_OWNERS_REDIRECT).into_response(),
        Ok(list) => views::property_form(&list, None).into_response(),
        Err(err) => storage_failure(err),
    }
}

#[derive(Debug, Deserialize)]
struct PropertyForm {
    #[serde(default)]
    propietario_id: String,
    #[serde(default)]
    titulo_es: String,
    #[serde(default)]
    descripcion_es: String,
    #[serde(default)]
    titulo_en: String,
    #[serde(default)]
    descripcion_en: String,
    #[serde(default)]
    precio: String,
    #[serde(default)]
    ubicacion: String,
    #[serde(default)]
    tipo: String,
    #[serde(default)]
    estado: String,
    #[serde(default)]
    telefono_contacto: String,
    #[serde(default)]
    imagenes: String,
}

impl PropertyForm {
    fn into_record(self) -> Option<NewProperty> {
        let title_es = self.titulo_es.trim().to_string();
        let title_en = self.titulo_en.trim().to_string();
        if title_es.is_empty() || title_en.is_empty() {
            return None;
        }

        let kind = self.tipo.trim();
        let status = self.estado.trim();
        Some(NewProperty {
            owner_id: self.propietario_id.trim().parse().ok(),
            title_es,
            description_es: self.descripcion_es.trim().to_string(),
            title_en,
            description_en: self.descripcion_en.trim().to_string(),
            price: self.precio.trim().to_string(),
            location: self.ubicacion.trim().to_string(),
            kind: if kind.is_empty() {
                DEFAULT_PROPERTY_KIND.to_string()
            } else {
                kind.to_string()
            },
            status: if status.is_empty() {
                DEFAULT_PROPERTY_STATUS.to_string()
            } else {
                status.to_string()
            },
            images: self
                .imagenes
                .split(',')
                .map(str::trim)
                .filter(|path| !path.is_empty())
                .map(String::from)
                .collect(),
            contact_phone: self.telefono_contacto.trim().to_string(),
        })
    }
}

async fn create_property(
    _session: CrmSession,
    State(state): State<AppState>,
    Form(form): Form<PropertyForm>,
) -> Response {
    match owners::list(&state.db) {
        Ok(list) if list.is_empty() => return Redirect::to(NO_OWNERS_REDIRECT).into_response(),
        Ok(_) => {}
        Err(err) => return storage_failure(err),
    }

    let Some(property) = form.into_record() else {
        return (StatusCode::BAD_REQUEST, "Faltan campos obligatorios").into_response();
    };
    match properties::insert(&state.db, &property) {
        Ok(_) => Redirect::to("/crm/propiedades").into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn edit_property_form(
    _session: CrmSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Response {
    let property = match properties::get(&state.db, id) {
        Ok(Some(property)) => property,
        Ok(None) => return (StatusCode::NOT_FOUND, "Propiedad no encontrada").into_response(),
        Err(err) => return storage_failure(err),
    };
    match owners::list(&state.db) {
        Ok(list) => views::property_form(&list, Some(&property)).into_response(),
        Err(err) => storage_failure(err),
    }
}

async fn update_property(
    _session: CrmSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<PropertyForm>,
) -> Response {
    let Some(property) = form.into_record() else {
        return (StatusCode::BAD_REQUEST, "Faltan campos obligatorios").into_response();
    };
    match properties::update(&state.db, id, &property) {
        Ok(()) => Redirect::to("/crm/propiedades").into_response(),
        Err(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "Propiedad no encontrada").into_response()
        }
        Err(err) => storage_failure(err),
    }
}

async fn delete_property(
    _session: CrmSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Response {
    match properties::soft_delete(&state.db, id) {
        Ok(()) => Redirect::to("/crm/propiedades").into_response(),
        Err(RepositoryError::NotFound) => {
            (StatusCode::NOT_FOUND, "Propiedad no encontrada").into_response()
        }
        Err(err) => storage_failure(err),
    }
}

// ---- prospects --------------------------------------------------------

async fn prospects_screen(_session: CrmSession, State(state): State<AppState>) -> Response {
    match prospects::list(&state.db) {
        Ok(list) => views::prospects_page(&list).into_response(),
        Err(err) => storage_failure(err),
    }
}
