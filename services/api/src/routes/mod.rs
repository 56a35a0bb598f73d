use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Json;
use serde_json::json;
use terraviva::repository::RepositoryError;
use tracing::warn;

use crate::infra::AppState;

pub(crate) mod crm;
pub(crate) mod public;
pub(crate) mod uploads;

pub(crate) fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .merge(public::router())
        .merge(crm::router())
        .merge(uploads::router())
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

/// Uniform 500 for `Unavailable`; `NotFound` is handled where the route
/// knows which entity is missing.
pub(crate) fn storage_failure(err: RepositoryError) -> Response {
    warn!(%err, "storage operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error interno del servidor",
    )
        .into_response()
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_app;
    use axum::body::Body;
    use axum::http::Request;
    use axum_prometheus::PrometheusMetricLayer;
    use metrics_exporter_prometheus::PrometheusHandle;
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, OnceLock};
    use tempfile::TempDir;
    use terraviva::auth::session::SessionConfig;
    use terraviva::db::Database;
    use terraviva::domain::NewOwner;
    use terraviva::repository::{owners, prospects};
    use terraviva::uploads::UploadPolicy;
    use tower::ServiceExt;

    fn metrics_handle() -> Arc<PrometheusHandle> {
        // The prometheus recorder is process-global; build it once and share
        // the handle across tests.
        static HANDLE: OnceLock<Arc<PrometheusHandle>> = OnceLock::new();
        HANDLE
            .get_or_init(|| {
                let (_layer, handle) = PrometheusMetricLayer::pair();
                Arc::new(handle)
            })
            .clone()
    }

    fn test_app() -> (TempDir, Database, axum::Router) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Database::new(dir.path().join("test.db"));
        db.init_schema().expect("schema initializes");
        db.seed_default_user().expect("admin seeds");

        let state = AppState {
            db: db.clone(),
            uploads: UploadPolicy::new(dir.path().join("uploads")),
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: metrics_handle(),
        };
        let app = build_app(state, SessionConfig::new("route-test-secret"));
        (dir, db, app)
    }

    async fn send(app: &axum::Router, request: Request<Body>) -> axum::response::Response {
        app.clone().oneshot(request).await.expect("request handled")
    }

    fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).expect("request builds")
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).expect("request builds")
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    fn session_cookie_from(response: &axum::response::Response) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with("crm_session="))
            .and_then(|value| value.split(';').next())
            .map(|value| value.to_string())
    }

    async fn login(app: &axum::Router) -> String {
        let response = send(
            app,
            form_post("/crm/login", "username=admin&password=admin123", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie_from(&response).expect("login sets the session cookie")
    }

    #[tokio::test]
    async fn health_endpoint_is_public() {
        let (_dir, _db, app) = test_app();
        let response = send(&app, get_request("/health", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn crm_pages_without_session_redirect_to_login() {
        let (_dir, _db, app) = test_app();
        for uri in [
            "/crm/dashboard",
            "/crm/propietarios",
            "/crm/propiedades",
            "/prospectos",
        ] {
            let response = send(&app, get_request(uri, None)).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(
                response.headers().get(header::LOCATION).unwrap(),
                "/crm/login",
                "{uri}"
            );
        }
    }

    #[tokio::test]
    async fn upload_endpoint_without_session_is_unauthorized() {
        let (_dir, _db, app) = test_app();
        let response = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/upload_images")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_string(response).await;
        assert!(body.contains("\"success\":false"));
    }

    #[tokio::test]
    async fn login_with_seeded_admin_unlocks_the_dashboard() {
        let (_dir, _db, app) = test_app();
        let cookie = login(&app).await;

        let response = send(&app, get_request("/crm/dashboard", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("Administrador Principal"));
    }

    #[tokio::test]
    async fn login_with_wrong_password_rerenders_with_error_and_no_cookie() {
        let (_dir, _db, app) = test_app();
        let response = send(
            &app,
            form_post("/crm/login", "username=admin&password=wrong", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(session_cookie_from(&response).is_none());

        let body = body_string(response).await;
        assert!(body.contains("Usuario o contraseña incorrectos"));
    }

    #[tokio::test]
    async fn prospect_submission_without_phone_creates_nothing() {
        let (_dir, db, app) = test_app();
        let response = send(&app, form_post("/prospecto", "nombre=Ana", None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(prospects::list(&db).expect("list").is_empty());
    }

    #[tokio::test]
    async fn prospect_submission_persists_and_redirects_to_thanks() {
        let (_dir, db, app) = test_app();
        let response = send(
            &app,
            form_post("/prospecto", "nombre=Ana&telefono=555-0110", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/gracias"
        );

        let listed = prospects::list(&db).expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Ana");
        assert_eq!(listed[0].source, "direct");
        assert_eq!(listed[0].property_label, "Interés general");
    }

    #[tokio::test]
    async fn property_creation_is_blocked_until_an_owner_exists() {
        let (_dir, db, app) = test_app();
        let cookie = login(&app).await;

        let response = send(&app, get_request("/crm/propiedades/nueva", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/crm/propietarios?aviso=sin_propietarios"
        );

        owners::insert(
            &db,
            &NewOwner {
                name: "Rosa".to_string(),
                email: String::new(),
                phone: String::new(),
            },
        )
        .expect("owner inserts");

        let response = send(&app, get_request("/crm/propiedades/nueva", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn public_catalog_renders_and_missing_listing_is_404() {
        let (_dir, _db, app) = test_app();

        let response = send(&app, get_request("/propiedades", None)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, get_request("/propiedad/999", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upload_stores_allowed_images_and_skips_the_rest() {
        let (_dir, _db, app) = test_app();
        let cookie = login(&app).await;

        let boundary = "XTESTBOUNDARYX";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"images[]\"; filename=\"photo.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             fake-png-bytes\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"images[]\"; filename=\"photo.exe\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             MZ\r\n\
             --{boundary}--\r\n"
        );

        let request = Request::builder()
            .method("POST")
            .uri("/upload_images")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .header(header::COOKIE, &cookie)
            .body(Body::from(body))
            .expect("request builds");

        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let payload: serde_json::Value =
            serde_json::from_str(&body_string(response).await).expect("json body");
        assert_eq!(payload["success"], true);
        let paths = payload["paths"].as_array().expect("paths array");
        assert_eq!(paths.len(), 1, "the .exe must be skipped");
        let stored = paths[0].as_str().expect("path string");
        assert!(stored.starts_with("uploads/"));
        assert!(stored.ends_with("_photo.png"));
    }

    #[tokio::test]
    async fn home_redirects_by_session_state() {
        let (_dir, _db, app) = test_app();

        let response = send(&app, get_request("/", None)).await;
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/propiedades"
        );

        let cookie = login(&app).await;
        let response = send(&app, get_request("/", Some(&cookie))).await;
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/crm/dashboard"
        );
    }

    #[tokio::test]
    async fn language_cookie_is_set_from_accept_language_and_sticks() {
        let (_dir, _db, app) = test_app();

        let request = Request::builder()
            .uri("/propiedades")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .body(Body::empty())
            .expect("request builds");
        let response = send(&app, request).await;
        let language = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with("language="))
            .expect("language cookie set");
        assert!(language.starts_with("language=ingles"));

        // An explicit choice overrides the header from then on.
        let response = send(
            &app,
            get_request("/set_language/espanol", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
