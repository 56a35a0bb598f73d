use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use terraviva::auth::session::CrmApiSession;
use terraviva::uploads::{ImageUpload, MAX_IMAGE_BYTES};
use tracing::warn;

use crate::infra::AppState;

/// Room for a handful of images at the per-file cap; axum's default 2 MiB
/// body limit would reject a single full-size photo.
const UPLOAD_BODY_LIMIT: usize = 4 * MAX_IMAGE_BYTES;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/upload_images", post(upload_images))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

async fn upload_images(
    _session: CrmApiSession,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut files = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                let Some(filename) = field.file_name().map(|name| name.to_string()) else {
                    continue;
                };
                match field.bytes().await {
                    Ok(bytes) => files.push(ImageUpload {
                        filename,
                        bytes: bytes.to_vec(),
                    }),
                    Err(err) => {
                        warn!(%err, "unreadable multipart field");
                        return error_response(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            "Error interno del servidor",
                        );
                    }
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(%err, "malformed multipart request");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor");
            }
        }
    }

    if files.is_empty() {
        return Json(json!({ "success": false, "error": "No hay archivos" })).into_response();
    }

    match state.uploads.store_images(&files) {
        Ok(paths) if !paths.is_empty() => {
            let message = format!("{} imagen(es) subida(s) correctamente", paths.len());
            Json(json!({ "success": true, "paths": paths, "message": message })).into_response()
        }
        Ok(_) => {
            Json(json!({ "success": false, "error": "No se pudieron subir las imágenes" }))
                .into_response()
        }
        Err(err) => {
            warn!(%err, "image storage failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "error": message }))).into_response()
}
