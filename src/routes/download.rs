use axum::{
    Router,
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    error::{AppError, AppResult},
    services::download_service::{self, PDF_CONTENT_TYPE},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{token}", get(download))
}

#[utoipa::path(
    get,
    path = "/api/download/{token}",
    params(("token" = String, Path, description = "Download token from the purchase")),
    responses(
        (status = 200, description = "The purchased book", content_type = "application/pdf", body = Vec<u8>),
        (status = 404, description = "Invalid or expired token, or the file is not available")
    ),
    tag = "Download"
)]
pub async fn download(
    State(state): State<AppState>,
    token: Result<Path<String>, PathRejection>,
) -> AppResult<Response> {
    // A path that cannot be decoded is just another unknown token.
    let Path(token) = token.map_err(|_| AppError::DownloadDenied)?;
    let asset = download_service::resolve_download(&state, &token, state.clock.now()).await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", asset.filename))
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        asset.bytes,
    )
        .into_response())
}
