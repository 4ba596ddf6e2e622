//! Database download endpoints

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::info;

use crate::error::{Result, WebError};
use crate::server::AppState;

fn database_path(state: &AppState) -> PathBuf {
    state
        .db
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&state.config.database.path))
}

/// Path of the database file with `suffix` appended (`-shm`, `-wal`)
fn companion_path(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Stream `path` back as an attachment
async fn send_file(path: PathBuf, request: Request) -> Result<Response> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "database.db".to_string());

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    match response.status() {
        StatusCode::NOT_FOUND => return Err(WebError::NotFound(path.display().to_string())),
        status if !status.is_success() => {
            return Err(WebError::Internal(format!(
                "serving {} failed with {}",
                path.display(),
                status
            )));
        }
        _ => {}
    }

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| WebError::Internal(e.to_string()))?;

    let mut response = response.map(Body::new);
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    info!("Sending {}", filename);
    Ok(response)
}

pub async fn download_db(State(state): State<AppState>, request: Request) -> Result<Response> {
    send_file(database_path(&state), request).await
}

pub async fn download_db_shm(State(state): State<AppState>, request: Request) -> Result<Response> {
    send_file(companion_path(&database_path(&state), "-shm"), request).await
}

pub async fn download_db_wal(State(state): State<AppState>, request: Request) -> Result<Response> {
    send_file(companion_path(&database_path(&state), "-wal"), request).await
}
