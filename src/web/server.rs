// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::error::Error as StdError;
use std::fs;
use std::future::Future;
use std::io;
use std::path::Path as FsPath;
use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinError;

use crate::logging::LogHandle;
use crate::model::{SessionId, Upload, ValidationResult};
use crate::pipeline::{Pipeline, PipelineError};
use crate::report;
use crate::store::TempStore;
use crate::text::{sanitize_id, to_ascii, to_ascii_str};

use super::types::{ErrorBody, LogsQuery, DOWNLOAD_DISPOSITION, FILE_FIELD, FOLDER_FIELD};

mod pages;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

const JSON_CONTENT_TYPE: &str = "application/json";
const ASCII_JSON_CONTENT_TYPE: &str = "application/json; charset=ascii";
const FALLBACK_JSON: &str = "{\"error\": \"Internal error: the response could not be serialized\"}";

/// Shared handler state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
    logs: LogHandle,
    admin_key: Option<Arc<str>>,
    max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: Pipeline, logs: LogHandle) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            logs,
            admin_key: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Enables `/view_logs` for requests carrying this key. `None` keeps it disabled.
    pub fn with_admin_key(mut self, admin_key: Option<String>) -> Self {
        self.admin_key = admin_key.map(Arc::from);
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    fn store(&self) -> &TempStore {
        self.pipeline.store()
    }

    fn authorized(&self, key: Option<&str>) -> bool {
        match (self.admin_key.as_deref(), key) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/validate", post(validate_file))
        .route("/validate_folder", post(validate_folder))
        .route("/download_report/{id}", get(download_report))
        .route("/open_html_report/{id}", get(open_html_report))
        .route("/view_logs", get(view_logs))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

#[derive(Debug, thiserror::Error)]
enum RequestError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Cannot read upload: {0}")]
    Upload(#[from] MultipartError),
    #[error("Validation task failed: {0}")]
    Task(#[from] JoinError),
}

impl RequestError {
    fn is_input_error(&self) -> bool {
        match self {
            Self::Pipeline(err) => err.is_input_error(),
            Self::Upload(_) => true,
            Self::Task(_) => false,
        }
    }
}

fn error_chain(err: &dyn StdError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Serialises `value` as JSON. Never fails: a serialisation error yields a fixed ASCII body.
pub fn json_response<T: Serialize + ?Sized>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => ([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "cannot serialize response");
            ([(header::CONTENT_TYPE, ASCII_JSON_CONTENT_TYPE)], FALLBACK_JSON).into_response()
        }
    }
}

fn respond(result: Result<ValidationResult, RequestError>) -> Response {
    match result {
        Ok(result) => json_response(&result),
        Err(err) => {
            if err.is_input_error() {
                tracing::warn!(error = %err, "rejected upload");
            } else {
                tracing::error!(error = %error_chain(&err), "validation request failed");
            }
            json_response(&ErrorBody {
                error: to_ascii_str(&err.to_string()),
            })
        }
    }
}

/// Collects every file sent under `field_name`. A request that is not multipart at all is treated
/// as carrying no files.
async fn read_uploads(
    multipart: Result<Multipart, MultipartRejection>,
    field_name: &str,
) -> Result<Vec<Upload>, RequestError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "request is not a multipart upload");
            return Ok(Vec::new());
        }
    };

    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_owned();
        let bytes = field.bytes().await?;
        uploads.push(Upload::new(filename, bytes.to_vec()));
    }
    Ok(uploads)
}

async fn index() -> Html<&'static str> {
    Html(pages::INDEX)
}

async fn validate_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = async {
        let mut uploads = read_uploads(multipart, FILE_FIELD).await?;
        if uploads.is_empty() {
            return Err(PipelineError::NoFile.into());
        }
        let upload = uploads.swap_remove(0);
        tracing::info!(
            filename = %upload.filename(),
            bytes = upload.bytes().len(),
            "validation request"
        );

        // Spawned so a panic inside the pipeline comes back as a JoinError.
        let pipeline = state.pipeline.clone();
        let result = tokio::spawn(async move { pipeline.validate_file(upload).await }).await??;
        Ok::<_, RequestError>(result)
    }
    .await;

    respond(result)
}

async fn validate_folder(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = async {
        let uploads = read_uploads(multipart, FOLDER_FIELD).await?;
        if uploads.is_empty() {
            return Err(PipelineError::NoFiles.into());
        }
        tracing::info!(files = uploads.len(), "folder validation request");

        let pipeline = state.pipeline.clone();
        let result = tokio::spawn(async move { pipeline.validate_folder(uploads).await }).await??;
        Ok::<_, RequestError>(result)
    }
    .await;

    respond(result)
}

fn sanitized_id(raw: &str) -> String {
    let clean = sanitize_id(raw);
    if clean != raw {
        tracing::warn!(raw = %raw, sanitized = %clean, "report id sanitized");
    }
    clean
}

async fn download_report(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let clean = sanitized_id(&raw_id);
    tracing::info!(report = %clean, "download request");

    let not_found = || (StatusCode::NOT_FOUND, "Report not found").into_response();
    let Ok(id) = SessionId::new(clean) else {
        return not_found();
    };

    match state.store().read_report_text(&id) {
        Ok(Some(text)) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CONTENT_DISPOSITION, DOWNLOAD_DISPOSITION),
            ],
            text,
        )
            .into_response(),
        Ok(None) => {
            tracing::warn!(report = %id, "report not found");
            not_found()
        }
        Err(err) => {
            tracing::error!(report = %id, error = %error_chain(&err), "cannot read report");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error reading report").into_response()
        }
    }
}

/// Outcome of the HTML retrieval chain.
#[derive(Debug)]
enum HtmlReport {
    File(Vec<u8>),
    Explained(String),
    Generated(String),
    NotFound(String),
}

impl IntoResponse for HtmlReport {
    fn into_response(self) -> Response {
        match self {
            Self::File(bytes) => Html(bytes).into_response(),
            Self::Explained(page) | Self::Generated(page) | Self::NotFound(page) => {
                Html(page).into_response()
            }
        }
    }
}

async fn open_html_report(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let clean = sanitized_id(&raw_id);
    tracing::info!(report = %clean, "html report request");

    let page_id = clean.clone();
    match tokio::task::spawn_blocking(move || resolve_html_report(&state, &clean)).await {
        Ok(report) => report.into_response(),
        Err(err) => {
            tracing::error!(report = %page_id, error = %err, "html report lookup failed");
            Html(pages::report_not_found(&page_id)).into_response()
        }
    }
}

fn read_html(path: &FsPath) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => {
            tracing::info!(path = ?path, "serving html report");
            Some(bytes)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => {
            tracing::error!(path = ?path, error = %err, "cannot read html report");
            None
        }
    }
}

fn resolve_html_report(state: &AppState, clean_id: &str) -> HtmlReport {
    let Ok(id) = SessionId::new(clean_id) else {
        return HtmlReport::NotFound(pages::report_not_found(clean_id));
    };
    let store = state.store();

    if let Some(html) = read_html(&store.report_html_path(&id)) {
        return HtmlReport::File(html);
    }

    let max_depth = state.pipeline.options().max_walk_depth;
    for candidate in report::html_files(&store.workspace_dir(&id), max_depth) {
        if let Some(html) = read_html(&candidate) {
            return HtmlReport::File(html);
        }
    }

    if let Some(html) = read_html(&store.package_maker_error_html_path(&id)) {
        return HtmlReport::File(html);
    }

    match store.read_report_text(&id) {
        Ok(Some(text)) => {
            let paths = report::mentioned_html_paths(&text);
            if !paths.is_empty() {
                tracing::info!(report = %id, paths = paths.len(), "html report outside temp dir");
                return HtmlReport::Explained(pages::report_not_web_accessible(
                    id.as_str(),
                    &paths,
                ));
            }

            let page = pages::generated_report(&to_ascii_str(&text));
            match store.write_generated_html(&id, &page) {
                Ok(path) => tracing::info!(report = %id, path = ?path, "html generated from text"),
                Err(err) => {
                    tracing::error!(report = %id, error = %error_chain(&err), "cannot save generated html")
                }
            }
            return HtmlReport::Generated(page);
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!(report = %id, error = %error_chain(&err), "cannot read text report");
        }
    }

    tracing::warn!(report = %id, "html report not found");
    HtmlReport::NotFound(pages::report_not_found(id.as_str()))
}

async fn view_logs(State(state): State<AppState>, Query(query): Query<LogsQuery>) -> Response {
    if !state.authorized(query.key.as_deref()) {
        tracing::warn!("unauthorized log access attempt");
        return (StatusCode::FORBIDDEN, "Not authorized").into_response();
    }

    match state.logs.read() {
        Ok(bytes) => {
            tracing::info!(path = ?state.logs.path(), "logs viewed");
            Html(pages::logs(&to_ascii(&bytes))).into_response()
        }
        Err(err) => {
            tracing::error!(path = ?state.logs.path(), error = %err, "cannot read logs");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error reading logs: {}", to_ascii_str(&err.to_string())),
            )
                .into_response()
        }
    }
}
