// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The session lifecycle: workspace, validator run, report discovery, verdict, persisted report.
//!
//! Both upload flows end with exactly one `<id>.txt` in the temp dir and, when the validator
//! produced any HTML, one promoted `<id>.html`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::task::JoinError;

use crate::classify::{FolderPolicy, ResultClassifier, StrictClassifier};
use crate::model::{SessionId, Upload, UploadMode, ValidationResult};
use crate::report::{self, Located, DEFAULT_MAX_DEPTH};
use crate::store::{SessionSeed, StoreError, TempStore, Workspace};
use crate::text::{
    decode_text, folder_file_name, is_text_like_extension, rewrite_font_terms, split_extension,
    to_ascii, to_ascii_str,
};
use crate::validator::{InvokeError, PackageMaker};

/// Prefix of folder session ids.
pub const FOLDER_SESSION_TAG: &str = "folder";

/// Date format used inside the consolidated folder report.
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No file found")]
    NoFile,
    #[error("No file selected")]
    EmptyFilename,
    #[error("No files found")]
    NoFiles,
    #[error("No files selected")]
    EmptyFileList,
    #[error("No XML files found in the uploaded folder")]
    NoXmlFiles,
    #[error("Error during validation: {0}")]
    Store(#[from] StoreError),
    #[error("Error during validation: {0}")]
    Invoke(#[from] InvokeError),
    #[error("Error during validation: {0}")]
    Task(#[from] JoinError),
}

impl PipelineError {
    /// Errors caused by what the client sent rather than by the server.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::NoFile | Self::EmptyFilename | Self::NoFiles | Self::EmptyFileList | Self::NoXmlFiles
        )
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Limit for single-file runs. `None` waits for the validator indefinitely.
    pub file_timeout: Option<Duration>,
    pub folder_timeout: Option<Duration>,
    /// Pause between a single-file run and the report scan.
    pub report_settle: Duration,
    pub max_walk_depth: usize,
    pub folder_classifier: Arc<dyn ResultClassifier>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            file_timeout: None,
            folder_timeout: Some(Duration::from_secs(120)),
            report_settle: Duration::from_secs(2),
            max_walk_depth: DEFAULT_MAX_DEPTH,
            folder_classifier: FolderPolicy::default().classifier(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    store: TempStore,
    validator: PackageMaker,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(store: TempStore, validator: PackageMaker, options: PipelineOptions) -> Self {
        Self {
            store,
            validator,
            options,
        }
    }

    pub fn store(&self) -> &TempStore {
        &self.store
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Validates one uploaded XML file.
    pub async fn validate_file(&self, upload: Upload) -> Result<ValidationResult, PipelineError> {
        if upload.filename().is_empty() {
            tracing::warn!("validation attempt with empty filename");
            return Err(PipelineError::EmptyFilename);
        }

        let store = self.store.clone();
        let (workspace, target) = blocking(move || {
            let workspace =
                store.create_session(SessionSeed::Filename(upload.filename()), Local::now())?;
            let target = store.save_file(&workspace, upload.filename(), upload.bytes())?;
            tracing::info!(
                session = %workspace.id(),
                path = ?target,
                bytes = upload.bytes().len(),
                "file saved"
            );
            Ok((workspace, target))
        })
        .await?;
        let id = workspace.id().clone();

        let invocation = self
            .validator
            .run(&target, UploadMode::SingleFile, self.options.file_timeout)
            .await?;

        if !self.options.report_settle.is_zero() {
            tokio::time::sleep(self.options.report_settle).await;
        }

        let store = self.store.clone();
        let max_depth = self.options.max_walk_depth;
        let finished = invocation.clone();
        let report = blocking(move || {
            let located = report::locate(workspace.dir(), max_depth);
            promote_canonical_html(&store, workspace.id(), &located);

            let report = match &located.text_report {
                Some(path) => {
                    let mut text = read_text_report(path);
                    // The report file predates the kill, so the limit would otherwise go unmentioned.
                    if finished.timed_out {
                        text.push_str("\n\nErrors:\n\n");
                        text.push_str(&finished.stderr);
                    }
                    text
                }
                None => {
                    tracing::info!(session = %workspace.id(), "no text report, using process output");
                    report::synthesized_text(&finished)
                }
            };

            let saved = store.write_report_text(workspace.id(), &report)?;
            tracing::info!(session = %workspace.id(), path = ?saved, "report saved");
            Ok(report)
        })
        .await?;

        let verdict = StrictClassifier.classify(&invocation, &report);
        log_verdict(&id, UploadMode::SingleFile, verdict.success);

        Ok(ValidationResult {
            success: verdict.success,
            report,
            report_id: id,
        })
    }

    /// Validates every uploaded file of a folder in one validator run.
    pub async fn validate_folder(
        &self,
        uploads: Vec<Upload>,
    ) -> Result<ValidationResult, PipelineError> {
        if uploads.is_empty() {
            tracing::warn!("folder validation attempt with empty file list");
            return Err(PipelineError::EmptyFileList);
        }

        let store = self.store.clone();
        let (workspace, staged) = blocking(move || {
            let workspace = store.create_session(SessionSeed::Tag(FOLDER_SESSION_TAG), Local::now())?;
            let staged = stage_folder(&store, &workspace, &uploads)?;
            Ok((workspace, staged))
        })
        .await?;
        let id = workspace.id().clone();

        if staged.xml.is_empty() {
            tracing::warn!(session = %id, "no XML files in uploaded folder");
            return Err(PipelineError::NoXmlFiles);
        }
        tracing::info!(
            session = %id,
            xml = staged.xml.len(),
            support = staged.support.len(),
            other_text = staged.other_text.len(),
            "folder staged"
        );

        let invocation = self
            .validator
            .run(workspace.dir(), UploadMode::Folder, self.options.folder_timeout)
            .await?;

        let verdict = self
            .options
            .folder_classifier
            .classify(&invocation, &invocation.stdout);

        let store = self.store.clone();
        let max_depth = self.options.max_walk_depth;
        let messages = verdict.stderr.clone();
        let report = blocking(move || {
            let located = report::locate(workspace.dir(), max_depth);
            promote_canonical_html(&store, workspace.id(), &located);

            let report = folder_report(&FolderReport {
                id: workspace.id(),
                date: Local::now(),
                xml_files: staged.xml.len(),
                support_files: staged.support.len(),
                messages: &messages,
                output: &invocation.stdout,
                html_reports: &located.html,
            });

            let saved = store.write_report_text(workspace.id(), &report)?;
            tracing::info!(session = %workspace.id(), path = ?saved, "report saved");
            Ok(report)
        })
        .await?;

        log_verdict(&id, UploadMode::Folder, verdict.success);

        Ok(ValidationResult {
            success: verdict.success,
            report,
            report_id: id,
        })
    }
}

/// Runs filesystem work (upload writes, report walks) on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T, PipelineError>
where
    F: FnOnce() -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

fn stage_folder(
    store: &TempStore,
    workspace: &Workspace,
    uploads: &[Upload],
) -> Result<StagedFolder, PipelineError> {
    let mut staged = StagedFolder::default();
    let mut used = HashSet::new();

    for upload in uploads {
        if upload.filename().is_empty() {
            continue;
        }

        let index = staged.xml.len() + staged.support.len();
        let name = unique_name(folder_file_name(upload.filename(), index), &mut used);
        let (_, ext) = split_extension(&name);

        if !is_text_like_extension(ext) {
            let path = store.save_file(workspace, &name, upload.bytes())?;
            tracing::info!(name = %name, original = %upload.filename(), "support file saved");
            staged.support.push(path);
            continue;
        }

        let (text, changed) = rewrite_font_terms(&decode_text(upload.bytes()));
        if changed {
            tracing::info!(name = %name, "font-related terms rewritten");
        }
        let path = store.save_file(workspace, &name, text.as_bytes())?;
        tracing::info!(name = %name, original = %upload.filename(), "text file saved");

        if ext == ".xml" {
            staged.xml.push(path);
        } else {
            staged.other_text.push(path);
        }
    }

    Ok(staged)
}

fn promote_canonical_html(store: &TempStore, id: &SessionId, located: &Located) {
    let Some(source) = located.canonical_html() else {
        return;
    };
    match store.promote_html(id, source) {
        Ok(dest) => tracing::info!(session = %id, from = ?source, to = ?dest, "html report promoted"),
        Err(err) => tracing::error!(session = %id, error = %err, "cannot promote html report"),
    }
}

#[derive(Debug, Default)]
struct StagedFolder {
    xml: Vec<PathBuf>,
    support: Vec<PathBuf>,
    other_text: Vec<PathBuf>,
}

/// Appends `_1`, `_2`, ... to the stem until `name` is unused.
fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let (stem, ext) = split_extension(&name);
    let mut counter = 1usize;
    loop {
        let candidate = format!("{stem}_{counter}{ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

fn read_text_report(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => {
            tracing::info!(path = ?path, "text report found");
            to_ascii(&bytes)
        }
        Err(err) => {
            tracing::error!(path = ?path, error = %err, "cannot read text report");
            to_ascii_str(&format!("Error reading text report: {err}"))
        }
    }
}

fn log_verdict(id: &SessionId, mode: UploadMode, success: bool) {
    if success {
        tracing::info!(session = %id, mode = mode.as_str(), "validation succeeded");
    } else {
        tracing::warn!(session = %id, mode = mode.as_str(), "validation failed");
    }
}

/// Inputs of the consolidated folder report.
#[derive(Debug)]
pub struct FolderReport<'a> {
    pub id: &'a SessionId,
    pub date: DateTime<Local>,
    pub xml_files: usize,
    pub support_files: usize,
    /// Stderr after classification.
    pub messages: &'a str,
    pub output: &'a str,
    pub html_reports: &'a [PathBuf],
}

pub fn folder_report(input: &FolderReport<'_>) -> String {
    let mut report = String::from("FOLDER VALIDATION REPORT\n");
    report.push_str(&format!("Session ID: {}\n", input.id));
    report.push_str(&format!("Date: {}\n", input.date.format(REPORT_DATE_FORMAT)));
    report.push_str(&format!("Total XML files: {}\n", input.xml_files));
    report.push_str(&format!("Total support files: {}\n\n", input.support_files));

    if !input.messages.is_empty() {
        report.push_str("VALIDATION MESSAGES:\n");
        report.push_str(input.messages);
        report.push_str("\n\n");
    }

    report.push_str("VALIDATOR OUTPUT:\n");
    report.push_str(input.output);

    if !input.html_reports.is_empty() {
        report.push_str("\n\nGENERATED HTML REPORTS:\n");
        for path in input.html_reports {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy())
                .unwrap_or_default();
            report.push_str(&format!("- {}\n", to_ascii_str(&name)));
        }
    }

    report
}
