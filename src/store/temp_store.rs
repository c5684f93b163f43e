// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};

use crate::model::{IdError, SessionId};
use crate::text::{
    decode_text, sanitize_filename, sanitize_id, split_extension, to_ascii_str, upload_basename,
};

mod helpers;

use helpers::{create_dir_refusing_symlinks, item_age, write_atomic_in_root};

/// Timestamp suffix appended to every session id (second resolution).
pub const SESSION_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Number of random suffixes tried when a timestamped id is already taken.
const SESSION_ID_RETRIES: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid session id {value:?}: {source}")]
    InvalidId {
        value: String,
        #[source]
        source: IdError,
    },
    #[error("path is outside temp dir: root={root:?} path={path:?}")]
    PathOutsideRoot { root: PathBuf, path: PathBuf },
    #[error("refusing to write through symlink at {path:?}")]
    SymlinkRefused { path: PathBuf },
    #[error("every candidate session directory for {base:?} already exists")]
    SessionIdExhausted { base: String },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Writes a temp file and renames it into place, without fsync.
    #[default]
    BestEffort,

    /// Additionally syncs file contents and the parent directory where the platform allows.
    Durable,
}

/// What a new session id is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSeed<'a> {
    /// Single-file flow: the stem of the uploaded filename.
    Filename(&'a str),
    /// Folder flow: a literal tag such as `folder`.
    Tag(&'a str),
}

impl SessionSeed<'_> {
    fn prefix(&self) -> &str {
        match self {
            Self::Filename(name) => split_extension(upload_basename(*name)).0,
            Self::Tag(tag) => *tag,
        }
    }
}

/// A freshly created per-session directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    id: SessionId,
    dir: PathBuf,
}

impl Workspace {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSummary {
    pub removed: usize,
    pub failed: usize,
}

/// The shared temp directory: one workspace subdirectory per session plus the flat report files
/// keyed by session id (`<id>.txt`, `<id>.html`, `<id>_generated.html`).
#[derive(Debug, Clone)]
pub struct TempStore {
    root: PathBuf,
    durability: WriteDurability,
}

impl TempStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_root(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })
    }

    pub fn workspace_dir(&self, id: &SessionId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn report_text_path(&self, id: &SessionId) -> PathBuf {
        self.root.join(format!("{id}.txt"))
    }

    pub fn report_html_path(&self, id: &SessionId) -> PathBuf {
        self.root.join(format!("{id}.html"))
    }

    pub fn generated_html_path(&self, id: &SessionId) -> PathBuf {
        self.root.join(format!("{id}_generated.html"))
    }

    /// Where xml_package_maker leaves its HTML error report when it works beside the target.
    pub fn package_maker_error_html_path(&self, id: &SessionId) -> PathBuf {
        self.root
            .join(format!("{id}_xpm"))
            .join("errors")
            .join("xpm.html")
    }

    /// Allocates a session id from `seed` and `now`, and creates its workspace directory.
    ///
    /// If the timestamped id is already taken (two uploads in the same second) a short random
    /// suffix is appended. Any other directory creation failure is returned as is.
    pub fn create_session(
        &self,
        seed: SessionSeed<'_>,
        now: DateTime<Local>,
    ) -> Result<Workspace, StoreError> {
        self.ensure_root()?;

        let base = sanitize_id(&to_ascii_str(&format!(
            "{}-{}",
            seed.prefix(),
            now.format(SESSION_TIMESTAMP_FORMAT)
        )));

        let mut candidate = base.clone();
        for _ in 0..SESSION_ID_RETRIES {
            let id = SessionId::new(candidate.clone()).map_err(|source| StoreError::InvalidId {
                value: candidate.clone(),
                source,
            })?;
            let dir = self.workspace_dir(&id);

            match create_dir_refusing_symlinks(&dir) {
                Ok(()) => return Ok(Workspace { id, dir }),
                Err(StoreError::Io { source, .. })
                    if source.kind() == io::ErrorKind::AlreadyExists =>
                {
                    let suffix = uuid::Uuid::new_v4().simple().to_string();
                    candidate = format!("{base}-{}", &suffix[..8]);
                }
                Err(err) => return Err(err),
            }
        }

        Err(StoreError::SessionIdExhausted { base })
    }

    /// Writes `bytes` into the workspace under the sanitised basename of `filename`.
    pub fn save_file(
        &self,
        workspace: &Workspace,
        filename: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StoreError> {
        let name = sanitize_filename(upload_basename(filename));
        let path = workspace.dir.join(name);
        write_atomic_in_root(&self.root, &path, bytes, self.durability)?;
        Ok(path)
    }

    /// Persists the canonical text report for `id`, replacing any previous one.
    pub fn write_report_text(&self, id: &SessionId, text: &str) -> Result<PathBuf, StoreError> {
        let path = self.report_text_path(id);
        write_atomic_in_root(&self.root, &path, text.as_bytes(), self.durability)?;
        Ok(path)
    }

    /// Copies an HTML report found in the workspace to `<id>.html`.
    pub fn promote_html(&self, id: &SessionId, source: &Path) -> Result<PathBuf, StoreError> {
        let bytes = fs::read(source).map_err(|err| StoreError::Io {
            path: source.to_path_buf(),
            source: err,
        })?;
        let path = self.report_html_path(id);
        write_atomic_in_root(&self.root, &path, &bytes, self.durability)?;
        Ok(path)
    }

    pub fn write_generated_html(&self, id: &SessionId, html: &str) -> Result<PathBuf, StoreError> {
        let path = self.generated_html_path(id);
        write_atomic_in_root(&self.root, &path, html.as_bytes(), self.durability)?;
        Ok(path)
    }

    /// Reads the canonical text report, `None` when it was never written.
    pub fn read_report_text(&self, id: &SessionId) -> Result<Option<String>, StoreError> {
        let path = self.report_text_path(id);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(decode_text(&bytes))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Deletes every top-level item of the temp dir older than `max_age` as seen from `now`.
    ///
    /// Failures are logged and counted; they never abort the sweep.
    pub fn cleanup_older_than(&self, max_age: Duration, now: SystemTime) -> CleanupSummary {
        let mut summary = CleanupSummary::default();

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::error!(root = ?self.root, error = %err, "cannot list temp dir for cleanup");
                return summary;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    tracing::error!(path = ?path, error = %err, "cannot stat temp item");
                    summary.failed += 1;
                    continue;
                }
            };

            let Some(age) = item_age(&metadata, now) else {
                continue;
            };
            if age <= max_age {
                continue;
            }

            let result = if metadata.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };

            match result {
                Ok(()) => summary.removed += 1,
                Err(err) => {
                    tracing::error!(path = ?path, error = %err, "failed to delete temp item");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests;
