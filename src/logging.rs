// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Process-wide logging: console plus a size-rotated log file.
//!
//! [`init`] installs the global subscriber once and returns a [`LogHandle`]; components that need
//! the log file (the log viewer) receive the handle instead of looking it up.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "xpm-portal.log";

#[derive(Debug, thiserror::Error)]
pub enum LogInitError {
    #[error("cannot open log file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("logging already initialised: {0}")]
    AlreadyInitialised(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub dir: PathBuf,
    pub max_bytes: u64,
    pub backups: usize,
}

impl LogSettings {
    pub fn file_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }
}

/// Where the active log file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogHandle {
    path: PathBuf,
}

impl LogHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents of the active log file (rotated backups are not included).
    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }
}

/// Installs the global subscriber: `RUST_LOG` filter (default `info`), ANSI console output on
/// stderr and plain output to the rotating file.
pub fn init(settings: &LogSettings) -> Result<LogHandle, LogInitError> {
    let file = Arc::new(RotatingFile::open(settings)?);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file.clone()),
        )
        .try_init()?;

    Ok(LogHandle::new(file.path()))
}

/// Append-only file that shifts itself to `.1`, `.2`, ... before a write would exceed
/// `max_bytes`. At most `backups` shifted files are kept.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    state: Mutex<FileState>,
}

#[derive(Debug)]
struct FileState {
    file: File,
    len: u64,
}

impl RotatingFile {
    pub fn open(settings: &LogSettings) -> Result<Self, LogInitError> {
        let path = settings.file_path();
        let io_err = |source| LogInitError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&settings.dir).map_err(io_err)?;
        let file = open_append(&path).map_err(io_err)?;
        let len = file.metadata().map_err(io_err)?.len();

        Ok(Self {
            path: path.clone(),
            max_bytes: settings.max_bytes,
            backups: settings.backups,
            state: Mutex::new(FileState { file, len }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&self, state: &mut FileState) -> io::Result<()> {
        state.file.flush()?;

        if self.backups == 0 {
            state.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?;
            state.len = 0;
            return Ok(());
        }

        for index in (1..self.backups).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;

        state.file = open_append(&self.path)?;
        state.len = 0;
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl Write for &RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;

        if state.len > 0 && state.len + buf.len() as u64 > self.max_bytes {
            self.rotate(&mut state)?;
        }

        let written = state.file.write(buf)?;
        state.len += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        state.file.flush()
    }
}
