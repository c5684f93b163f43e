// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Invocation of the external `xml_package_maker` validator.
//!
//! The validator is an opaque collaborator: it is started as
//! `<interpreter> <script> [--validate] <target>`, its output is captured, and everything it
//! prints is folded to ASCII before anyone else looks at it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::model::UploadMode;
use crate::text::to_ascii;

/// Exit code reported when the process was killed or ended without one.
pub const NO_EXIT_CODE: i32 = -1;

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("cannot start validator {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed while waiting for validator {program:?}: {source}")]
    Wait {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of one validator run. All text is already ASCII.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl Invocation {
    fn timed_out(limit: Duration) -> Self {
        Self {
            exit_code: NO_EXIT_CODE,
            stdout: String::new(),
            stderr: timeout_message(limit),
            timed_out: true,
        }
    }
}

/// Stderr text substituted for the real output when a run exceeds its limit.
pub fn timeout_message(limit: Duration) -> String {
    format!(
        "Error: validation timed out (time limit: {})",
        describe_limit(limit)
    )
}

fn describe_limit(limit: Duration) -> String {
    let secs = limit.as_secs();
    match secs {
        60 => "1 minute".to_owned(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_owned(),
        s => format!("{s} seconds"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMaker {
    interpreter: PathBuf,
    script: PathBuf,
    validate_flag: bool,
}

impl PackageMaker {
    pub fn new(interpreter: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            validate_flag: false,
        }
    }

    /// Passes `--validate` before the target in single-file mode.
    pub fn with_validate_flag(mut self, validate_flag: bool) -> Self {
        self.validate_flag = validate_flag;
        self
    }

    /// Arguments after the interpreter, in order.
    pub fn args(&self, target: &Path, mode: UploadMode) -> Vec<OsString> {
        let mut args = vec![self.script.clone().into_os_string()];
        if self.validate_flag && mode == UploadMode::SingleFile {
            args.push("--validate".into());
        }
        args.push(target.as_os_str().to_owned());
        args
    }

    /// Human-readable command line, for logs only.
    pub fn command_line(&self, target: &Path, mode: UploadMode) -> String {
        std::iter::once(self.interpreter.as_os_str().to_owned())
            .chain(self.args(target, mode))
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs the validator against `target` and waits for it, at most `limit` if given.
    ///
    /// On timeout the child is killed and the returned invocation carries a synthesized stderr
    /// message; whatever it printed so far is discarded.
    pub async fn run(
        &self,
        target: &Path,
        mode: UploadMode,
        limit: Option<Duration>,
    ) -> Result<Invocation, InvokeError> {
        tracing::info!(command = %self.command_line(target, mode), "executing validator");

        let child = Command::new(&self.interpreter)
            .args(self.args(target, mode))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| InvokeError::Spawn {
                program: self.interpreter.clone(),
                source,
            })?;

        let wait = child.wait_with_output();
        let output = match limit {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(output) => output,
                Err(_) => {
                    // Dropping the future drops the child, which kills it.
                    tracing::warn!(limit_secs = limit.as_secs(), "validator timed out, killed");
                    return Ok(Invocation::timed_out(limit));
                }
            },
            None => wait.await,
        }
        .map_err(|source| InvokeError::Wait {
            program: self.interpreter.clone(),
            source,
        })?;

        let invocation = Invocation {
            exit_code: output.status.code().unwrap_or(NO_EXIT_CODE),
            stdout: to_ascii(&output.stdout),
            stderr: to_ascii(&output.stderr),
            timed_out: false,
        };

        tracing::info!(
            exit_code = invocation.exit_code,
            stdout_len = invocation.stdout.len(),
            stderr_len = invocation.stderr.len(),
            "validator finished"
        );
        if !invocation.stderr.is_empty() {
            tracing::warn!(stderr_len = invocation.stderr.len(), "validator wrote to stderr");
        }

        Ok(invocation)
    }
}
