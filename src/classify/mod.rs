// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Success/failure policies for a validator run.
//!
//! The validator gives no structured verdict, so success is inferred from the exit code and from
//! text it printed. Policies are [`ResultClassifier`] implementations so the heuristics can be
//! swapped without touching the orchestration in `pipeline`.

use std::fmt;
use std::sync::Arc;

use crate::validator::Invocation;

/// Substring that identifies the validator's known spurious style complaint.
pub const FONT_FAMILY: &str = "font-family";

/// Replacement for the first stderr line mentioning [`FONT_FAMILY`].
pub const FONT_FAMILY_ADVISORY: &str =
    "NOTICE: a 'font-family' attribute was found and has been ignored";

/// Replacement for the whole stderr when the font-family complaint is (nearly) all there is.
pub const STRUCTURE_OK_ADVISORY: &str = "NOTICE: some non-standard style attributes were found \
and have been ignored.\nThe structural validation of the XML is correct.";

/// Stderr with fewer lines than this (after the advisory substitution) is considered noise.
pub const FONT_FAMILY_LINE_THRESHOLD: usize = 5;

/// Decision plus the possibly rewritten process output it was based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub success: bool,
    pub exit_code: i32,
    pub stderr: String,
    pub font_family_detected: bool,
}

pub trait ResultClassifier: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Classifies a finished run. `report_text` is whatever report the locator settled on.
    fn classify(&self, invocation: &Invocation, report_text: &str) -> Verdict;
}

/// Success only on a clean exit, empty stderr and no `ERROR` anywhere in the report.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictClassifier;

impl ResultClassifier for StrictClassifier {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn classify(&self, invocation: &Invocation, report_text: &str) -> Verdict {
        let success = !invocation.timed_out
            && invocation.stderr.is_empty()
            && invocation.exit_code == 0
            && !report_text.to_uppercase().contains("ERROR");

        Verdict {
            success,
            exit_code: invocation.exit_code,
            stderr: invocation.stderr.clone(),
            font_family_detected: false,
        }
    }
}

/// Tolerates the validator's spurious `font-family` error.
///
/// When the complaint shows up on stdout or stderr, its stderr line is replaced by
/// [`FONT_FAMILY_ADVISORY`]; if stderr is then shorter than [`FONT_FAMILY_LINE_THRESHOLD`] lines
/// it is replaced entirely by [`STRUCTURE_OK_ADVISORY`] and the exit code is forced to 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontFamilyTolerantClassifier;

impl ResultClassifier for FontFamilyTolerantClassifier {
    fn name(&self) -> &'static str {
        "font-family-tolerant"
    }

    fn classify(&self, invocation: &Invocation, _report_text: &str) -> Verdict {
        let mut stderr = invocation.stderr.clone();
        let mut exit_code = invocation.exit_code;

        let detected =
            invocation.stderr.contains(FONT_FAMILY) || invocation.stdout.contains(FONT_FAMILY);

        if detected {
            let offending = stderr
                .split('\n')
                .find(|line| line.contains(FONT_FAMILY))
                .map(str::to_owned);

            if let Some(line) = offending {
                tracing::error!(line = %line, "validator reported the font-family defect");
                stderr = stderr.replace(&line, FONT_FAMILY_ADVISORY);
            }

            if stderr.trim().split('\n').count() < FONT_FAMILY_LINE_THRESHOLD
                && stderr.contains(FONT_FAMILY)
            {
                stderr = STRUCTURE_OK_ADVISORY.to_owned();
                exit_code = 0;
            }
        }

        let lowered = stderr.to_lowercase();
        let unexplained_error =
            !stderr.is_empty() && lowered.contains("error") && !lowered.contains(FONT_FAMILY);

        let success =
            !invocation.timed_out && (exit_code == 0 || detected) && !unexplained_error;

        Verdict {
            success,
            exit_code,
            stderr,
            font_family_detected: detected,
        }
    }
}

/// Policy applied to folder uploads. Single files are always classified strictly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FolderPolicy {
    Strict,
    #[default]
    FontFamilyTolerant,
}

impl FolderPolicy {
    pub fn classifier(self) -> Arc<dyn ResultClassifier> {
        match self {
            Self::Strict => Arc::new(StrictClassifier),
            Self::FontFamilyTolerant => Arc::new(FontFamilyTolerantClassifier),
        }
    }
}

#[cfg(test)]
mod tests;
