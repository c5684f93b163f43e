// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Discovery of report files the validator left behind in a workspace.
//!
//! The walk is ordered by file name at every level and bounded in depth, so the same tree always
//! yields the same candidates in the same order.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::validator::Invocation;

pub const HTML_SUFFIX: &str = ".html";
pub const TEXT_REPORT_SUFFIX: &str = ".report.txt";

/// Default depth bound for workspace walks.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Html,
    Text,
}

impl ReportKind {
    pub fn of(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(HTML_SUFFIX) {
            Some(Self::Html)
        } else if name.ends_with(TEXT_REPORT_SUFFIX) {
            Some(Self::Text)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub kind: ReportKind,
}

/// Lazily yields every report-like file under `root`, depth-first in name order.
///
/// Unreadable entries are skipped. A missing `root` yields nothing.
pub fn candidates(root: &Path, max_depth: usize) -> impl Iterator<Item = Candidate> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let kind = ReportKind::of(entry.path())?;
            Some(Candidate {
                path: entry.into_path(),
                kind,
            })
        })
}

/// HTML candidates only, same order as [`candidates`].
pub fn html_files(root: &Path, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    candidates(root, max_depth)
        .filter(|candidate| candidate.kind == ReportKind::Html)
        .map(|candidate| candidate.path)
}

/// Result of one full walk over a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Located {
    /// Every HTML file, in walk order. The first one is canonical.
    pub html: Vec<PathBuf>,
    /// The first `.report.txt` seen before any HTML file.
    pub text_report: Option<PathBuf>,
}

impl Located {
    pub fn canonical_html(&self) -> Option<&Path> {
        self.html.first().map(PathBuf::as_path)
    }
}

pub fn locate(root: &Path, max_depth: usize) -> Located {
    let mut located = Located::default();

    for candidate in candidates(root, max_depth) {
        tracing::debug!(path = ?candidate.path, kind = ?candidate.kind, "report candidate");
        match candidate.kind {
            ReportKind::Html => located.html.push(candidate.path),
            ReportKind::Text => {
                if located.html.is_empty() && located.text_report.is_none() {
                    located.text_report = Some(candidate.path);
                }
            }
        }
    }

    located
}

/// Report text built from process output when no report file was produced.
pub fn synthesized_text(invocation: &Invocation) -> String {
    let mut text = if invocation.stdout.is_empty() {
        "No output available.".to_owned()
    } else {
        format!("Validation output:\n\n{}", invocation.stdout)
    };
    if !invocation.stderr.is_empty() {
        text.push_str("\n\nErrors:\n\n");
        text.push_str(&invocation.stderr);
    }
    text
}

/// Paths mentioned by lines such as `Report: /x/y.html` or `Saved report: /x/y.html`.
pub fn mentioned_html_paths(report_text: &str) -> Vec<String> {
    report_text
        .lines()
        .filter(|line| {
            line.contains(HTML_SUFFIX)
                && (line.contains("Report:") || line.contains("Saved report:"))
        })
        .map(|line| match line.split_once(':') {
            Some((_, rest)) => rest.trim().to_owned(),
            None => line.trim().to_owned(),
        })
        .collect()
}
