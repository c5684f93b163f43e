// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;

use super::ids::SessionId;

/// A file received from the client, before anything is written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// The name exactly as the client sent it. May contain directories or non-ASCII.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Which upload flow produced a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    SingleFile,
    Folder,
}

impl UploadMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleFile => "file",
            Self::Folder => "folder",
        }
    }
}

/// Outcome of a completed validator run, serialized as `{success, report, report_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub success: bool,
    pub report: String,
    pub report_id: SessionId,
}
