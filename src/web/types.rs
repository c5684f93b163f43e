// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

/// Multipart field carrying the single-file upload.
pub const FILE_FIELD: &str = "xml_file";

/// Multipart field carrying folder uploads, repeated once per file.
pub const FOLDER_FIELD: &str = "folder_files[]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsQuery {
    pub key: Option<String>,
}

/// `Content-Disposition` of `/download_report/{id}` responses.
pub const DOWNLOAD_DISPOSITION: &str = "attachment; filename=\"validation_report.txt\"";
