// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP surface.
//!
//! Upload endpoints answer with JSON (`{success, report, report_id}` or `{error}`, always HTTP
//! 200); report endpoints serve text or HTML and degrade to explanatory pages instead of failing.

mod server;
mod types;

pub use server::{json_response, router, serve, AppState};
pub use types::{ErrorBody, DOWNLOAD_DISPOSITION, FILE_FIELD, FOLDER_FIELD};
