// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A session is one validation request: an id, a workspace directory under the temp dir, and
//! the report files keyed by that id.

pub mod ids;
pub mod validation;

pub use ids::{IdError, SessionId};
pub use validation::{Upload, UploadMode, ValidationResult};
