// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence in the shared temp directory.
//!
//! Session workspaces are subdirectories named by session id; the canonical reports are flat
//! files next to them, keyed by the same id.

pub mod temp_store;

pub use temp_store::{
    CleanupSummary, SessionSeed, StoreError, TempStore, Workspace, WriteDurability,
    SESSION_TIMESTAMP_FORMAT,
};
