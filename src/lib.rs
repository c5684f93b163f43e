// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! XPM Portal: a web front end for the `xml_package_maker` validator.
//!
//! Uploads land in a per-session workspace under the temp dir, the validator runs against them
//! as a subprocess, and the reports it leaves behind are located, classified and served back.

pub mod classify;
pub mod config;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod text;
pub mod validator;
pub mod web;
