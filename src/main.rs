// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! XPM Portal entrypoint.
//!
//! Parses configuration, installs logging, sweeps stale temp items once, then serves HTTP until
//! Ctrl-C.

use std::error::Error;
use std::time::SystemTime;

use clap::Parser;

use xpm_portal::config::Config;
use xpm_portal::pipeline::Pipeline;
use xpm_portal::web::{router, serve, AppState};

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let config = Config::parse();
        config.validate()?;

        let logs = xpm_portal::logging::init(&config.log_settings())?;
        tracing::info!(
            temp_dir = ?config.temp_dir,
            log_file = ?logs.path(),
            python = ?config.python,
            package_maker = ?config.package_maker,
            folder_policy = ?config.folder_policy,
            log_viewer = config.admin_key.is_some(),
            "starting xpm-portal"
        );

        let store = config.temp_store();
        store.ensure_root()?;
        let summary = store.cleanup_older_than(config.janitor_max_age(), SystemTime::now());
        tracing::info!(
            removed = summary.removed,
            failed = summary.failed,
            "temp cleanup complete"
        );

        let pipeline = Pipeline::new(store, config.package_maker(), config.pipeline_options());
        let state = AppState::new(pipeline, logs)
            .with_admin_key(config.admin_key.clone())
            .with_max_upload_bytes(config.max_upload_bytes);

        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
            serve(listener, router(state), shutdown_signal()).await?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        tracing::info!("stopped");
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("xpm-portal: {err}");
        std::process::exit(1);
    }
}
