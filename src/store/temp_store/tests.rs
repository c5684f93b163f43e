// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, SystemTime};

use chrono::{Local, TimeZone};
use rstest::{fixture, rstest};

use super::helpers::write_atomic_in_root;
use super::{CleanupSummary, SessionSeed, StoreError, TempStore, WriteDurability};
use crate::model::SessionId;

struct TempStoreTestCtx {
    _tmp: tempfile::TempDir,
    store: TempStore,
}

#[fixture]
fn ctx() -> TempStoreTestCtx {
    let tmp = tempfile::tempdir().unwrap();
    let store = TempStore::new(tmp.path().join("temp"));
    TempStoreTestCtx { _tmp: tmp, store }
}

fn fixed_now() -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).single().unwrap()
}

#[rstest]
fn create_session_derives_id_from_filename_stem(ctx: TempStoreTestCtx) {
    let workspace = ctx
        .store
        .create_session(SessionSeed::Filename("dir/Art\u{ed}culo 01.xml"), fixed_now())
        .unwrap();

    assert_eq!(workspace.id().as_str(), "Articulo01-20260304-050607");
    assert!(workspace.dir().is_dir());
    assert_eq!(workspace.dir(), ctx.store.root().join("Articulo01-20260304-050607"));
}

#[rstest]
fn create_session_with_tag_uses_literal_prefix(ctx: TempStoreTestCtx) {
    let workspace = ctx.store.create_session(SessionSeed::Tag("folder"), fixed_now()).unwrap();
    assert_eq!(workspace.id().as_str(), "folder-20260304-050607");
}

#[rstest]
fn create_session_never_reuses_an_existing_workspace(ctx: TempStoreTestCtx) {
    let first = ctx.store.create_session(SessionSeed::Tag("folder"), fixed_now()).unwrap();
    let second = ctx.store.create_session(SessionSeed::Tag("folder"), fixed_now()).unwrap();

    assert_ne!(first.id(), second.id());
    assert!(second.id().as_str().starts_with("folder-20260304-050607-"));
    assert!(second.dir().is_dir());
}

#[rstest]
fn create_session_propagates_unexpected_io_errors(ctx: TempStoreTestCtx) {
    // A regular file where the temp dir should be makes every mkdir fail.
    std::fs::create_dir_all(ctx.store.root().parent().unwrap()).unwrap();
    std::fs::write(ctx.store.root(), b"not a dir").unwrap();

    let err = ctx.store.create_session(SessionSeed::Tag("folder"), fixed_now()).unwrap_err();
    match err {
        StoreError::Io { .. } => {}
        other => panic!("expected Io error, got: {other:?}"),
    }
}

#[rstest]
fn save_file_sanitizes_the_basename(ctx: TempStoreTestCtx) {
    let workspace = ctx.store.create_session(SessionSeed::Tag("s"), fixed_now()).unwrap();
    let path = ctx
        .store
        .save_file(&workspace, "../../evil/na\u{f1}o?.xml", b"<article/>")
        .unwrap();

    assert_eq!(path, workspace.dir().join("nano_.xml"));
    assert_eq!(std::fs::read(&path).unwrap(), b"<article/>");
}

#[rstest]
fn report_text_round_trips_and_overwrites(ctx: TempStoreTestCtx) {
    let id = SessionId::new("abc-1").unwrap();
    assert_eq!(ctx.store.read_report_text(&id).unwrap(), None);

    ctx.store.write_report_text(&id, "first").unwrap();
    ctx.store.write_report_text(&id, "second").unwrap();

    assert_eq!(ctx.store.read_report_text(&id).unwrap().as_deref(), Some("second"));
    assert_eq!(ctx.store.report_text_path(&id), ctx.store.root().join("abc-1.txt"));
}

#[rstest]
fn flat_report_writes_create_a_missing_temp_dir(ctx: TempStoreTestCtx) {
    let id = SessionId::new("fresh-1").unwrap();
    assert!(!ctx.store.root().exists());

    let generated = ctx.store.write_generated_html(&id, "<html>g</html>").unwrap();
    assert_eq!(std::fs::read_to_string(generated).unwrap(), "<html>g</html>");

    let source = ctx.store.root().parent().unwrap().join("outside.html");
    std::fs::write(&source, "<html>p</html>").unwrap();
    std::fs::remove_dir_all(ctx.store.root()).unwrap();

    let promoted = ctx.store.promote_html(&id, &source).unwrap();
    assert_eq!(std::fs::read_to_string(promoted).unwrap(), "<html>p</html>");
}

#[rstest]
fn promote_html_copies_into_the_flat_namespace(ctx: TempStoreTestCtx) {
    let workspace = ctx.store.create_session(SessionSeed::Tag("s"), fixed_now()).unwrap();
    let nested = workspace.dir().join("out").join("errors");
    std::fs::create_dir_all(&nested).unwrap();
    let source = nested.join("xpm.html");
    std::fs::write(&source, "<html>report</html>").unwrap();

    let promoted = ctx.store.promote_html(workspace.id(), &source).unwrap();

    assert_eq!(promoted, ctx.store.report_html_path(workspace.id()));
    assert_eq!(std::fs::read_to_string(promoted).unwrap(), "<html>report</html>");
}

#[rstest]
fn writes_outside_the_temp_dir_are_refused(ctx: TempStoreTestCtx) {
    ctx.store.ensure_root().unwrap();
    let outside = ctx.store.root().parent().unwrap().join("escape.txt");
    let err = write_atomic_in_root(ctx.store.root(), &outside, b"x", WriteDurability::BestEffort)
        .unwrap_err();
    match err {
        StoreError::PathOutsideRoot { .. } => {}
        other => panic!("expected PathOutsideRoot, got: {other:?}"),
    }
}

#[rstest]
fn cleanup_removes_only_items_older_than_max_age(ctx: TempStoreTestCtx) {
    let workspace = ctx.store.create_session(SessionSeed::Tag("old"), fixed_now()).unwrap();
    ctx.store.write_report_text(workspace.id(), "report").unwrap();

    let day = Duration::from_secs(24 * 60 * 60);

    let summary = ctx.store.cleanup_older_than(day, SystemTime::now());
    assert_eq!(summary, CleanupSummary::default());
    assert!(workspace.dir().is_dir());

    let two_days_later = SystemTime::now() + 2 * day;
    let summary = ctx.store.cleanup_older_than(day, two_days_later);
    assert_eq!(summary, CleanupSummary { removed: 2, failed: 0 });
    assert!(!workspace.dir().exists());
    assert!(!ctx.store.report_text_path(workspace.id()).exists());
}

#[rstest]
fn cleanup_tolerates_missing_temp_dir(ctx: TempStoreTestCtx) {
    let summary = ctx.store.cleanup_older_than(Duration::ZERO, SystemTime::now());
    assert_eq!(summary, CleanupSummary::default());
}
