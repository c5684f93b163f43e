// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;

use super::{
    FolderPolicy, FontFamilyTolerantClassifier, ResultClassifier, StrictClassifier, FONT_FAMILY,
    STRUCTURE_OK_ADVISORY,
};
use crate::validator::{timeout_message, Invocation, NO_EXIT_CODE};

fn run(exit_code: i32, stdout: &str, stderr: &str) -> Invocation {
    Invocation {
        exit_code,
        stdout: stdout.to_owned(),
        stderr: stderr.to_owned(),
        timed_out: false,
    }
}

fn timed_out() -> Invocation {
    Invocation {
        exit_code: NO_EXIT_CODE,
        stdout: String::new(),
        stderr: timeout_message(std::time::Duration::from_secs(120)),
        timed_out: true,
    }
}

#[rstest]
#[case(run(0, "ok", ""), "all good", true)]
#[case(run(0, "ok", "warning"), "all good", false)]
#[case(run(1, "ok", ""), "all good", false)]
#[case(run(0, "ok", ""), "3 Errors found", false)]
fn strict_policy(#[case] invocation: Invocation, #[case] report: &str, #[case] expected: bool) {
    let verdict = StrictClassifier.classify(&invocation, report);
    assert_eq!(verdict.success, expected);
    assert_eq!(verdict.stderr, invocation.stderr);
    assert_eq!(verdict.exit_code, invocation.exit_code);
}

#[test]
fn strict_policy_fails_timeouts() {
    let verdict = StrictClassifier.classify(&timed_out(), "");
    assert!(!verdict.success);
}

#[test]
fn single_font_family_line_is_downgraded_to_advisory() {
    let raw_line = "ERROR: invalid attribute font-family in <style>";
    let verdict = FontFamilyTolerantClassifier.classify(&run(0, "done", &format!("{raw_line}\n")), "");

    assert!(verdict.success);
    assert!(verdict.font_family_detected);
    assert_eq!(verdict.exit_code, 0);
    assert_eq!(verdict.stderr, STRUCTURE_OK_ADVISORY);
    assert!(!verdict.stderr.contains(raw_line));
}

#[test]
fn font_family_defect_overrides_nonzero_exit() {
    let verdict = FontFamilyTolerantClassifier.classify(&run(1, "", "font-family: Arial not allowed"), "");
    assert!(verdict.success);
    assert_eq!(verdict.exit_code, 0);
}

#[test]
fn long_stderr_keeps_other_lines_and_only_rewrites_the_first_match() {
    let stderr = "line one\nError: font-family x\nline three\nline four\nline five\nline six";
    let verdict = FontFamilyTolerantClassifier.classify(&run(2, "", stderr), "");

    // Six lines stay six lines, so no blanket override; the advisory still names font-family,
    // so the remaining "Error" does not count as unexplained.
    assert_eq!(verdict.exit_code, 2);
    assert!(verdict.stderr.starts_with("line one\nNOTICE: a 'font-family' attribute"));
    assert!(verdict.stderr.ends_with("line six"));
    assert!(verdict.success);
}

#[test]
fn font_family_on_stdout_only_allows_nonzero_exit_without_rewriting() {
    let verdict = FontFamilyTolerantClassifier.classify(&run(1, "saw font-family", ""), "");
    assert!(verdict.font_family_detected);
    assert_eq!(verdict.exit_code, 1);
    assert_eq!(verdict.stderr, "");
    assert!(verdict.success);
}

#[test]
fn unexplained_error_on_stderr_fails() {
    let verdict = FontFamilyTolerantClassifier.classify(&run(0, "", "Error: missing DOI"), "");
    assert!(!verdict.success);
    assert!(!verdict.font_family_detected);
}

#[test]
fn nonzero_exit_without_defect_fails() {
    let verdict = FontFamilyTolerantClassifier.classify(&run(1, "", ""), "");
    assert!(!verdict.success);
}

#[test]
fn timeout_fails_even_with_defect_on_stdout() {
    let mut invocation = timed_out();
    invocation.stdout = FONT_FAMILY.to_owned();
    let verdict = FontFamilyTolerantClassifier.classify(&invocation, "");
    assert!(!verdict.success);
    assert!(verdict.stderr.contains("time limit"));
}

#[test]
fn folder_policy_selects_classifier() {
    assert_eq!(FolderPolicy::default(), FolderPolicy::FontFamilyTolerant);
    assert_eq!(FolderPolicy::Strict.classifier().name(), "strict");
    assert_eq!(FolderPolicy::FontFamilyTolerant.classifier().name(), "font-family-tolerant");
}
