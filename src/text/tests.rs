// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;

use super::{
    capitalize, decode_text, escape_html, folder_file_name, rewrite_font_terms, sanitize_filename,
    sanitize_id, split_extension, to_ascii, to_ascii_str, upload_basename, DEFAULT_FILENAME,
};

fn is_safe_filename_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-' | ' ')
}

#[test]
fn to_ascii_folds_spanish_letters() {
    assert_eq!(to_ascii_str("Validaci\u{f3}n \u{bf}correcta? a\u{f1}o"), "Validacion ?correcta? ano");
    assert_eq!(to_ascii_str("\u{c1}RBOL \u{a1}s\u{ed}!"), "ARBOL !si!");
}

#[test]
fn to_ascii_replaces_unknown_characters_one_for_one() {
    assert_eq!(to_ascii_str("a\u{4e2d}\u{6587}b"), "a??b");
    assert_eq!(to_ascii_str("\u{1f600}"), "?");
}

#[test]
fn to_ascii_falls_back_to_latin1_for_invalid_utf8() {
    // "canci\xf3n" in Latin-1.
    let bytes = b"canci\xf3n \xff";
    assert_eq!(decode_text(bytes), "canci\u{f3}n \u{ff}");
    assert_eq!(to_ascii(bytes), "cancion ?");
}

#[rstest]
#[case("plain ascii")]
#[case("Espa\u{f1}a \u{2014} \u{201c}quoted\u{201d}")]
#[case("")]
#[case("\u{0}\u{7f} control")]
fn to_ascii_is_idempotent(#[case] input: &str) {
    let once = to_ascii_str(input);
    assert!(once.is_ascii());
    assert_eq!(to_ascii_str(&once), once);
    assert_eq!(to_ascii(once.as_bytes()), once);
}

#[rstest]
#[case("art\u{ed}culo final.xml", "articulo final.xml")]
#[case("a/b\\c:d*e?.xml", "a_b_c_d_e_.xml")]
#[case("   ", DEFAULT_FILENAME)]
#[case("..", DEFAULT_FILENAME)]
#[case("", DEFAULT_FILENAME)]
#[case("\u{4e2d}\u{6587}.xml", "__.xml")]
fn sanitize_filename_restricts_charset(#[case] input: &str, #[case] expected: &str) {
    let out = sanitize_filename(input);
    assert_eq!(out, expected);
    assert!(!out.is_empty());
    assert!(out.chars().all(is_safe_filename_char), "unsafe output: {out:?}");
}

#[test]
fn sanitize_id_drops_everything_but_alnum_dash_underscore() {
    assert_eq!(sanitize_id("../../etc/passwd"), "etcpasswd");
    assert_eq!(sanitize_id("article-20260101-120000"), "article-20260101-120000");
    assert_eq!(sanitize_id("a b\u{e9}_c"), "ab_c");
}

#[test]
fn upload_basename_accepts_both_separators() {
    assert_eq!(upload_basename("folder/sub/a.xml"), "a.xml");
    assert_eq!(upload_basename("C:\\pkg\\b.tif"), "b.tif");
    assert_eq!(upload_basename("c.xml"), "c.xml");
}

#[test]
fn split_extension_matches_splitext() {
    assert_eq!(split_extension("a.tar.gz"), ("a.tar", ".gz"));
    assert_eq!(split_extension(".hidden"), (".hidden", ""));
    assert_eq!(split_extension("noext"), ("noext", ""));
}

#[test]
fn folder_file_name_truncates_and_lowercases() {
    assert_eq!(
        folder_file_name("pkg/1234-5678-rmx-01-02-e1 (copy).XML", 0),
        "12345678rmx0102e1cop.xml"
    );
    assert_eq!(folder_file_name("fig 1.TIF", 3), "fig1.tif");
}

#[test]
fn folder_file_name_falls_back_to_counter_when_stem_is_empty() {
    assert_eq!(folder_file_name("\u{f1}\u{f1}.xml", 4), "file4_.xml");
    assert_eq!(folder_file_name("---", 2), "file2_");
}

#[test]
fn rewrite_font_terms_covers_case_variants() {
    let (out, changed) =
        rewrite_font_terms("<p style=\"font-family: Arial; FONT-SIZE: 3\">Font-weight</p>");
    assert!(changed);
    assert_eq!(out, "<p style=\"data-fontname: Arial; DATA-FONTSIZE: 3\">Data-fontweight</p>");
}

#[test]
fn rewrite_font_terms_prefers_longest_term() {
    let (out, _) = rewrite_font_terms("font-familias");
    assert_eq!(out, "data-fontname");
}

#[test]
fn rewrite_font_terms_reports_unchanged_text() {
    let (out, changed) = rewrite_font_terms("<article/>");
    assert!(!changed);
    assert_eq!(out, "<article/>");
}

#[test]
fn capitalize_lowercases_the_tail() {
    assert_eq!(capitalize("font-FAMILY"), "Font-family");
    assert_eq!(capitalize(""), "");
}

#[test]
fn escape_html_escapes_markup() {
    assert_eq!(escape_html("<a href=\"x\">&'</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;");
}
