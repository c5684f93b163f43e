// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Text and filename normalisation.
//!
//! Everything that reaches the filesystem, the external validator, a JSON body, or an HTML page
//! passes through here first. None of these functions fail; the worst case is a placeholder.

/// Placeholder for characters that have no ASCII equivalent in [`ASCII_FOLDS`].
pub const PLACEHOLDER: char = '?';

/// Fallback for filenames that sanitise down to nothing.
pub const DEFAULT_FILENAME: &str = "file";

/// Longest stem kept for files saved from a folder upload.
pub const FOLDER_STEM_MAX_CHARS: usize = 20;

/// Extensions whose contents are decoded and rewritten before a folder is validated.
pub const TEXT_LIKE_EXTENSIONS: &[&str] =
    &[".xml", ".html", ".htm", ".css", ".xsl", ".xslt", ".svg", ".txt"];

const ASCII_FOLDS: &[(char, char)] = &[
    ('\u{e1}', 'a'),
    ('\u{e9}', 'e'),
    ('\u{ed}', 'i'),
    ('\u{f3}', 'o'),
    ('\u{fa}', 'u'),
    ('\u{c1}', 'A'),
    ('\u{c9}', 'E'),
    ('\u{cd}', 'I'),
    ('\u{d3}', 'O'),
    ('\u{da}', 'U'),
    ('\u{f1}', 'n'),
    ('\u{d1}', 'N'),
    ('\u{fc}', 'u'),
    ('\u{dc}', 'U'),
    ('\u{bf}', '?'),
    ('\u{a1}', '!'),
    ('\u{e7}', 'c'),
    ('\u{c7}', 'C'),
];

// Longer terms first: `font-familias` must not be eaten by `font-family`.
const FONT_TERM_REWRITES: &[(&str, &str)] = &[
    ("font-familias", "data-fontname"),
    ("font-family", "data-fontname"),
    ("font family", "data-fontname"),
    ("fontfamily", "data-fontname"),
    ("font-face", "data-fontface"),
    ("fontface", "data-fontface"),
    ("font-style", "data-fontstyle"),
    ("font-weight", "data-fontweight"),
    ("font-size", "data-fontsize"),
];

/// Decodes raw bytes as UTF-8, falling back to Latin-1 (which accepts every byte).
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Normalises arbitrary bytes into printable ASCII.
///
/// Accented Spanish letters fold to their base letter; anything else outside ASCII becomes
/// [`PLACEHOLDER`], one per character, so positions stay visible. The function is idempotent.
pub fn to_ascii(bytes: &[u8]) -> String {
    to_ascii_str(&decode_text(bytes))
}

/// [`to_ascii`] for text that is already decoded.
pub fn to_ascii_str(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

fn fold_char(ch: char) -> char {
    if ch.is_ascii() {
        return ch;
    }
    ASCII_FOLDS
        .iter()
        .find(|(from, _)| *from == ch)
        .map(|(_, to)| *to)
        .unwrap_or(PLACEHOLDER)
}

/// Returns the last path segment of a client-supplied name, accepting `/` and `\` separators.
pub fn upload_basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Restricts a filename to `[A-Za-z0-9._ -]`, never returning an empty or dot-only name.
pub fn sanitize_filename(name: &str) -> String {
    let ascii = to_ascii_str(name);
    let mapped: String = ascii
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-' | ' ') {
                ch
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = mapped.trim_matches(' ');
    if trimmed.is_empty() || trimmed.chars().all(|ch| ch == '.') {
        return DEFAULT_FILENAME.to_owned();
    }
    trimmed.to_owned()
}

/// Keeps only ASCII alphanumerics, `-` and `_`. Used for session and report ids.
pub fn sanitize_id(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
        .collect()
}

/// Splits a basename into stem and extension (including the dot), like `os.path.splitext`.
pub fn split_extension(basename: &str) -> (&str, &str) {
    match basename.rfind('.') {
        Some(idx) if idx > 0 && !basename[..idx].chars().all(|ch| ch == '.') => {
            basename.split_at(idx)
        }
        _ => (basename, ""),
    }
}

/// Name used for the `index`-th file saved from a folder upload.
///
/// The stem is reduced to ASCII alphanumerics and truncated; an empty stem becomes
/// `file<index>_<ext>`. The extension is lower-cased.
pub fn folder_file_name(original: &str, index: usize) -> String {
    let basename = upload_basename(original);
    let (stem, ext) = split_extension(basename);
    let ext = folder_extension(ext);

    let stem: String = stem
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(FOLDER_STEM_MAX_CHARS)
        .collect();

    if stem.is_empty() {
        format!("file{index}_{ext}")
    } else {
        format!("{stem}{ext}")
    }
}

/// Lower-cased extension restricted to ASCII alphanumerics after the leading dot.
pub fn folder_extension(ext: &str) -> String {
    let Some(rest) = ext.strip_prefix('.') else {
        return String::new();
    };
    let rest: String = rest
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect();
    if rest.is_empty() {
        String::new()
    } else {
        format!(".{rest}")
    }
}

pub fn is_text_like_extension(ext: &str) -> bool {
    TEXT_LIKE_EXTENSIONS.contains(&ext)
}

/// Renames font-related attribute names that trip the external validator.
///
/// Each term is replaced in lower-case, UPPER-case and Capitalized spelling. Returns the new
/// text and whether anything changed.
pub fn rewrite_font_terms(text: &str) -> (String, bool) {
    let mut out = text.to_owned();
    for (find, replace) in FONT_TERM_REWRITES {
        for (find, replace) in [
            ((*find).to_owned(), (*replace).to_owned()),
            (find.to_uppercase(), replace.to_uppercase()),
            (capitalize(find), capitalize(replace)),
        ] {
            if out.contains(&find) {
                out = out.replace(&find, &replace);
            }
        }
    }
    let changed = out != text;
    (out, changed)
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests;
