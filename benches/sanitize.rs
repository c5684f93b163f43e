// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use xpm_portal::text::{rewrite_font_terms, sanitize_filename, to_ascii};

fn filenames() -> Vec<String> {
    (0..256)
        .map(|i| match i % 4 {
            0 => format!("artículo_{i}.xml"),
            1 => format!("uploads/dir {i}/Ñandú (copia).xml"),
            2 => format!("../../{i}/evil?.xml"),
            _ => format!("plain_{i}.xml"),
        })
        .collect()
}

fn article(paragraphs: usize) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<article>\n");
    for i in 0..paragraphs {
        out.push_str(&format!(
            "<p style=\"font-family: Arial; Font-Family: serif\">Párrafo {i} con acentuación y eñes.</p>\n"
        ));
    }
    out.push_str("</article>\n");
    out
}

// Benchmark identity (keep stable):
// - Group names in this file: `text.sanitize_filename`, `text.to_ascii`, `text.rewrite_font_terms`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time.
fn benches_sanitize(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("text.sanitize_filename");
        let names = filenames();
        group.throughput(Throughput::Elements(names.len() as u64));
        group.bench_function("mixed_256", move |b| {
            b.iter(|| {
                let mut total = 0usize;
                for name in &names {
                    total = total.wrapping_add(sanitize_filename(black_box(name)).len());
                }
                black_box(total)
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("text.to_ascii");
        for (case_id, text) in [("small", article(10)), ("large", article(2_000))] {
            let bytes = text.into_bytes();
            group.throughput(Throughput::Bytes(bytes.len() as u64));
            group.bench_function(case_id, move |b| {
                b.iter(|| black_box(to_ascii(black_box(&bytes)).len()))
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("text.rewrite_font_terms");
        for (case_id, text) in [("small", article(10)), ("large", article(2_000))] {
            group.throughput(Throughput::Bytes(text.len() as u64));
            group.bench_function(case_id, move |b| {
                b.iter(|| {
                    let (rewritten, changed) = rewrite_font_terms(black_box(&text));
                    black_box((rewritten.len(), changed))
                })
            });
        }
        group.finish();
    }
}

criterion_group!(benches, benches_sanitize);
criterion_main!(benches);
