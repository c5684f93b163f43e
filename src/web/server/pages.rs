// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XpmPortal-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of XPM Portal and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Static and generated HTML pages. Everything here is ASCII.

use crate::text::escape_html;

const CARD_STYLE: &str = "body { font-family: Arial, sans-serif; margin: 20px; background-color: #f5f5f5; }
.container { max-width: 800px; margin: 0 auto; background-color: white; padding: 20px; box-shadow: 0 0 10px rgba(0,0,0,0.1); }
h1 { color: #D8000C; }
pre { background-color: #f0f0f0; padding: 10px; overflow: auto; }
.info { background-color: #e7f3fe; border-left: 6px solid #2196F3; padding: 10px; }
p { line-height: 1.5; }
a { color: #2196F3; text-decoration: none; }";

const MONO_STYLE: &str = "body { font-family: monospace; margin: 20px; }
h1 { color: #333; }
pre { background-color: #f5f5f5; padding: 15px; white-space: pre-wrap; overflow: auto; max-height: 80vh; }";

fn page(title: &str, style: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>{title}</title>\n<meta charset=\"UTF-8\">\n\
         <style>\n{style}\n</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn download_link(id: &str) -> String {
    format!(
        "<p><a href=\"/download_report/{id}\">Download text report</a></p>",
        id = escape_html(id)
    )
}

/// Terminal page of the retrieval chain.
pub fn report_not_found(id: &str) -> String {
    let body = format!(
        "<div class=\"container\">\n<h1>HTML report not found</h1>\n\
         <p>No HTML report could be found for ID: <strong>{}</strong></p>\n\
         <p>Try downloading the text report instead:</p>\n{}\n</div>",
        escape_html(id),
        download_link(id)
    );
    page("Report not found", CARD_STYLE, &body)
}

/// Shown when the text report names HTML files that live outside the temp dir.
pub fn report_not_web_accessible(id: &str, paths: &[String]) -> String {
    let listed = paths
        .iter()
        .map(|path| escape_html(path))
        .collect::<Vec<_>>()
        .join("\n");
    let body = format!(
        "<div class=\"container\">\n<h1>HTML report not accessible via web</h1>\n\
         <div class=\"info\"><p>The HTML report was generated, but it is stored in a server \
         location that is not served over HTTP.</p></div>\n\
         <p>The generated reports are located at:</p>\n<pre>{listed}</pre>\n\
         <p>The complete text report is available here:</p>\n{}\n<hr>\n\
         <p><strong>Note:</strong> an administrator can make these files reachable by copying \
         them into the portal temp directory.</p>\n</div>",
        download_link(id)
    );
    page("HTML report not accessible", CARD_STYLE, &body)
}

/// HTML rendering of a text report, persisted as `<id>_generated.html`.
pub fn generated_report(report_text: &str) -> String {
    let body = format!(
        "<h1>XML Validation Report</h1>\n\
         <p>No HTML report was found. This is the text report converted to HTML.</p>\n\
         <pre>{}</pre>",
        escape_html(report_text)
    );
    page("XML Validation Report", MONO_STYLE, &body)
}

pub fn logs(log_text: &str) -> String {
    let body = format!("<h1>Server Logs</h1>\n<pre>{}</pre>", escape_html(log_text));
    page("XPM Portal Logs", MONO_STYLE, &body)
}

pub const INDEX: &str = r##"<!DOCTYPE html>
<html>
<head>
<title>XML Package Validator</title>
<meta charset="UTF-8">
<style>
body { font-family: Arial, sans-serif; margin: 0; background-color: #f5f5f5; }
.container { max-width: 900px; margin: 30px auto; background-color: white; padding: 20px; box-shadow: 0 0 10px rgba(0,0,0,0.1); }
.tabs { display: flex; border-bottom: 2px solid #2196F3; margin-bottom: 20px; }
.tab { padding: 10px 20px; cursor: pointer; border: none; background: none; font-size: 15px; }
.tab.active { background-color: #2196F3; color: white; }
.panel { display: none; }
.panel.active { display: block; }
button.primary { background-color: #2196F3; color: white; border: none; padding: 10px 18px; cursor: pointer; }
button.primary:disabled { background-color: #9ec9ee; cursor: default; }
#progress { display: none; margin: 15px 0; color: #555; }
#result { display: none; margin-top: 20px; }
#status.ok { color: #2e7d32; }
#status.fail { color: #D8000C; }
pre { background-color: #f0f0f0; padding: 10px; white-space: pre-wrap; max-height: 60vh; overflow: auto; }
</style>
</head>
<body>
<div class="container">
<h1>XML Package Validator</h1>
<div class="tabs">
<button class="tab active" data-panel="file-panel">Single XML file</button>
<button class="tab" data-panel="folder-panel">Folder</button>
</div>

<div id="file-panel" class="panel active">
<form id="file-form">
<p><input type="file" name="xml_file" accept=".xml" required></p>
<p><button class="primary" type="submit">Validate file</button></p>
</form>
</div>

<div id="folder-panel" class="panel">
<form id="folder-form">
<p><input type="file" name="folder_files[]" webkitdirectory directory multiple required></p>
<p><button class="primary" type="submit">Validate folder</button></p>
</form>
</div>

<div id="progress">Validating, please wait...</div>

<div id="result">
<h2 id="status"></h2>
<p>
<button class="primary" id="download" type="button">Download report</button>
<button class="primary" id="open-html" type="button">Open HTML report</button>
</p>
<pre id="report"></pre>
</div>
</div>

<script>
var reportId = null;

document.querySelectorAll(".tab").forEach(function (tab) {
  tab.addEventListener("click", function () {
    document.querySelectorAll(".tab").forEach(function (t) { t.classList.remove("active"); });
    document.querySelectorAll(".panel").forEach(function (p) { p.classList.remove("active"); });
    tab.classList.add("active");
    document.getElementById(tab.dataset.panel).classList.add("active");
  });
});

function showResult(data) {
  var status = document.getElementById("status");
  var report = document.getElementById("report");
  document.getElementById("result").style.display = "block";
  if (data.error) {
    reportId = null;
    status.className = "fail";
    status.textContent = "Error";
    report.textContent = data.error;
  } else {
    reportId = data.report_id;
    status.className = data.success ? "ok" : "fail";
    status.textContent = data.success ? "Validation successful" : "Validation failed";
    report.textContent = data.report;
  }
  document.getElementById("download").disabled = !reportId;
  document.getElementById("open-html").disabled = !reportId;
}

function submitForm(form, url) {
  form.addEventListener("submit", function (event) {
    event.preventDefault();
    document.querySelectorAll("form button").forEach(function (b) { b.disabled = true; });
    document.getElementById("progress").style.display = "block";
    document.getElementById("result").style.display = "none";
    fetch(url, { method: "POST", body: new FormData(form) })
      .then(function (response) { return response.json(); })
      .then(showResult)
      .catch(function (err) { showResult({ error: String(err) }); })
      .finally(function () {
        document.getElementById("progress").style.display = "none";
        document.querySelectorAll("form button").forEach(function (b) { b.disabled = false; });
      });
  });
}

submitForm(document.getElementById("file-form"), "/validate");
submitForm(document.getElementById("folder-form"), "/validate_folder");

document.getElementById("download").addEventListener("click", function () {
  if (reportId) { window.location = "/download_report/" + encodeURIComponent(reportId); }
});
document.getElementById("open-html").addEventListener("click", function () {
  if (reportId) { window.open("/open_html_report/" + encodeURIComponent(reportId), "_blank"); }
});
</script>
</body>
</html>
"##;
