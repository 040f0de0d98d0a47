//! HTML views

use crate::paths;
use crate::types::{FlashMessage, RemoteFile};
use std::fmt::Write;

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Format a byte count for display (1024-based units).
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 960px; margin: 2em auto; padding: 0 1em; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: .4em .6em; border-bottom: 1px solid #ddd; }
.flash { padding: .6em 1em; margin: .5em 0; border-radius: 4px; }
.flash.success { background: #e6f4ea; color: #1e6b34; }
.flash.error { background: #fce8e6; color: #a50e0e; }
form.inline { display: inline; }
"#;

fn flash_block(flash: &[FlashMessage]) -> String {
    let mut out = String::new();
    for msg in flash {
        let _ = writeln!(
            out,
            r#"<div class="flash {}">{}</div>"#,
            msg.category,
            escape_html(&msg.text)
        );
    }
    out
}

fn layout(title: &str, flash: &[FlashMessage], body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/">Home</a> | <a href="/files">Files</a></nav>
<h1>{title}</h1>
{flash}
{body}
</body>
</html>"#,
        title = escape_html(title),
        flash = flash_block(flash),
        body = body,
    )
}

/// Landing page with the storage connection state.
pub fn status_page(connection: &str, flash: &[FlashMessage]) -> String {
    let body = format!(
        r#"<p>Storage: <strong>{}</strong></p>
<p><a href="/files">Browse files</a></p>"#,
        escape_html(connection)
    );
    layout("Yandex Disk", flash, &body)
}

/// File list with upload form and per-entry delete/rename controls.
///
/// Paths handed back to the server are percent-encoded so the handlers'
/// single decode yields the literal name. The rename link is encoded twice:
/// once consumed by query parsing, once by path normalization.
pub fn file_list(files: &[RemoteFile], flash: &[FlashMessage]) -> String {
    let mut rows = String::new();
    for file in files {
        let path = paths::encode(&file.path);
        let size = if file.is_directory {
            "-".to_string()
        } else {
            human_size(file.size)
        };
        let modified = file
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            rows,
            r#"<tr data-type="{kind}">
<td>{name}</td><td>{kind}</td><td>{size}</td><td>{modified}</td>
<td>
<a href="/files/rename?path={query}">Rename</a>
<form class="inline" method="post" action="/files/delete">
<input type="hidden" name="path" value="{path}">
<button type="submit">Delete</button>
</form>
</td>
</tr>"#,
            kind = file.kind(),
            name = escape_html(&file.name),
            size = size,
            modified = modified,
            query = paths::encode(&path),
            path = path,
        );
    }

    let table = if files.is_empty() {
        "<p>No files.</p>".to_string()
    } else {
        format!(
            r#"<table>
<thead><tr><th>Name</th><th>Type</th><th>Size</th><th>Modified</th><th></th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
        )
    };

    let body = format!(
        r#"<form method="post" action="/files/upload" enctype="multipart/form-data">
<input type="file" name="file">
<button type="submit">Upload</button>
</form>
{table}"#
    );
    layout("Files", flash, &body)
}

/// Rename form pre-filled with the current path and name.
pub fn rename_form(current_path: &str, current_name: &str, flash: &[FlashMessage]) -> String {
    let body = format!(
        r#"<p>Current path: <code>{path}</code></p>
<form method="post" action="/files/rename">
<input type="hidden" name="current_path" value="{encoded}">
<label>New name <input type="text" name="new_name" value="{name}"></label>
<button type="submit">Rename</button>
</form>
<p>The extension must stay the same.</p>
<p><a href="/files">Back</a></p>"#,
        path = escape_html(current_path),
        encoded = paths::encode(current_path),
        name = escape_html(current_name),
    );
    layout("Rename", flash, &body)
}
