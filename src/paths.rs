//! Path normalization for user-supplied storage paths
//!
//! Browsers hand back paths the way the storage API reported them, e.g.
//! `disk:/notes/a.txt`, sometimes percent-encoded. Every handler that takes a
//! path runs it through [`normalize`] so they all agree on what it names.

/// Literal prefix the storage API uses for the account root.
pub const ROOT_MARKER: &str = "disk:/";

/// Convert a raw user-supplied path into a canonical relative path.
///
/// Decodes percent escapes once, strips one leading [`ROOT_MARKER`], then
/// strips leading `/`. `.` and `..` segments are left alone; the storage API
/// resolves paths against the account root itself.
pub fn normalize(raw: &str) -> String {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    from_api_path(&decoded)
}

/// Canonical form of a path as the storage API reports it.
///
/// Like [`normalize`] but without decoding: API paths are already literal,
/// so a name such as `a%20b.txt` must keep its `%20`.
pub fn from_api_path(api_path: &str) -> String {
    let without_marker = api_path.strip_prefix(ROOT_MARKER).unwrap_or(api_path);
    without_marker.trim_start_matches('/').to_string()
}

/// Percent-encode a canonical path for a form field or query value that
/// will later go through [`normalize`].
///
/// `normalize(&encode(p)) == p` for every canonical `p`, whatever `%`
/// sequences the name itself contains.
pub fn encode(path: &str) -> String {
    urlencoding::encode(path).into_owned()
}

/// Last component of a path. Both `/` and `\` count as separators so a
/// client-supplied filename cannot smuggle in directories.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    match trimmed.rfind(['/', '\\']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Directory part of a relative path, or `None` when it has none.
pub fn parent_dir(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => None,
        Some(idx) => Some(&trimmed[..idx]),
    }
}

/// Extension of the last path component: the text after its final `.`,
/// or an empty string when there is none.
pub fn extension(path: &str) -> &str {
    let name = base_name(path);
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

/// Path of `new_name` placed in the same directory as `current`.
pub fn sibling_path(current: &str, new_name: &str) -> String {
    match parent_dir(current) {
        Some(dir) => format!("{}/{}", dir, new_name),
        None => new_name.to_string(),
    }
}

/// Whether a name contains a path separator.
pub fn has_separator(name: &str) -> bool {
    name.contains(['/', '\\'])
}

/// Render a canonical path back into the API's absolute form.
pub fn to_api_path(path: &str) -> String {
    format!("{}{}", ROOT_MARKER, path.trim_start_matches('/'))
}
