//! URL path to filesystem path translation.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Decode percent-escapes in a URL path. Invalid UTF-8 is replaced.
pub fn decode_url_path(url_path: &str) -> Cow<'_, str> {
    match urlencoding::decode_binary(url_path.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(url_path),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Translate the path component of a request target into a path under `root`.
///
/// `..` is resolved lexically and can never climb above `root`; empty and
/// `.` segments are dropped. On Windows any segment carrying a backslash is
/// dropped too.
pub fn translate_path(root: &Path, url_path: &str) -> PathBuf {
    let decoded = decode_url_path(url_path);

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            // Only Windows treats `\` as a separator
            s if cfg!(windows) && s.contains('\\') => {}
            s => segments.push(s),
        }
    }

    let mut path = root.to_path_buf();
    path.extend(segments);
    path
}
