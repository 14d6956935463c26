//! Directory listing module
//!
//! Renders the HTML index served for directories without an index file.

use crate::error::ServeError;
use crate::handler::path::decode_url_path;
use crate::http::response::escape_html;
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ListingEntry {
    /// Text shown to the user: `/` marks directories, `@` marks symlinks
    pub fn display_name(&self) -> String {
        if self.is_symlink {
            format!("{}@", self.name)
        } else if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Percent-encoded relative link target
    pub fn href(&self) -> String {
        let encoded = urlencoding::encode(&self.name);
        if self.is_dir {
            format!("{encoded}/")
        } else {
            encoded.into_owned()
        }
    }
}

/// Read the entries of `dir`, sorted case-insensitively by name
pub async fn read_entries(dir: &Path) -> Result<Vec<ListingEntry>, ServeError> {
    let mut reader = fs::read_dir(dir).await.map_err(ServeError::ListingDenied)?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await.map_err(ServeError::ListingDenied)? {
        let is_symlink = entry
            .file_type()
            .await
            .is_ok_and(|file_type| file_type.is_symlink());
        // Follows symlinks, so a link to a directory links with a trailing slash
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|meta| meta.is_dir());

        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }

    entries.sort_by_cached_key(|entry| entry.name.to_lowercase());
    Ok(entries)
}

/// Render the listing page for the directory requested as `url_path`
pub fn render_listing(url_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", escape_html(&decode_url_path(url_path)));

    let mut page = String::new();
    page.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(page, "<title>{title}</title>\n</head>\n<body>");
    let _ = writeln!(page, "<h1>{title}</h1>\n<hr>\n<ul>");
    for entry in entries {
        let _ = writeln!(
            page,
            "<li><a href=\"{}\">{}</a></li>",
            entry.href(),
            escape_html(&entry.display_name())
        );
    }
    page.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    page
}

/// Read `dir` and render its listing page
pub async fn list_directory(dir: &Path, url_path: &str) -> Result<String, ServeError> {
    let entries = read_entries(dir).await?;
    Ok(render_listing(url_path, &entries))
}
