use std::fs::{self, DirEntry, Metadata};
use std::path::Path;
use std::time::UNIX_EPOCH;

use rmcp::schemars;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::request::{require, Validatable};

/// Request parameters for listing a directory
#[derive(Debug, Clone, Default, Deserialize, schemars::JsonSchema)]
pub struct ListFilesQuery {
    /// The directory to list. Entries are not listed recursively.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Validatable for ListFilesQuery {
    type Valid = String;

    fn validate(self) -> Result<String> {
        require("directory", self.directory)
    }
}

/// One directory entry, as reported by `GET /file/list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch, 0 when unavailable
    pub last_modified: i64,
    pub directory: bool,
    pub file: bool,
    pub hidden: bool,
}

/// Validate the query and list the requested directory
pub fn list_files(query: ListFilesQuery) -> Result<Vec<FileInfo>> {
    let directory = query.validate()?;
    list_directory(Path::new(&directory))
}

/// List the entries of `dir`, sorted by name
pub fn list_directory(dir: &Path) -> Result<Vec<FileInfo>> {
    let context = || format!("failed to list `{}`", dir.display());
    let entries = fs::read_dir(dir).map_err(|e| Error::io(context(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(context(), e))?;
        files.push(file_info(&entry));
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(directory = %dir.display(), entries = files.len(), "listed directory");
    Ok(files)
}

fn file_info(entry: &DirEntry) -> FileInfo {
    let name = entry.file_name().to_string_lossy().into_owned();
    // Follow symlinks like a plain stat; a dangling link falls back to the link itself.
    let metadata = fs::metadata(entry.path())
        .or_else(|_| entry.metadata())
        .ok();

    match metadata {
        Some(meta) => FileInfo {
            hidden: is_hidden(&name, &meta),
            size: meta.len(),
            last_modified: last_modified_millis(&meta),
            directory: meta.is_dir(),
            file: meta.is_file(),
            name,
        },
        None => FileInfo {
            hidden: name.starts_with('.'),
            size: 0,
            last_modified: 0,
            directory: false,
            file: false,
            name,
        },
    }
}

fn last_modified_millis(meta: &Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(windows)]
fn is_hidden(_name: &str, meta: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[cfg(not(windows))]
fn is_hidden(name: &str, _meta: &Metadata) -> bool {
    name.starts_with('.')
}
