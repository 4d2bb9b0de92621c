//! In-Memory Virtual File System
//!
//! A flat path→entry store materialized once from an archive. There is no
//! directory tree: a path is a directory exactly when some stored key
//! continues past it with a `/`. Keys are archive-relative (no leading
//! slash); directory-marker keys keep their trailing slash, so the same
//! prefix test covers explicit markers and inferred directories alike.

use std::collections::{BTreeSet, HashMap};

use super::types::{VfsEntry, VfsError};

/// Normalize `path` against the absolute directory `base_dir`.
///
/// An empty `path` resolves to `base_dir` itself. Empty and `.` segments
/// are dropped; `..` pops one segment and is a no-op at root, so no input
/// can ascend above `/`. The result always starts with `/` and never ends
/// with `/` except for root. Idempotent on already-normalized input.
pub fn normalize_path(base_dir: &str, path: &str) -> String {
    if path.is_empty() {
        return base_dir.to_string();
    }
    let raw = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", base_dir.trim_end_matches('/'), path)
    };
    let mut resolved: Vec<&str> = Vec::new();
    for part in raw.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            _ => resolved.push(part),
        }
    }
    if resolved.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", resolved.join("/"))
    }
}

/// In-memory virtual filesystem.
#[derive(Debug, Default)]
pub struct VirtualFs {
    entries: HashMap<String, VfsEntry>,
}

impl VirtualFs {
    /// Create from an initial mapping of archive-relative keys.
    pub fn from_entries(entries: HashMap<String, VfsEntry>) -> Self {
        Self { entries }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the content of a file entry by absolute path.
    pub fn file_content(&self, path: &str) -> Option<&str> {
        match self.entries.get(path.trim_start_matches('/')) {
            Some(VfsEntry::File(content)) => Some(content.as_str()),
            _ => None,
        }
    }

    /// A path is a directory when it is root or some stored key continues
    /// past it with a `/`. A marker's own trailing-slash key satisfies the
    /// test for the marker itself.
    pub fn exists_as_directory(&self, path: &str) -> bool {
        if path == "/" {
            return true;
        }
        let prefix = format!("{}/", path.trim_start_matches('/'));
        self.entries.keys().any(|key| key.starts_with(&prefix))
    }

    /// List the names directly under an already-normalized directory path:
    /// subdirectories first (rendered with a trailing slash), then files,
    /// each group sorted lexicographically. An existing directory with no
    /// entries yields an empty list, not an error.
    pub fn list(&self, path: &str) -> Result<Vec<String>, VfsError> {
        if path != "/" && !self.exists_as_directory(path) {
            return Err(VfsError::NotFound {
                path: path.to_string(),
            });
        }
        let prefix = if path == "/" {
            String::new()
        } else {
            format!("{}/", path.trim_start_matches('/'))
        };

        let mut dirs: BTreeSet<String> = BTreeSet::new();
        let mut files: BTreeSet<String> = BTreeSet::new();
        for key in self.entries.keys() {
            let rest = match key.strip_prefix(prefix.as_str()) {
                Some(rest) => rest,
                None => continue,
            };
            if rest.is_empty() {
                // the listed directory's own marker
                continue;
            }
            match rest.split_once('/') {
                Some((sub, _)) => {
                    dirs.insert(format!("{}/", sub));
                }
                None => {
                    files.insert(rest.to_string());
                }
            }
        }

        Ok(dirs.into_iter().chain(files).collect())
    }

    /// Copy one file entry to an already-normalized destination. A
    /// destination that is a directory receives `<dst>/<basename of src>`;
    /// a destination that names an existing file is overwritten silently.
    /// Returns the absolute path the content landed at.
    pub fn copy(&mut self, src: &str, dst: &str) -> Result<String, VfsError> {
        let src_key = src.trim_start_matches('/');
        let entry = match self.entries.get(src_key) {
            Some(entry @ VfsEntry::File(_)) => entry.clone(),
            _ => {
                return Err(VfsError::NotFound {
                    path: src.to_string(),
                })
            }
        };

        let dst_key = dst.trim_start_matches('/');
        let target = if self.exists_as_directory(dst) {
            let basename = src_key.rsplit('/').next().unwrap_or(src_key);
            if dst_key.is_empty() {
                basename.to_string()
            } else {
                format!("{}/{}", dst_key, basename)
            }
        } else if self.entries.contains_key(dst_key) {
            dst_key.to_string()
        } else {
            return Err(VfsError::DestinationNotFound {
                path: dst.to_string(),
            });
        };

        let landed = format!("/{}", target);
        self.entries.insert(target, entry);
        Ok(landed)
    }
}
