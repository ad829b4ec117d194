//! Mapping between local paths and object keys
//!
//! Upload roots follow the trailing-slash convention: `data/` uploads the
//! contents of `data`, while `data` uploads the directory itself so every key
//! starts with `data/`.

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::path::{BucketPath, ObjectRef};

/// Directory that upload keys are computed relative to
pub fn upload_base(root: &Path) -> PathBuf {
    if has_trailing_separator(root) {
        return root.to_path_buf();
    }
    match root.parent() {
        Some(parent) => parent.to_path_buf(),
        None => root.to_path_buf(),
    }
}

fn has_trailing_separator(path: &Path) -> bool {
    path.as_os_str()
        .as_encoded_bytes()
        .last()
        .is_some_and(|&b| std::path::is_separator(b as char))
}

/// Slash-separated key of `file` relative to `base`
pub fn relative_key(file: &Path, base: &Path) -> Result<String> {
    let relative = file.strip_prefix(base).map_err(|_| {
        Error::InvalidPath(format!(
            "{} is not under {}",
            file.display(),
            base.display()
        ))
    })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => {
                let name = name.to_str().ok_or_else(|| {
                    Error::InvalidPath(format!("{} is not valid UTF-8", file.display()))
                })?;
                segments.push(name);
            }
            Component::CurDir => {}
            _ => {
                return Err(Error::InvalidPath(format!(
                    "Cannot derive an object key from {}",
                    file.display()
                )));
            }
        }
    }

    if segments.is_empty() {
        return Err(Error::InvalidPath(format!(
            "Cannot derive an object key from {}",
            file.display()
        )));
    }

    Ok(segments.join("/"))
}

/// Object reference an uploaded file lands on
pub fn upload_object(file: &Path, base: &Path, target: &BucketPath) -> Result<ObjectRef> {
    let key = relative_key(file, base)?;
    Ok(target.object(&key))
}

/// Local path mirroring `key` under `dest`
pub fn local_path_for_key(dest: &Path, key: &str) -> Result<PathBuf> {
    let mut path = dest.to_path_buf();
    let mut depth = 0;
    for segment in key.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(Error::InvalidPath(format!(
                    "Refusing to write key '{key}' outside {}",
                    dest.display()
                )));
            }
            segment => {
                path.push(segment);
                depth += 1;
            }
        }
    }

    if depth == 0 {
        return Err(Error::InvalidPath(format!(
            "Key '{key}' does not name a file"
        )));
    }
    Ok(path)
}
