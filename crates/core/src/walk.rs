//! Local file enumeration
//!
//! Resolves an upload root into the flat sequence of files beneath it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Lazy, single-pass iterator over the files under a root path
///
/// A directory root yields every non-directory descendant, in the order the
/// filesystem returns them. Any other root yields itself. Symlinks are never
/// followed into. The first error ends the iteration.
#[derive(Debug)]
pub struct LocalFiles {
    root: Option<PathBuf>,
    pending: Vec<PathBuf>,
    current: Option<(PathBuf, fs::ReadDir)>,
    done: bool,
}

impl LocalFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            pending: Vec::new(),
            current: None,
            done: false,
        }
    }

    fn fail(&mut self, path: &Path, source: std::io::Error) -> Option<Result<PathBuf>> {
        self.done = true;
        self.pending.clear();
        self.current = None;
        Some(Err(Error::local(path, source)))
    }
}

impl Iterator for LocalFiles {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(root) = self.root.take() {
            match fs::metadata(&root) {
                Ok(meta) if meta.is_dir() => self.pending.push(root),
                Ok(_) => return Some(Ok(root)),
                Err(e) => return self.fail(&root, e),
            }
        }

        loop {
            if let Some((dir, entries)) = self.current.as_mut() {
                match entries.next() {
                    Some(Ok(entry)) => {
                        let path = entry.path();
                        match entry.file_type() {
                            Ok(ft) if ft.is_dir() => self.pending.push(path),
                            Ok(_) => return Some(Ok(path)),
                            Err(e) => return self.fail(&path, e),
                        }
                    }
                    Some(Err(e)) => {
                        let dir = dir.clone();
                        return self.fail(&dir, e);
                    }
                    None => self.current = None,
                }
                continue;
            }

            let dir = match self.pending.pop() {
                Some(dir) => dir,
                None => {
                    self.done = true;
                    return None;
                }
            };

            match fs::read_dir(&dir) {
                Ok(entries) => {
                    tracing::debug!("Scanning {}", dir.display());
                    self.current = Some((dir, entries));
                }
                Err(e) => return self.fail(&dir, e),
            }
        }
    }
}

impl std::iter::FusedIterator for LocalFiles {}
