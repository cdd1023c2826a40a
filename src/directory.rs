use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};

/// Per-year output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearDirectory {
    pub year: i32,
    pub path: PathBuf,
    /// Whether this call created the directory.
    pub created: bool,
}

/// Creates `<root>/<year>` directories on demand.
#[derive(Debug)]
pub struct DirectoryManager {
    root: PathBuf,
    ensured: BTreeSet<i32>,
}

impl DirectoryManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ensured: BTreeSet::new(),
        }
    }

    pub fn year_path(&self, year: i32) -> PathBuf {
        self.root.join(year.to_string())
    }

    /// Make sure the directory for `year` exists. Repeated calls for the same
    /// year do not touch the filesystem again.
    pub fn ensure_year(&mut self, year: i32) -> Result<YearDirectory> {
        let path = self.year_path(year);
        if self.ensured.contains(&year) {
            return Ok(YearDirectory {
                year,
                path,
                created: false,
            });
        }

        let created = if path.is_dir() {
            false
        } else {
            fs::create_dir_all(&path).map_err(|source| Error::Directory {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "created year directory");
            true
        };

        self.ensured.insert(year);
        Ok(YearDirectory {
            year,
            path,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_once() {
        let tmp = tempfile::tempdir().unwrap();
        let mut dm = DirectoryManager::new(tmp.path().join("GFASv1p2"));

        let first = dm.ensure_year(2003).unwrap();
        assert!(first.created);
        assert!(first.path.is_dir());
        assert_eq!(first.path, tmp.path().join("GFASv1p2").join("2003"));

        let second = dm.ensure_year(2003).unwrap();
        assert!(!second.created);
        assert_eq!(second.path, first.path);
    }

    #[test]
    fn existing_directory_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("2010")).unwrap();
        let mut dm = DirectoryManager::new(tmp.path());
        let d = dm.ensure_year(2010).unwrap();
        assert!(!d.created);
    }

    #[test]
    fn file_in_the_way_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("2011"), b"x").unwrap();
        let mut dm = DirectoryManager::new(tmp.path());
        let err = dm.ensure_year(2011).unwrap_err();
        assert!(matches!(err, Error::Directory { .. }));
    }
}
