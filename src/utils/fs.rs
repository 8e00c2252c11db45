//! Filesystem utilities.
//!
//! Helper functions for file operations.

use std::io::Write;
use std::path::Path;

use crate::error::{Result, SkillError};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        std::fs::create_dir_all(path)
            .map_err(|err| SkillError::fs("create directory", path, err))?;
    }
    Ok(())
}

/// Read a file to string, returning None if it doesn't exist.
pub fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(SkillError::fs("read", path, err)),
    }
}

/// Write `contents` to `path` via a temp file in the same directory and a rename,
/// so readers never observe a half-written file.
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|err| SkillError::fs("create temp file in", parent, err))?;
    temp.write_all(contents)
        .map_err(|err| SkillError::fs("write", temp.path().to_path_buf(), err))?;
    temp.persist(path)
        .map_err(|err| SkillError::fs("replace", path, err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_creates_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/store.json");
        write_atomic(&path, b"one").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one");
        write_atomic(&path, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");

        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn read_optional_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_optional(dir.path().join("missing")).unwrap().is_none());
        std::fs::write(dir.path().join("present"), "x").unwrap();
        assert_eq!(read_optional(dir.path().join("present")).unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn ensure_dir_fails_below_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, "x").unwrap();
        let err = ensure_dir(file.join("child")).unwrap_err();
        assert!(matches!(err, SkillError::Filesystem { .. }));
    }
}
