use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{SyncError, io_err};

/// Outcome of comparing a source file with its destination counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Nothing exists at the destination path.
    Missing,
    /// Both exist with different lengths.
    SizeDiffers { source: u64, dest: u64 },
    /// Both exist with the same length. Contents are not inspected, so equal
    /// sizes with different bytes also land here.
    SameSize(u64),
    /// The destination is a symlink. It is replaced, never written through.
    Symlink,
}

impl Comparison {
    pub fn needs_copy(&self) -> bool {
        !matches!(self, Comparison::SameSize(_))
    }
}

/// Compare `source` with `dest` by existence and size.
pub fn compare(source: &Path, dest: &Path) -> Result<Comparison, SyncError> {
    let source_len = fs::symlink_metadata(source)
        .map_err(|e| io_err(source, e))?
        .len();

    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.file_type().is_symlink() => Ok(Comparison::Symlink),
        Ok(meta) if meta.len() == source_len => Ok(Comparison::SameSize(source_len)),
        Ok(meta) => Ok(Comparison::SizeDiffers {
            source: source_len,
            dest: meta.len(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Comparison::Missing),
        Err(e) => Err(io_err(dest, e)),
    }
}

/// Copy `source` to `dest`, creating missing parent directories. A symlink
/// at `dest` is removed first, so its target is left alone. The file mode is
/// carried over by `fs::copy`. Returns the number of bytes written.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64, SyncError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if fs::symlink_metadata(dest).is_ok_and(|meta| meta.file_type().is_symlink()) {
        tracing::debug!("Replacing symlink {}", dest.display());
        fs::remove_file(dest).map_err(|e| io_err(dest, e))?;
    }
    fs::copy(source, dest).map_err(|e| io_err(dest, e))
}

/// Whether anything exists at `path`. Errors other than "not found" are
/// returned so callers can tell "absent" from "could not check".
pub fn exists(path: &Path) -> Result<bool, SyncError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_err(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_compare_missing_destination() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.txt");
        fs::write(&src, "hello").unwrap();

        let cmp = compare(&src, &temp_dir.path().join("b.txt")).unwrap();
        assert_eq!(cmp, Comparison::Missing);
        assert!(cmp.needs_copy());
    }

    #[test]
    fn test_compare_sizes() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.txt");
        let dst = temp_dir.path().join("b.txt");
        fs::write(&src, "hello").unwrap();
        fs::write(&dst, "hi").unwrap();

        assert_eq!(
            compare(&src, &dst).unwrap(),
            Comparison::SizeDiffers { source: 5, dest: 2 }
        );

        fs::write(&dst, "HELLO").unwrap();
        let cmp = compare(&src, &dst).unwrap();
        assert_eq!(cmp, Comparison::SameSize(5));
        assert!(!cmp.needs_copy());
    }

    #[test]
    fn test_compare_missing_source_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err =
            compare(&temp_dir.path().join("gone"), &temp_dir.path().join("b")).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn test_copy_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.txt");
        let dst = temp_dir.path().join("deep/er/a.txt");
        fs::write(&src, "content").unwrap();

        let written = copy_file(&src, &dst).unwrap();
        assert_eq!(written, 7);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "content");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("run.sh");
        let dst = temp_dir.path().join("out/run.sh");
        fs::write(&src, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o750)).unwrap();

        copy_file(&src, &dst).unwrap();
        let mode = fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o750);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_replaces_destination_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let outside = temp_dir.path().join("outside.txt");
        let src = temp_dir.path().join("src.txt");
        let dst = temp_dir.path().join("tree/link.txt");
        fs::write(&outside, "keep").unwrap();
        fs::write(&src, "fresh bytes").unwrap();
        fs::create_dir_all(dst.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&outside, &dst).unwrap();

        let cmp = compare(&src, &dst).unwrap();
        assert_eq!(cmp, Comparison::Symlink);
        assert!(cmp.needs_copy());

        copy_file(&src, &dst).unwrap();
        assert!(!fs::symlink_metadata(&dst).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "fresh bytes");
        assert_eq!(fs::read_to_string(&outside).unwrap(), "keep");
    }

    #[test]
    fn test_exists() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a");
        assert!(!exists(&file).unwrap());
        fs::write(&file, "").unwrap();
        assert!(exists(&file).unwrap());
    }
}
