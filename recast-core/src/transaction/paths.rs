//! The three filesystem entities a run works with.

use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the transcoder output, created next to the original.
pub const DEFAULT_TEMP_FILE_NAME: &str = "TEMP_REENCODED.mp4";

/// Suffix appended to the original file name to form the backup name.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Original, temp output and backup paths for one transaction.
///
/// Temp and backup live in the original's directory by default so that every
/// rename the transaction performs stays on one filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionPaths {
    pub original: PathBuf,
    pub temp: PathBuf,
    pub backup: PathBuf,
}

impl TransactionPaths {
    /// Default layout: `TEMP_REENCODED.mp4` and `<original>.bak` beside the original.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recast_core::transaction::TransactionPaths;
    /// use std::path::Path;
    ///
    /// let paths = TransactionPaths::for_original("clips/DJI_0257_D.MP4");
    /// assert_eq!(paths.backup, Path::new("clips/DJI_0257_D.MP4.bak"));
    /// assert_eq!(paths.temp, Path::new("clips/TEMP_REENCODED.mp4"));
    /// ```
    pub fn for_original(original: impl Into<PathBuf>) -> Self {
        let original = original.into();
        let temp = sibling(&original, DEFAULT_TEMP_FILE_NAME);
        let backup = backup_path_for(&original);
        Self {
            original,
            temp,
            backup,
        }
    }

    #[must_use]
    pub fn with_temp(mut self, temp: impl Into<PathBuf>) -> Self {
        self.temp = temp.into();
        self
    }

    #[must_use]
    pub fn with_backup(mut self, backup: impl Into<PathBuf>) -> Self {
        self.backup = backup.into();
        self
    }

    /// True when any two of the three paths name the same file.
    ///
    /// Paths are compared after resolving their parent directories, so
    /// `sub/../clip.mp4`, `./clip.mp4` and a symlinked directory all match
    /// `clip.mp4`. Paths that both exist are also compared by file identity,
    /// which catches hard links and case-insensitive filesystems.
    pub fn has_overlap(&self) -> bool {
        same_file(&self.original, &self.temp)
            || same_file(&self.original, &self.backup)
            || same_file(&self.temp, &self.backup)
    }
}

/// True when `a` and `b` refer to the same file, whether or not it exists yet.
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    if a == b || resolved(a) == resolved(b) {
        return true;
    }
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => same_inode(&a, &b),
        _ => false,
    }
}

#[cfg(unix)]
fn same_inode(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_inode(_a: &fs::Metadata, _b: &fs::Metadata) -> bool {
    false
}

/// Canonical parent directory joined with the file name. The file itself
/// may not exist. Falls back to lexical cleanup when the parent cannot be
/// resolved.
fn resolved(path: &Path) -> PathBuf {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return lexically_normal(path);
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    match fs::canonicalize(parent) {
        Ok(dir) => dir.join(name),
        Err(_) => lexically_normal(path),
    }
}

fn lexically_normal(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `<original>.bak`: the suffix is appended, the extension is kept.
pub fn backup_path_for(original: &Path) -> PathBuf {
    let mut name: OsString = original.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_appends_suffix_to_full_name() {
        assert_eq!(
            backup_path_for(Path::new("DJI_20250206165918_0257_D.MP4")),
            PathBuf::from("DJI_20250206165918_0257_D.MP4.bak")
        );
    }

    #[test]
    fn bare_file_name_keeps_siblings_relative() {
        let paths = TransactionPaths::for_original("clip.mp4");
        assert_eq!(paths.temp, PathBuf::from("TEMP_REENCODED.mp4"));
        assert_eq!(paths.backup, PathBuf::from("clip.mp4.bak"));
        assert!(!paths.has_overlap());
    }

    #[test]
    fn overrides_replace_defaults() {
        let paths = TransactionPaths::for_original("/media/clip.mp4")
            .with_temp("/media/work.mp4")
            .with_backup("/media/clip.orig");
        assert_eq!(paths.temp, PathBuf::from("/media/work.mp4"));
        assert_eq!(paths.backup, PathBuf::from("/media/clip.orig"));
    }

    #[test]
    fn overlap_is_detected() {
        let paths = TransactionPaths::for_original("/media/TEMP_REENCODED.mp4");
        assert!(paths.has_overlap());
    }

    #[test]
    fn dot_segments_name_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let original = dir.path().join("clip.mp4");
        fs::write(&original, b"original").unwrap();

        let via_parent = TransactionPaths::for_original(&original)
            .with_temp(dir.path().join("sub").join("..").join("clip.mp4"));
        assert!(via_parent.has_overlap());

        let via_cur_dir = TransactionPaths::for_original(&original)
            .with_backup(dir.path().join(".").join("clip.mp4"));
        assert!(via_cur_dir.has_overlap());
    }

    #[test]
    fn aliases_of_files_that_do_not_exist_yet_are_detected() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let paths = TransactionPaths::for_original(dir.path().join("clip.mp4"))
            .with_temp(dir.path().join("work.mp4"))
            .with_backup(dir.path().join("sub").join("..").join("work.mp4"));
        assert!(paths.has_overlap());
    }

    #[test]
    fn unresolvable_parent_falls_back_to_lexical_form() {
        assert_eq!(
            lexically_normal(Path::new("/missing/sub/../clip.mp4")),
            PathBuf::from("/missing/clip.mp4")
        );
        let paths = TransactionPaths::for_original("/missing/clip.mp4")
            .with_temp("/missing/sub/../clip.mp4");
        assert!(paths.has_overlap());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        fs::create_dir(&media).unwrap();
        std::os::unix::fs::symlink(&media, dir.path().join("link")).unwrap();

        let paths = TransactionPaths::for_original(media.join("clip.mp4"))
            .with_temp(dir.path().join("link").join("clip.mp4"));
        assert!(paths.has_overlap());
    }

    #[cfg(unix)]
    #[test]
    fn hard_link_to_original_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("clip.mp4");
        fs::write(&original, b"original").unwrap();
        fs::hard_link(&original, dir.path().join("alias.mp4")).unwrap();

        let paths = TransactionPaths::for_original(&original).with_backup(dir.path().join("alias.mp4"));
        assert!(paths.has_overlap());
    }

    #[test]
    fn distinct_siblings_do_not_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("clip.mp4");
        fs::write(&original, b"original").unwrap();
        assert!(!TransactionPaths::for_original(&original).has_overlap());
    }
}
