//! Collision-avoiding path resolution

use std::path::{Path, PathBuf};

/// Resolve a non-colliding path for `filename` inside `directory`.
///
/// Returns `directory/filename` untouched when nothing exists there;
/// otherwise probes `{stem}_copy{N}{ext}` for N = 1, 2, ... and returns the
/// first candidate absent at check time. Only computes a path; creating the
/// file is the caller's job. Two resolvers racing on the same base name may
/// both observe the same absence and pick the same path (last writer wins;
/// the `_copyN` scheme tolerates rather than eliminates collisions).
pub fn unique_path(directory: &Path, filename: &str) -> PathBuf {
    let candidate = directory.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(filename);
    let stem = name
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let ext = name
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let candidate = directory.join(format!("{stem}_copy{counter}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }

    #[test]
    fn absent_file_resolves_unchanged() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            unique_path(dir.path(), "track.mp3"),
            dir.path().join("track.mp3")
        );
    }

    #[test]
    fn existing_file_gets_copy_suffix() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "track.mp3");

        assert_eq!(
            unique_path(dir.path(), "track.mp3"),
            dir.path().join("track_copy1.mp3")
        );
    }

    #[test]
    fn probing_skips_taken_copies() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "track.mp3");
        touch(&dir, "track_copy1.mp3");
        touch(&dir, "track_copy2.mp3");

        assert_eq!(
            unique_path(dir.path(), "track.mp3"),
            dir.path().join("track_copy3.mp3")
        );
    }

    #[test]
    fn first_gap_wins() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "track.mp3");
        touch(&dir, "track_copy2.mp3");

        assert_eq!(
            unique_path(dir.path(), "track.mp3"),
            dir.path().join("track_copy1.mp3")
        );
    }

    #[test]
    fn multi_dot_filenames_keep_inner_dots() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.b.mp3");

        assert_eq!(
            unique_path(dir.path(), "a.b.mp3"),
            dir.path().join("a.b_copy1.mp3")
        );
    }

    #[test]
    fn extensionless_filenames_work() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "notes");

        assert_eq!(
            unique_path(dir.path(), "notes"),
            dir.path().join("notes_copy1")
        );
    }
}
