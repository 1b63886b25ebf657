use std::fs;
use std::path::{Path, PathBuf};

/// Absolute form of `path` with its parent directory canonicalized. The
/// final component is kept as given so that a target which doesn't exist
/// yet still normalizes.
pub fn normalize_path(path: &Path) -> PathBuf {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let parent = parent
        .canonicalize()
        .unwrap_or_else(|_| parent.to_path_buf());

    match path.file_name() {
        Some(name) => parent.join(name),
        None => path.to_path_buf(),
    }
}

/// Whether two existing paths refer to the same file on disk.
pub fn same_file(a: &Path, b: &Path) -> bool {
    let (Ok(meta_a), Ok(meta_b)) = (fs::metadata(a), fs::metadata(b)) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        meta_a.dev() == meta_b.dev() && meta_a.ino() == meta_b.ino()
    }
    #[cfg(not(unix))]
    {
        let _ = (meta_a, meta_b);
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase(),
            _ => false,
        }
    }
}

/// Probe whether the directory holding `existing` folds case, by looking
/// up the same file name with its letter case flipped. Nothing is written,
/// so this is safe during a dry run. Returns false when the name has no
/// letters to flip.
pub fn is_case_insensitive_dir(existing: &Path) -> bool {
    let Some(name) = existing.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return false;
    };

    let flipped: String = name
        .chars()
        .map(|c| {
            if c.is_lowercase() {
                c.to_uppercase().next().unwrap_or(c)
            } else {
                c.to_lowercase().next().unwrap_or(c)
            }
        })
        .collect();

    if flipped == name {
        return false;
    }

    same_file(existing, &existing.with_file_name(flipped))
}

/// Whether `from` -> `to` only changes letter case.
pub fn is_case_only_change(from: &Path, to: &Path) -> bool {
    from != to && from.to_string_lossy().to_lowercase() == to.to_string_lossy().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_relative_and_absolute_agree() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        let dotted = temp_dir.path().join(".").join("a.txt");
        assert_eq!(normalize_path(&file), normalize_path(&dotted));
    }

    #[test]
    fn test_normalize_keeps_missing_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("not-yet.txt");
        let normalized = normalize_path(&target);
        assert_eq!(normalized.file_name().unwrap(), "not-yet.txt");
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_same_file() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        fs::write(&a, "1").unwrap();
        fs::write(&b, "1").unwrap();

        assert!(same_file(&a, &a));
        assert!(!same_file(&a, &b));
        assert!(!same_file(&a, &temp_dir.path().join("missing")));
    }

    #[test]
    fn test_case_only_change() {
        assert!(is_case_only_change(Path::new("a.txt"), Path::new("A.txt")));
        assert!(!is_case_only_change(Path::new("a.txt"), Path::new("a.txt")));
        assert!(!is_case_only_change(Path::new("a.txt"), Path::new("b.txt")));
    }

    #[test]
    fn test_case_check_does_not_panic() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("Probe.txt");
        fs::write(&file, "x").unwrap();
        // Result depends on the filesystem; the directory must be untouched.
        let _ = is_case_insensitive_dir(&file);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);

        let digits = temp_dir.path().join("123");
        fs::write(&digits, "x").unwrap();
        assert!(!is_case_insensitive_dir(&digits));
    }
}
