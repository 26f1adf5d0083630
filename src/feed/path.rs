//! Backing file resolution
//!
//! Maps the `fileURL` query parameter onto a file below the configured feed
//! root. Only plain relative paths are accepted.

use std::path::{Component, Path, PathBuf};

use super::error::{FeedError, Result};

/// Resolve `requested` (or `default` when absent) against `root`.
pub fn resolve(root: &Path, requested: Option<&str>, default: &str) -> Result<PathBuf> {
    let name = requested.unwrap_or(default);
    let relative = Path::new(name);

    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if name.is_empty() || !plain {
        return Err(FeedError::rejected(name));
    }

    let path = root.join(relative);

    // Symlinks must not lead outside the root. A file that does not exist is
    // left for the reader to report.
    if let (Ok(root_canonical), Ok(path_canonical)) = (root.canonicalize(), path.canonicalize()) {
        if !path_canonical.starts_with(&root_canonical) {
            return Err(FeedError::rejected(name));
        }
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_used_when_not_requested() {
        let path = resolve(Path::new("/srv/feeds"), None, "news.json").unwrap();
        assert_eq!(path, PathBuf::from("/srv/feeds/news.json"));
    }

    #[test]
    fn test_relative_request() {
        let path = resolve(Path::new("/srv/feeds"), Some("beta/news.json"), "news.json").unwrap();
        assert_eq!(path, PathBuf::from("/srv/feeds/beta/news.json"));
    }

    #[test]
    fn test_traversal_rejected() {
        let root = Path::new("/srv/feeds");
        assert!(matches!(
            resolve(root, Some("../secret.json"), "news.json"),
            Err(FeedError::PathRejected { .. })
        ));
        assert!(matches!(
            resolve(root, Some("beta/../../secret.json"), "news.json"),
            Err(FeedError::PathRejected { .. })
        ));
        assert!(matches!(
            resolve(root, Some("/etc/passwd"), "news.json"),
            Err(FeedError::PathRejected { .. })
        ));
        assert!(matches!(
            resolve(root, Some(""), "news.json"),
            Err(FeedError::PathRejected { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let outside = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.md"), "secret").unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.md"), root.path().join("link.md"))
            .unwrap();

        let result = resolve(root.path(), Some("link.md"), "CHANGELOG.md");
        assert!(matches!(result, Err(FeedError::PathRejected { .. })));
    }
}
