//! Feed error type shared by the changelog and news handlers

use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Debug)]
pub enum FeedError {
    /// Backing file missing or unreadable
    Io { path: PathBuf, source: io::Error },
    /// News feed is not a JSON array of entries
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// `fileURL` points outside the feed root
    PathRejected { requested: String },
}

impl FeedError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    pub fn rejected(requested: impl Into<String>) -> Self {
        Self::PathRejected {
            requested: requested.into(),
        }
    }

    /// HTTP status the router answers with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => 404,
            Self::Io { .. } | Self::Parse { .. } => 500,
            Self::PathRejected { .. } => 403,
        }
    }

    /// Short message safe to send back to clients (no filesystem paths)
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                "File not found"
            }
            Self::Io { .. } => "Failed to read file",
            Self::Parse { .. } => "Invalid news file",
            Self::PathRejected { .. } => "File not allowed",
        }
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            Self::PathRejected { requested } => {
                write!(f, "requested file '{requested}' is outside the feed root")
            }
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::PathRejected { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let missing = FeedError::io("news.json", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(missing.status_code(), 404);

        let denied = FeedError::io(
            "news.json",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert_eq!(denied.status_code(), 500);

        assert_eq!(FeedError::rejected("../etc/passwd").status_code(), 403);
    }

    #[test]
    fn test_display_includes_path() {
        let err = FeedError::io("/srv/CHANGELOG.md", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.to_string().contains("/srv/CHANGELOG.md"));
        assert!(!err.public_message().contains("/srv"));
    }

    #[test]
    fn test_parse_error_source() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = FeedError::parse("news.json", source);
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.status_code(), 500);
    }
}
