use std::path::PathBuf;

/// Custom error type for the pocketmark library
///
/// The store variants (`ProfileNotFound` through `WriteFailed`) are fatal to an
/// export run. Callers report them together with [`PocketmarkError::stage`] and
/// never retry.
#[derive(Debug, thiserror::Error)]
pub enum PocketmarkError {
    /// No bookmark store exists for the requested browser/profile
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Several Firefox profiles match and none was chosen explicitly
    #[error(
        "Ambiguous Firefox profile, pick one with --firefox-profile: {}",
        display_paths(.0)
    )]
    ProfileAmbiguous(Vec<PathBuf>),

    /// Store file is not in a format we understand
    #[error("Malformed bookmark store: {0}")]
    MalformedStore(String),

    #[error("Backup of {path:?} failed: {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store has no bookmarks-bar root to export into
    #[error("Bookmark root not found: {0}")]
    RootNotFound(String),

    #[error("Writing {path:?} failed: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O errors outside the backup/write stages
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Pocket OAuth failures
    #[error("Pocket authorization failed: {0}")]
    Auth(String),

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing/serialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Generic error for cases that don't fit other categories
    #[error("{0}")]
    Other(String),
}

/// Result type alias using PocketmarkError
pub type Result<T> = std::result::Result<T, PocketmarkError>;

impl PocketmarkError {
    /// Name of the export stage this error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            PocketmarkError::ProfileNotFound(_) | PocketmarkError::ProfileAmbiguous(_) => "locate",
            PocketmarkError::MalformedStore(_) => "decode",
            PocketmarkError::BackupFailed { .. } => "backup",
            PocketmarkError::RootNotFound(_) => "merge",
            PocketmarkError::WriteFailed { .. } => "write",
            PocketmarkError::Http(_) | PocketmarkError::Auth(_) => "fetch",
            PocketmarkError::Config(_) | PocketmarkError::Yaml(_) => "config",
            _ => "run",
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<String> for PocketmarkError {
    fn from(s: String) -> Self {
        PocketmarkError::Other(s)
    }
}

impl From<&str> for PocketmarkError {
    fn from(s: &str) -> Self {
        PocketmarkError::Other(s.to_string())
    }
}

impl From<serde_yaml::Error> for PocketmarkError {
    fn from(err: serde_yaml::Error) -> Self {
        PocketmarkError::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for PocketmarkError {
    fn from(err: serde_json::Error) -> Self {
        PocketmarkError::Json(err.to_string())
    }
}

impl From<simd_json::Error> for PocketmarkError {
    fn from(err: simd_json::Error) -> Self {
        PocketmarkError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PocketmarkError::ProfileNotFound("x".into()), "locate")]
    #[case(PocketmarkError::ProfileAmbiguous(vec![]), "locate")]
    #[case(PocketmarkError::MalformedStore("x".into()), "decode")]
    #[case(PocketmarkError::RootNotFound("x".into()), "merge")]
    #[case(PocketmarkError::Auth("x".into()), "fetch")]
    #[case(PocketmarkError::Other("x".into()), "run")]
    fn test_stage_names(#[case] err: PocketmarkError, #[case] stage: &str) {
        assert_eq!(err.stage(), stage);
    }

    #[test]
    fn test_io_stages() {
        let backup = PocketmarkError::BackupFailed {
            path: PathBuf::from("Bookmarks"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(backup.stage(), "backup");
        assert!(backup.to_string().contains("disk full"));

        let write = PocketmarkError::WriteFailed {
            path: PathBuf::from("Bookmarks"),
            source: std::io::Error::other("read-only"),
        };
        assert_eq!(write.stage(), "write");
    }

    #[test]
    fn test_ambiguous_lists_candidates() {
        let err = PocketmarkError::ProfileAmbiguous(vec![
            PathBuf::from("/p/a.default-release"),
            PathBuf::from("/p/b.default-release"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("/p/a.default-release"));
        assert!(msg.contains("/p/b.default-release"));
    }
}
