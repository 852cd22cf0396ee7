//! Error types for the freshness cache

use std::fmt;

/// Snapshot persistence failures.
///
/// The cache itself never returns these from its accessors; they surface from
/// [`SnapshotStore`](crate::SnapshotStore) implementations and are logged.
#[derive(Debug)]
pub enum CacheError {
    Io(Box<std::io::Error>),
    Serialization(serde_json::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Io(err) => write!(f, "Snapshot IO error: {}", err),
            CacheError::Serialization(err) => write!(f, "Snapshot serialization error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(err) => Some(err.as_ref()),
            CacheError::Serialization(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io(Box::new(err))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err)
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_error_display() {
        let err = CacheError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only filesystem",
        ));
        assert_eq!(
            format!("{}", err),
            "Snapshot IO error: read-only filesystem"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_serialization_error_display() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = CacheError::from(json_err);
        assert!(format!("{}", err).starts_with("Snapshot serialization error:"));
    }
}
