use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

impl From<serde_json::Error> for SaveError {
    fn from(err: serde_json::Error) -> Self {
        SaveError::Serialization(err.to_string())
    }
}

impl SaveError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            SaveError::Io(_) => true,
            SaveError::Configuration(_) => true, // Set the key and retry
            SaveError::Serialization(_) => false,
            SaveError::Decryption(_) => false,
            SaveError::Validation(_) => false,
            SaveError::ChecksumMismatch { .. } => false,
        }
    }
}

/// A semantic bounds violation found in a structurally valid record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("abnormal stage level: {0}")]
    StageLevel(i32),

    #[error("abnormal boss distance: {0}")]
    NextBossDistance(i64),

    #[error("abnormal mid-boss distance (negative): {0}")]
    NextMidBossDistance(i64),

    #[error("too many {collection} entries: {count}")]
    CollectionTooLarge {
        collection: &'static str,
        count: usize,
    },

    #[error("current achievement distance exceeds the all-time maximum: {current}/{max}")]
    AchievementDistance { current: i64, max: i64 },
}

pub type Result<T> = std::result::Result<T, SaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_embed_values() {
        assert_eq!(
            ValidationError::StageLevel(10001).to_string(),
            "abnormal stage level: 10001"
        );
        let err = ValidationError::CollectionTooLarge {
            collection: "rune",
            count: 501,
        };
        assert_eq!(err.to_string(), "too many rune entries: 501");
        let err = ValidationError::AchievementDistance { current: 11, max: 10 };
        assert!(err.to_string().contains("11/10"));
    }

    #[test]
    fn test_recoverable_classes() {
        assert!(SaveError::Configuration("missing key".into()).is_recoverable());
        assert!(!SaveError::Decryption("bad padding".into()).is_recoverable());
        let err: SaveError = ValidationError::StageLevel(0).into();
        assert!(!err.is_recoverable());
    }
}
