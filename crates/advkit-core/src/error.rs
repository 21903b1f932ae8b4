use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvkitError {
    #[error("input file not found: {0}")]
    InputNotFound(String),

    #[error("invalid record '{record}': {reason}")]
    InvalidInput { record: String, reason: String },

    #[error("input contains no records")]
    EmptyInput,

    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to write output to {path}: {source}")]
    OutputWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl AdvkitError {
    pub fn invalid(record: impl Into<String>, reason: impl Into<String>) -> Self {
        AdvkitError::InvalidInput {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code for this failure.
    ///
    /// 1 = generic / not found, 3 = malformed input data, 4 = output write.
    /// Usage errors (2) are raised by the argument parser before any of these.
    pub fn exit_code(&self) -> i32 {
        match self {
            AdvkitError::InvalidInput { .. }
            | AdvkitError::EmptyInput
            | AdvkitError::UnsupportedFormat(_)
            | AdvkitError::Json(_)
            | AdvkitError::Csv(_) => 3,
            AdvkitError::OutputWrite { .. } => 4,
            AdvkitError::InputNotFound(_)
            | AdvkitError::InvalidConfig(_)
            | AdvkitError::Io(_)
            | AdvkitError::Yaml(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdvkitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(AdvkitError::InputNotFound("x".into()).exit_code(), 1);
        assert_eq!(AdvkitError::invalid("R1", "bad").exit_code(), 3);
        assert_eq!(AdvkitError::EmptyInput.exit_code(), 3);
        let write = AdvkitError::OutputWrite {
            path: "/nope".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(write.exit_code(), 4);
    }

    #[test]
    fn json_errors_are_malformed_input() {
        let err: AdvkitError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn invalid_input_message_names_record() {
        let err = AdvkitError::invalid("CAPA-7", "closed before opened");
        assert_eq!(
            err.to_string(),
            "invalid record 'CAPA-7': closed before opened"
        );
    }
}
