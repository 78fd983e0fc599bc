use serde::Serialize;
use spinscope_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Serializable `{kind, message}` view of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }

    pub fn report(&self) -> ErrorReport {
        let message = match self {
            Self::InvalidInput(m) | Self::Internal(m) => m.clone(),
        };
        ErrorReport {
            kind: self.kind(),
            message,
        }
    }
}

impl From<CoreError> for AnalysisError {
    fn from(e: CoreError) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_carries_kind_and_message() {
        let report = AnalysisError::InvalidInput("text must not be empty".into()).report();
        assert_eq!(report.kind, "invalid_input");
        assert_eq!(report.message, "text must not be empty");

        let json = serde_json::to_value(AnalysisError::Internal("boom".into()).report()).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "internal", "message": "boom"}));
    }

    #[test]
    fn core_errors_are_internal() {
        let pattern = regex::Regex::new("(").unwrap_err();
        let err: AnalysisError = CoreError::Pattern(pattern).into();
        assert_eq!(err.kind(), "internal");
        assert!(err.to_string().starts_with("internal error: pattern compile error"));
    }
}
