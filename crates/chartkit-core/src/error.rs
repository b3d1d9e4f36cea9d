//! Error types for options and data ingestion.

use thiserror::Error;

/// Error applying an options patch.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The patch was not a JSON object.
    #[error("options patch must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    /// A key held a value of the wrong type.
    #[error("invalid option value: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Error ingesting chart data.
#[derive(Debug, Error)]
pub enum DataError {
    /// The payload did not match the chart's data shape.
    #[error("invalid chart data: {0}")]
    Invalid(#[from] serde_json::Error),
    /// No chart type is registered under the name.
    #[error("unknown chart kind: {0}")]
    UnknownKind(String),
    /// The chart type does not accept this kind of payload.
    #[error("{kind} charts do not accept {payload}")]
    Unsupported {
        /// Chart type
        kind: &'static str,
        /// Payload description
        payload: &'static str,
    },
}

/// JSON type name for error messages.
#[must_use]
pub fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_error_display() {
        let err = OptionsError::NotAnObject(json_kind(&serde_json::json!([1])));
        assert_eq!(
            err.to_string(),
            "options patch must be a JSON object, got an array"
        );
    }

    #[test]
    fn test_data_error_from_serde() {
        let err: DataError = serde_json::from_str::<Vec<f64>>("{")
            .map(|_| ())
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("invalid chart data"));
    }

    #[test]
    fn test_unsupported_display() {
        let err = DataError::Unsupported {
            kind: "gauge",
            payload: "stacked data",
        };
        assert_eq!(err.to_string(), "gauge charts do not accept stacked data");
    }
}
