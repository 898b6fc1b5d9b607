//! Error types for the chord analysis engine

use std::fmt;

/// Errors that can occur during live chord analysis
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid input (wrong chroma dimensions, malformed sample data, etc.)
    InvalidInput(String),

    /// Configuration value out of range or non-finite
    InvalidConfig(String),

    /// Chroma extraction produced no usable output for a window
    ExtractionFailure(String),

    /// Audio decoding error
    DecodingError(String),

    /// Processing error during analysis (worker failures, channel errors)
    ProcessingError(String),

    /// Numerical error (NaN, overflow, etc.)
    NumericalError(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            AnalysisError::ExtractionFailure(msg) => write!(f, "Chroma extraction failed: {}", msg),
            AnalysisError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            AnalysisError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
            AnalysisError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = AnalysisError::InvalidConfig("hop_size must be > 0".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: hop_size must be > 0");

        let err = AnalysisError::ExtractionFailure("zero frames".to_string());
        assert_eq!(err.to_string(), "Chroma extraction failed: zero frames");
    }
}
