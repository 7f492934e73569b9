//! Error handling for the listenomics workspace.

use thiserror::Error;

/// Error type shared by every stage of the pipeline.
///
/// Record-level problems (malformed lines, unmatched join keys) are never
/// errors; they are absorbed by the parsers and joins as silent drops. This
/// enum covers the stage-level failures that abort a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O operation failed: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Invalid configuration: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Data quality violation: {message}")]
    DataQuality {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Computation failed: {message}")]
    Computation {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an I/O error with a custom message.
    pub fn io_error<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with a custom message and source error.
    pub fn io_error_with_source<S: Into<String>, E: Into<anyhow::Error>>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a configuration error with a custom message.
    pub fn configuration_error<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with a custom message and source error.
    pub fn configuration_error_with_source<S: Into<String>, E: Into<anyhow::Error>>(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a data quality error with a custom message.
    pub fn data_quality_error<S: Into<String>>(message: S) -> Self {
        Self::DataQuality {
            message: message.into(),
            source: None,
        }
    }

    /// Create a computation error with a custom message.
    pub fn computation_error<S: Into<String>>(message: S) -> Self {
        Self::Computation {
            message: message.into(),
            source: None,
        }
    }

    /// Create a computation error with a custom message and source error.
    pub fn computation_error_with_source<S: Into<String>, E: Into<anyhow::Error>>(
        message: S,
        source: E,
    ) -> Self {
        Self::Computation {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}
