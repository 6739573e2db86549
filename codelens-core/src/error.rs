//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining.
//! Only acquisition, configuration and validation failures stop a pipeline run; per-file problems
//! are reported as [`crate::Skipped`] entries instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

pub type CodelensResult<T> = Result<T, Box<CodelensError>>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Why a repository could not be materialized into a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionFailure {
    /// Remote unreachable, transport error, clone timed out
    Network,
    /// Credential missing, rejected or insufficient
    Auth,
    /// The requested branch does not exist on the remote
    BranchNotFound,
    /// The checkout is larger than the configured ceiling
    SizeLimitExceeded,
}

impl fmt::Display for AcquisitionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network failure",
            Self::Auth => "authentication failure",
            Self::BranchNotFound => "branch not found",
            Self::SizeLimitExceeded => "size limit exceeded",
        };
        f.write_str(label)
    }
}

/// Main error type for the Codelens system
#[derive(Error, Debug)]
pub enum CodelensError {
    #[error("Acquisition error ({kind}): {message}")]
    Acquisition {
        kind: AcquisitionFailure,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl CodelensError {
    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            CodelensError::Acquisition { context, .. }
            | CodelensError::Config { context, .. }
            | CodelensError::Validation { context, .. }
            | CodelensError::Timeout { context, .. }
            | CodelensError::Internal { context, .. } => context,
        }
    }

    /// The acquisition failure kind, if this error ended an acquisition.
    ///
    /// A clone that ran past its timeout counts as a network failure.
    pub fn acquisition_failure(&self) -> Option<AcquisitionFailure> {
        match self {
            CodelensError::Acquisition { kind, .. } => Some(*kind),
            CodelensError::Timeout { .. } => Some(AcquisitionFailure::Network),
            _ => None,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            CodelensError::Acquisition { kind, .. } => *kind == AcquisitionFailure::Network,
            CodelensError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            CodelensError::Internal { .. } => {
                error!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Internal error occurred"
                );
            }
            CodelensError::Config { .. } | CodelensError::Validation { .. } => {
                error!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Configuration or validation error"
                );
            }
            _ if self.is_recoverable() => {
                warn!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Network or timeout error (may be recoverable)"
                );
            }
            _ => {
                error!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! acquisition_error {
    ($kind:expr, $msg:expr, $component:expr) => {
        $crate::CodelensError::Acquisition {
            kind: $kind,
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($kind:expr, $msg:expr, $component:expr, $source:expr) => {
        $crate::CodelensError::Acquisition {
            kind: $kind,
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::CodelensError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'codelens config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::CodelensError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}
