/// Error handling for the view layer
///
/// This module provides:
/// - The error type every view entry point returns
/// - Machine-readable error codes
/// - Severity classification used when logging
use crate::messenger::DeliveryError;
use crate::renderer::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    /// The snapshot handed in breaks an invariant (e.g. round rate above the
    /// table's maximum). Never coerced into a default answer.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
    /// A mention handle or label would inject markup into the message.
    #[error("Invalid markup input {input:?}: {reason}")]
    InvalidMarkupInput { input: String, reason: String },
    #[error("Table rendering failed: {0}")]
    Render(#[from] RenderError),
    /// Not returned by the view itself, whose sends hand back a
    /// [`crate::messenger::DeliveryHandle`]. Lets a caller chain
    /// `view.send_turn_prompt(..)?.outcome().await?` under one error type.
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Who is responsible for an error, which decides how loudly it is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Bad input from the caller (inconsistent snapshot, unsafe handle)
    Caller,
    /// A collaborator (renderer, transport) failed
    Collaborator,
}

impl ViewError {
    pub fn invalid_markup(input: impl Into<String>, reason: impl Into<String>) -> Self {
        ViewError::InvalidMarkupInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ViewError::PreconditionViolation(_) => "precondition_violation",
            ViewError::InvalidMarkupInput { .. } => "invalid_markup_input",
            ViewError::Render(_) => "render_failure",
            ViewError::Delivery(_) => "delivery_failure",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ViewError::PreconditionViolation(_) | ViewError::InvalidMarkupInput { .. } => {
                ErrorSeverity::Caller
            }
            ViewError::Render(_) | ViewError::Delivery(_) => ErrorSeverity::Collaborator,
        }
    }

    /// Emits the error through `tracing` at a level matching its severity.
    pub fn log(&self, operation: &'static str) {
        match self.severity() {
            ErrorSeverity::Caller => tracing::warn!(
                operation,
                error_code = self.error_code(),
                error = %self,
                "view call rejected"
            ),
            ErrorSeverity::Collaborator => tracing::error!(
                operation,
                error_code = self.error_code(),
                error = %self,
                "view collaborator failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            ViewError::PreconditionViolation("x".into()).error_code(),
            "precondition_violation"
        );
        assert_eq!(
            ViewError::invalid_markup("*bold*", "unescaped '*'").error_code(),
            "invalid_markup_input"
        );
        assert_eq!(
            ViewError::from(DeliveryError::Abandoned).error_code(),
            "delivery_failure"
        );
        assert_eq!(
            ViewError::from(RenderError::new("no sprite")).error_code(),
            "render_failure"
        );
    }

    #[test]
    fn severity_splits_caller_and_collaborator_faults() {
        assert_eq!(
            ViewError::PreconditionViolation("x".into()).severity(),
            ErrorSeverity::Caller
        );
        assert_eq!(
            ViewError::invalid_markup("_", "unescaped '_'").severity(),
            ErrorSeverity::Caller
        );
        assert_eq!(
            ViewError::from(DeliveryError::NotModified).severity(),
            ErrorSeverity::Collaborator
        );
    }

    #[test]
    fn display_includes_offending_input() {
        let err = ViewError::invalid_markup("a*b", "unescaped '*'");
        assert_eq!(
            err.to_string(),
            "Invalid markup input \"a*b\": unescaped '*'"
        );
    }
}
