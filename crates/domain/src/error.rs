//! Unified error types for the domain layer
//!
//! Formula evaluation never fails; these errors cover the operations around it:
//! parsing field paths, structural edits, and validating reference data.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (field paths, labels)
    #[error("Parse error: {0}")]
    Parse(String),

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when a value is structurally fine but not acceptable:
    /// - Required names are empty
    /// - Costs are negative
    /// - Labels are outside the allowed set
    ///
    /// # Example
    /// ```ignore
    /// if entry.name.trim().is_empty() {
    ///     return Err(DomainError::validation("Quality name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant or path.
    ///
    /// # Example
    /// ```ignore
    /// impl FromStr for StatKey {
    ///     type Err = DomainError;
    ///     fn from_str(s: &str) -> Result<Self, Self::Err> {
    ///         match s {
    ///             "ACC" => Ok(Self::Acc),
    ///             _ => Err(DomainError::parse(format!("Unknown stat: {}", s))),
    ///         }
    ///     }
    /// }
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = DomainError::validation("name cannot be empty");
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: name cannot be empty");
    }

    #[test]
    fn test_not_found_error() {
        let err = DomainError::not_found("Attack", "4");
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(err.to_string(), "Entity not found: Attack with id 4");
    }

    #[test]
    fn test_constraint_error() {
        let err = DomainError::constraint("signature move cannot be removed");
        assert!(matches!(err, DomainError::Constraint(_)));
        assert_eq!(
            err.to_string(),
            "Constraint violation: signature move cannot be removed"
        );
    }

    #[test]
    fn test_parse_error() {
        let err = DomainError::parse("Unknown field path: stats.XYZ.dp");
        assert!(matches!(err, DomainError::Parse(_)));
        assert!(err.to_string().contains("stats.XYZ.dp"));
    }
}
