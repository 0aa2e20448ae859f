//! Error types for the global root-finding library.

use std::fmt;

/// Main error type for GRPF operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrpfError {
    /// Initial domain is empty, degenerate, or outside the mappable range
    InvalidDomain(String),
    /// Solver parameters are out of their documented ranges
    InvalidParameters(String),
    /// The underlying triangulator reported a failure
    Triangulator(String),
}

impl fmt::Display for GrpfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain(msg) => write!(f, "Invalid domain: {msg}"),
            Self::InvalidParameters(msg) => write!(f, "Invalid parameters: {msg}"),
            Self::Triangulator(msg) => write!(f, "Triangulator failure: {msg}"),
        }
    }
}

impl std::error::Error for GrpfError {}

/// Result type for GRPF operations.
pub type GrpfResult<T> = Result<T, GrpfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = GrpfError::InvalidDomain("empty origcoords".to_string());
        assert_eq!(e.to_string(), "Invalid domain: empty origcoords");

        let e = GrpfError::InvalidParameters("tolerance must be positive".to_string());
        assert_eq!(
            e.to_string(),
            "Invalid parameters: tolerance must be positive"
        );

        let e = GrpfError::Triangulator("insertion rejected".to_string());
        assert_eq!(e.to_string(), "Triangulator failure: insertion rejected");
    }

    #[test]
    fn error_trait_object() {
        let e: Box<dyn std::error::Error> = Box::new(GrpfError::Triangulator("x".to_string()));
        assert!(e.to_string().contains("Triangulator"));
    }
}
