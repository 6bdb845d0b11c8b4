use std::fmt;

/// Error kind, mapped one-to-one onto an HTTP status by the server crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

/// Error returned by every store, renderer and handler operation.
#[derive(Debug)]
pub struct FrontpageError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FrontpageError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Validation, message: msg.into() }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Unauthorized, message: msg.into() }
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Forbidden, message: msg.into() }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::NotFound, message: msg.into() }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Conflict, message: msg.into() }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Internal, message: msg.into() }
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for FrontpageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FrontpageError {}

// ---------------------------------------------------------------------------
// From impls: I/O and (de)serialization failures are internal
// ---------------------------------------------------------------------------

impl From<std::io::Error> for FrontpageError {
    fn from(e: std::io::Error) -> Self {
        Self::internal(e.to_string())
    }
}

impl From<serde_json::Error> for FrontpageError {
    fn from(e: serde_json::Error) -> Self {
        Self::internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind() {
        let err = FrontpageError::not_found("subject 'Physics'").with_context("delete");
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.message, "delete: subject 'Physics'");
    }

    #[test]
    fn io_errors_are_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FrontpageError = io.into();
        assert!(err.is(ErrorKind::Internal));
    }
}
