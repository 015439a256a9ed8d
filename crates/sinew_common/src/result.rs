//! Common result and error types for the Sinew router.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a violated structural invariant (a malformed template, a
/// slot index outside the route, a commit of an unfinished route). Routing
/// failures such as "no candidate path" are not errors; they surface as empty
/// results and are reported through the diagnostic sink.
pub type SinewResult<T> = Result<T, InternalError>;

/// An internal router error indicating a bug in the caller, not a fabric problem.
#[derive(Debug, thiserror::Error)]
#[error("internal router error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("slot 7 out of range");
        assert_eq!(
            format!("{err}"),
            "internal router error: slot 7 out of range"
        );
    }

    #[test]
    fn err_path() {
        let r: SinewResult<u32> = Err(InternalError::new("bad splice"));
        let err = r.err().unwrap();
        assert_eq!(err.message, "bad splice");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
