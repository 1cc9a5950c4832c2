/// Classification carried by every error in the system.
///
/// Callers (the retry loop, the HTTP layer) decide what to do by matching on
/// the kind, never on the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Command or value-object validation failed. Never retried.
    InvalidParameter,
    /// A business limit was reached. Treated as a validation failure.
    CapacityExceeded,
    /// The aggregate or view does not exist.
    NotFound,
    /// Another writer already stored this `(aggregate, version)`.
    OptimisticLock,
    /// Storage write or transaction failure.
    Repository,
    /// Storage read failure.
    Query,
    /// A stored event has a discriminator no decoder is registered for.
    UnknownEventType,
}

impl ErrorKind {
    /// Returns true for kinds that the caller caused and can fix.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidParameter | ErrorKind::CapacityExceeded | ErrorKind::NotFound
        )
    }

    /// Returns true only for version conflicts.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::OptimisticLock)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::CapacityExceeded => "capacity_exceeded",
            ErrorKind::NotFound => "not_found",
            ErrorKind::OptimisticLock => "optimistic_lock",
            ErrorKind::Repository => "repository_error",
            ErrorKind::Query => "query_error",
            ErrorKind::UnknownEventType => "unknown_event_type",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_optimistic_lock_is_retryable() {
        assert!(ErrorKind::OptimisticLock.is_retryable());
        assert!(!ErrorKind::Repository.is_retryable());
        assert!(!ErrorKind::InvalidParameter.is_retryable());
    }

    #[test]
    fn client_errors() {
        assert!(ErrorKind::CapacityExceeded.is_client_error());
        assert!(!ErrorKind::UnknownEventType.is_client_error());
    }
}
