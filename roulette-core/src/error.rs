//! Error types for reviewer roulette

use thiserror::Error;

/// Result type alias for roulette operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for roulette operations
///
/// Every variant except the internal ones is a business-rule rejection: it is
/// deterministic, surfaced to the caller verbatim and never retried.
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced pull request, user or team does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A pull request with this id already exists
    #[error("Pull request {0} already exists")]
    PrExists(String),

    /// A team with this name already exists
    #[error("Team {0} already exists")]
    TeamExists(String),

    /// The pull request is merged and can no longer change reviewers
    #[error("Pull request {0} is already merged")]
    PrMerged(String),

    /// The user is not one of the pull request's reviewers
    #[error("User {user} is not assigned as reviewer of pull request {pr}")]
    NotAssigned {
        /// Pull request id
        pr: String,
        /// User id that was expected in the reviewer set
        user: String,
    },

    /// No active team member is eligible as a replacement reviewer
    #[error("No active replacement candidate for pull request {0}")]
    NoCandidate(String),

    /// Storage or transaction failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidState,
    PreconditionFailed,
    ResourceExhausted,
    Internal,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::PrExists(_) | Error::TeamExists(_) => ErrorKind::AlreadyExists,
            Error::PrMerged(_) => ErrorKind::InvalidState,
            Error::NotAssigned { .. } => ErrorKind::PreconditionFailed,
            Error::NoCandidate(_) => ErrorKind::ResourceExhausted,
            Error::Storage(_) | Error::Config(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "NOT_FOUND",
            Error::PrExists(_) => "PR_EXISTS",
            Error::TeamExists(_) => "TEAM_EXISTS",
            Error::PrMerged(_) => "PR_MERGED",
            Error::NotAssigned { .. } => "NOT_ASSIGNED",
            Error::NoCandidate(_) => "NO_CANDIDATE",
            Error::Storage(_) | Error::Config(_) | Error::Io(_) => "INTERNAL",
        }
    }

    /// Whether the caller may safely retry the operation
    ///
    /// Only internal failures qualify. Every store write is all-or-nothing, so
    /// a failed attempt leaves no partial state behind.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// Check if this is a business-rule rejection
    pub fn is_rejection(&self) -> bool {
        !self.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_codes() {
        let cases = [
            (Error::NotFound("pr-1".into()), ErrorKind::NotFound, "NOT_FOUND"),
            (Error::PrExists("pr-1".into()), ErrorKind::AlreadyExists, "PR_EXISTS"),
            (Error::TeamExists("backend".into()), ErrorKind::AlreadyExists, "TEAM_EXISTS"),
            (Error::PrMerged("pr-1".into()), ErrorKind::InvalidState, "PR_MERGED"),
            (
                Error::NotAssigned {
                    pr: "pr-1".into(),
                    user: "u9".into(),
                },
                ErrorKind::PreconditionFailed,
                "NOT_ASSIGNED",
            ),
            (Error::NoCandidate("pr-1".into()), ErrorKind::ResourceExhausted, "NO_CANDIDATE"),
            (Error::Storage("disk full".into()), ErrorKind::Internal, "INTERNAL"),
        ];

        for (err, kind, code) in cases {
            assert_eq!(err.kind(), kind, "{err}");
            assert_eq!(err.code(), code, "{err}");
        }
    }

    #[test]
    fn test_only_internal_is_retryable() {
        assert!(Error::Storage("locked".into()).is_retryable());
        assert!(!Error::PrMerged("pr-1".into()).is_retryable());
        assert!(Error::NoCandidate("pr-1".into()).is_rejection());
    }

    #[test]
    fn test_not_assigned_message() {
        let err = Error::NotAssigned {
            pr: "pr-3".into(),
            user: "u7".into(),
        };
        assert_eq!(
            err.to_string(),
            "User u7 is not assigned as reviewer of pull request pr-3"
        );
    }
}
