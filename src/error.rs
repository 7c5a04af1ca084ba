use thiserror::Error;

/// Errors that terminate a summarization request.
///
/// Pipeline stages that only look at content (classifier, extractor, scorer,
/// sentinel, allocator) never produce these; they degrade instead. Only the
/// collaborators and response parsing do.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("repository not found: {0}")]
    NotFound(String),

    #[error("repository is private or access was denied: {0}")]
    PrivateRepository(String),

    #[error("rate limited by repository host: {0}")]
    RateLimited(String),

    #[error("model gateway error: {0}")]
    Gateway(String),

    #[error("repository fetch failed: {0}")]
    Fetch(String),
}

/// Fieldless view of [`Error`] for mapping at the outer boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    PrivateRepository,
    RateLimited,
    Gateway,
    Fetch,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::PrivateRepository(_) => ErrorKind::PrivateRepository,
            Error::RateLimited(_) => ErrorKind::RateLimited,
            Error::Gateway(_) => ErrorKind::Gateway,
            Error::Fetch(_) => ErrorKind::Fetch,
        }
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PrivateRepository => "private_repository",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Gateway => "gateway_error",
            ErrorKind::Fetch => "fetch_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            Error::InvalidInput("x".into()).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(Error::RateLimited("x".into()).kind(), ErrorKind::RateLimited);
        assert_eq!(Error::Gateway("x".into()).kind().as_str(), "gateway_error");
    }

    #[test]
    fn test_display_includes_detail() {
        let err = Error::NotFound("octo/missing".into());
        assert_eq!(err.to_string(), "repository not found: octo/missing");
    }
}
