use thiserror::Error;

/// Errors returned by a [`crate::GraphStore`] for a single query.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered but refused the query (validation, constraint
    /// violation, unknown query).
    #[error("{message} (status {status})")]
    Rejected { status: u16, message: String },

    /// The store could not be reached.
    #[error("store connection failed: {0}")]
    Connection(String),

    /// The query did not complete within the configured timeout.
    #[error("store query timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The store returned a body that is not valid JSON.
    #[error("store returned an undecodable response: {0}")]
    Decode(String),

    /// A query failure carrying only the store's own message.
    #[error("{0}")]
    Query(String),
}

impl StoreError {
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_displays_bare_message() {
        assert_eq!(StoreError::query("duplicate name").to_string(), "duplicate name");
    }

    #[test]
    fn rejected_error_includes_status() {
        let err = StoreError::Rejected {
            status: 409,
            message: "team exists".to_string(),
        };
        assert_eq!(err.to_string(), "team exists (status 409)");
    }
}
