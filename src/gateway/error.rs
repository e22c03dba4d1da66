//! Error taxonomy for gateway operations.

/// Failures reported by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email address has not been verified")]
    EmailNotConfirmed,

    #[error("email address is already registered")]
    EmailTaken,

    #[error("password is too weak: {0}")]
    WeakPassword(String),

    /// The verification token is expired, unknown or already used.
    #[error("verification token is invalid or has expired")]
    InvalidToken,

    #[error("session has expired")]
    SessionExpired,

    #[error("authentication failed: {0}")]
    Other(String),
}

/// Errors from the persistence gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// An operation that needs a principal was called without one.
    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The store refused the request for the current principal.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// The persisted table has not been created yet.
    #[error("table `{0}` does not exist")]
    SchemaMissing(String),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned an error status.
    #[error("backend error ({status}): {message}")]
    Backend {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A response or row did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Authentication-class failure: no principal, or the auth service said no.
    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::NotSignedIn | GatewayError::Auth(_))
    }

    /// Transport or backend-side failure that may succeed if issued again.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Request(_) => true,
            GatewayError::Backend { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(GatewayError::NotSignedIn.to_string(), "not signed in");
        assert_eq!(
            GatewayError::SchemaMissing("saved_palettes".into()).to_string(),
            "table `saved_palettes` does not exist"
        );
        assert_eq!(
            GatewayError::from(AuthError::EmailTaken).to_string(),
            "email address is already registered"
        );
    }

    #[test]
    fn classification() {
        assert!(GatewayError::NotSignedIn.is_auth());
        assert!(GatewayError::Auth(AuthError::InvalidToken).is_auth());
        assert!(!GatewayError::Forbidden("rls".into()).is_auth());

        let unavailable = GatewayError::Backend {
            status: 503,
            code: None,
            message: "unavailable".into(),
        };
        assert!(unavailable.is_transient());
        let bad_request = GatewayError::Backend {
            status: 400,
            code: Some("22P02".into()),
            message: "bad uuid".into(),
        };
        assert!(!bad_request.is_transient());
    }
}
