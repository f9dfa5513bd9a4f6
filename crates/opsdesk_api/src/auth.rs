//! Bearer-token authentication.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingCredentials,
    #[error("authorization header is not a bearer token")]
    UnsupportedScheme,
    #[error("invalid bearer token")]
    InvalidToken,
}

/// Decides whether a request may reach the resource handlers.
pub trait Authenticator: Send + Sync {
    /// Validates the raw `Authorization` header value, if any.
    fn authenticate(&self, authorization: Option<&str>) -> Result<(), AuthError>;
}

/// Accepts `Bearer <token>` headers whose token is in a fixed set.
///
/// An authenticator with no tokens rejects every request.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: Vec<String>,
}

impl StaticTokenAuthenticator {
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|token: &String| !token.is_empty())
                .collect(),
        }
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, authorization: Option<&str>) -> Result<(), AuthError> {
        let header = authorization
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingCredentials)?;
        let presented = bearer_token(header).ok_or(AuthError::UnsupportedScheme)?;

        // Compare against every token so timing does not depend on which one matched.
        let matched = self.tokens.iter().fold(false, |found, expected| {
            constant_time_eq(expected.as_bytes(), presented.as_bytes()) | found
        });
        if matched {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::{constant_time_eq, AuthError, Authenticator, StaticTokenAuthenticator};

    fn authenticator() -> StaticTokenAuthenticator {
        StaticTokenAuthenticator::new(["alpha-token", "beta-token"])
    }

    #[test]
    fn accepts_any_configured_bearer_token() {
        let auth = authenticator();
        assert_eq!(auth.authenticate(Some("Bearer alpha-token")), Ok(()));
        assert_eq!(auth.authenticate(Some("bearer beta-token")), Ok(()));
        assert_eq!(auth.authenticate(Some("  Bearer   beta-token ")), Ok(()));
    }

    #[test]
    fn rejects_missing_or_blank_header() {
        let auth = authenticator();
        assert_eq!(auth.authenticate(None), Err(AuthError::MissingCredentials));
        assert_eq!(auth.authenticate(Some("   ")), Err(AuthError::MissingCredentials));
    }

    #[test]
    fn rejects_other_schemes() {
        let auth = authenticator();
        assert_eq!(
            auth.authenticate(Some("Basic YWxwaGE6dG9rZW4=")),
            Err(AuthError::UnsupportedScheme)
        );
        assert_eq!(
            auth.authenticate(Some("alpha-token")),
            Err(AuthError::UnsupportedScheme)
        );
    }

    #[test]
    fn rejects_unknown_tokens() {
        let auth = authenticator();
        assert_eq!(
            auth.authenticate(Some("Bearer alpha-token-2")),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            auth.authenticate(Some("Bearer ALPHA-TOKEN")),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn empty_token_set_rejects_everything() {
        let auth = StaticTokenAuthenticator::new(["", ""]);
        assert_eq!(auth.token_count(), 0);
        assert_eq!(
            auth.authenticate(Some("Bearer anything")),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn constant_time_eq_handles_length_mismatch() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
