use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::ClientError;

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "FNE_TOKEN";

/// An authenticated session.
///
/// Created from the bearer token obtained at login and handed to
/// [`FneClient::new`](super::FneClient::new). Clones share validity: once
/// invalidated (logout, or a 401 from the service) every holder sees it and
/// no further request is sent until a new session is created.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    token: String,
    valid: AtomicBool,
}

impl Session {
    /// A session for `token`. A blank token yields an already-invalid session.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let valid = !token.trim().is_empty();
        Self {
            inner: Arc::new(SessionInner {
                token,
                valid: AtomicBool::new(valid),
            }),
        }
    }

    /// Read the token from `FNE_TOKEN`.
    pub fn from_env() -> Result<Self, ClientError> {
        let token = std::env::var(TOKEN_ENV)
            .map_err(|_| ClientError::Config(format!("{TOKEN_ENV} is not set")))?;
        Ok(Self::new(token))
    }

    pub fn is_valid(&self) -> bool {
        self.inner.valid.load(Ordering::Acquire)
    }

    /// End the session. Irreversible; log in again for a new one.
    pub fn invalidate(&self) {
        self.inner.valid.store(false, Ordering::Release);
    }

    /// The bearer token, or an auth error if the session has ended.
    pub(crate) fn bearer(&self) -> Result<&str, ClientError> {
        if self.is_valid() {
            Ok(&self.inner.token)
        } else {
            Err(ClientError::Auth {
                status: 401,
                message: "session is no longer valid, re-authentication required".into(),
            })
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidation_is_shared_between_clones() {
        let session = Session::new("tok");
        let clone = session.clone();
        assert!(clone.bearer().is_ok());
        session.invalidate();
        assert!(!clone.is_valid());
        assert!(matches!(
            clone.bearer(),
            Err(ClientError::Auth { status: 401, .. })
        ));
    }

    #[test]
    fn blank_token_is_invalid() {
        assert!(!Session::new("  ").is_valid());
    }

    #[test]
    fn debug_redacts_token() {
        let out = format!("{:?}", Session::new("secret-token"));
        assert!(!out.contains("secret-token"));
    }
}
