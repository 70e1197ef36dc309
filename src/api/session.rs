use std::fmt;

use crate::error::AppError;

/// Explicit session context handed to every API call.
///
/// Holds the bearer token issued by the backend at login. The token is never
/// printed, not even in `Debug` output.
#[derive(Clone)]
pub struct Session {
    token: String,
}

impl Session {
    /// Wrap a token, rejecting anything that is not a three-part JWT.
    pub fn new(token: impl Into<String>) -> Result<Self, AppError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(AppError::Validation(
                "no session token; set MOVILIZACIONES_TOKEN or pass --token".into(),
            ));
        }
        if token.split('.').count() != 3 || token.split('.').any(str::is_empty) {
            return Err(AppError::Validation("session token is not a valid JWT".into()));
        }
        Ok(Self { token })
    }

    pub(crate) fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}
