use std::fmt;

/// Access key, secret key and an optional session token.
///
/// Passed by reference into every signing call and never stored by this crate.
/// `Debug` redacts the secret and the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    #[inline]
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: None,
        }
    }

    #[inline]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_never_shows_secrets() {
        let creds = Credentials::new("AKIDEXAMPLE", "super-secret").with_session_token("tok-123");
        let out = format!("{:?}", creds);
        assert!(out.contains("AKIDEXAMPLE"));
        assert!(!out.contains("super-secret"));
        assert!(!out.contains("tok-123"));
    }
}
