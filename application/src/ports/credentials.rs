//! Credential source port
//!
//! The gateway adapter asks a [`CredentialSource`] for the API key every time
//! it creates a session, so a key exported after startup is picked up by the
//! next session.

/// Where the API key comes from
pub trait CredentialSource: Send + Sync {
    /// The key, or `None` when no credential is configured
    fn api_key(&self) -> Option<String>;

    /// Human-readable description of where the key is looked up, used in
    /// error messages (never contains the key itself)
    fn describe(&self) -> String;
}

/// A fixed credential, mostly useful in tests and embedding
pub struct StaticCredential {
    key: Option<String>,
}

impl StaticCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    /// A source that never yields a key
    pub fn missing() -> Self {
        Self { key: None }
    }
}

impl CredentialSource for StaticCredential {
    fn api_key(&self) -> Option<String> {
        self.key.clone()
    }

    fn describe(&self) -> String {
        "static credential".to_string()
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_credential() {
        assert_eq!(StaticCredential::new("k").api_key().as_deref(), Some("k"));
        assert!(StaticCredential::missing().api_key().is_none());
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", StaticCredential::new("secret-key"));
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("redacted"));
    }
}
