//! Environment-backed credential source

use cnxh_application::ports::credentials::CredentialSource;

/// Variables consulted when none are configured
pub const DEFAULT_API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Reads the API key from the first set, non-empty environment variable of
/// an ordered list. The lookup happens on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    vars: Vec<String>,
}

impl EnvCredentialSource {
    pub fn new<I, S>(vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(Into::into).collect(),
        }
    }

    pub fn vars(&self) -> &[String] {
        &self.vars
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::new(DEFAULT_API_KEY_VARS.iter().copied())
    }
}

impl CredentialSource for EnvCredentialSource {
    fn api_key(&self) -> Option<String> {
        self.vars
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
    }

    fn describe(&self) -> String {
        if self.vars.is_empty() {
            "no environment variable".to_string()
        } else {
            self.vars.join(" or ")
        }
    }
}
