//! Secure credential handling for judge providers.
//!
//! Centralized, type-safe API key handling:
//!
//! - **No accidental logging**: credentials never appear in Debug output
//! - **Memory safety**: credentials are zeroed on drop via `secrecy`
//! - **Explicit exposure**: the raw value is only reachable through
//!   [`ApiCredential::expose`], called at the point of use

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
///
/// Useful for debugging configuration issues without exposing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a raw value. After this point it cannot be accidentally
    /// logged.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load a credential from an environment variable.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ProviderError> {
        std::env::var(env_var)
            .map(|v| Self::new(v, CredentialSource::Environment, name))
            .map_err(|_| {
                ProviderError::NotConfigured(format!(
                    "{} not set: configure '{}' environment variable",
                    name, env_var
                ))
            })
    }

    /// Expose the credential for use in an API call.
    ///
    /// Only call this at the point where the value is actually needed,
    /// such as setting an HTTP header. Never store the exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_value() {
        let cred = ApiCredential::new("sk-very-secret", CredentialSource::Programmatic, "test key");
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn expose_returns_raw_value() {
        let cred = ApiCredential::new("sk-very-secret", CredentialSource::Programmatic, "test key");
        assert_eq!(cred.expose(), "sk-very-secret");
        assert!(!cred.is_empty());
    }

    #[test]
    fn missing_env_var_is_not_configured() {
        let result = ApiCredential::from_env("KREDO_TEST_MISSING_KEY_VAR", "test key");
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[test]
    fn source_is_tracked() {
        let cred = ApiCredential::new("k", CredentialSource::Programmatic, "test key");
        assert_eq!(cred.source(), CredentialSource::Programmatic);
        assert_eq!(cred.source().to_string(), "programmatic");
    }
}
