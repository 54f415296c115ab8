use serde::{Deserialize, Serialize};

use super::ModelError;

const MAX_SCOPE_LEN: usize = 128;

/// Scope used when no account is signed in (local-only wallet).
pub const LOCAL_SCOPE: &str = "local";

/// Persistence namespace for one user's document collection.
///
/// Doubles as a directory name under `profiles/`, so only a conservative
/// character set is accepted: ASCII alphanumerics, `-`, `_`, `.` and `@`
/// (email-style account ids), never starting with `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserScope(String);

impl UserScope {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let reject = |reason| ModelError::InvalidScope {
            value: value.clone(),
            reason,
        };

        if value.is_empty() {
            return Err(reject("must not be empty"));
        }
        if value.len() > MAX_SCOPE_LEN {
            return Err(reject("longer than 128 characters"));
        }
        if value.starts_with('.') {
            return Err(reject("must not start with '.'"));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
        {
            return Err(reject("contains characters outside [A-Za-z0-9-_.@]"));
        }

        Ok(Self(value))
    }

    /// The anonymous, device-local scope.
    pub fn local() -> Self {
        Self(LOCAL_SCOPE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserScope {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserScope> for String {
    fn from(scope: UserScope) -> Self {
        scope.0
    }
}
