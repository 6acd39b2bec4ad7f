//! Backend API configuration: base URL, timeout, and the naming/path
//! conventions that differ between backend deployments.

use crate::config::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_UPDATE_PATH: &str = "/api/user/{id}";
pub const DEFAULT_REGISTER_PATH: &str = "/api/auth/register";

/// JSON key the backend expects for the login credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialField {
    #[default]
    UserName,
    Email,
}

impl CredentialField {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::UserName => "user_name",
            Self::Email => "email",
        }
    }
}

/// Field-naming and path conventions of the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConventions {
    pub credential_field: CredentialField,
    /// Profile update path; `{id}` is replaced by the user id.
    pub update_path: String,
    pub register_path: String,
}

impl Default for ApiConventions {
    fn default() -> Self {
        Self {
            credential_field: CredentialField::UserName,
            update_path: DEFAULT_UPDATE_PATH.to_owned(),
            register_path: DEFAULT_REGISTER_PATH.to_owned(),
        }
    }
}

impl ApiConventions {
    #[must_use]
    pub fn update_path_for(&self, id: i64) -> String {
        self.update_path.replace("{id}", &id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Whole-request timeout. `None` means calls wait indefinitely.
    pub timeout_secs: Option<u64>,
    pub conventions: ApiConventions,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout_secs: None,
            conventions: ApiConventions::default(),
        }
    }

    #[must_use]
    pub fn with_conventions(mut self, conventions: ApiConventions) -> Self {
        self.conventions = conventions;
        self
    }

    /// Build backend config from a key lookup.
    ///
    /// Optional:
    /// - `API_BASE_URL`: default `http://localhost:8000`
    /// - `API_TIMEOUT_SECS`: unset means no timeout
    /// - `API_CREDENTIAL_FIELD`: `user_name` (default) or `email`
    /// - `API_UPDATE_PATH`: default `/api/user/{id}`; must start with `/` and
    ///   contain `{id}`
    /// - `API_REGISTER_PATH`: default `/api/auth/register`; must start with `/`
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout, credential field or a path is invalid.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());

        let timeout_secs = match lookup("API_TIMEOUT_SECS") {
            None => None,
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::Invalid { key: "API_TIMEOUT_SECS", value: raw })?,
            ),
        };

        let credential_field = match lookup("API_CREDENTIAL_FIELD") {
            None => CredentialField::default(),
            Some(raw) => match raw.trim() {
                "user_name" | "username" => CredentialField::UserName,
                "email" => CredentialField::Email,
                _ => return Err(ConfigError::Invalid { key: "API_CREDENTIAL_FIELD", value: raw }),
            },
        };

        let update_path = match lookup("API_UPDATE_PATH") {
            None => DEFAULT_UPDATE_PATH.to_owned(),
            Some(raw) if raw.starts_with('/') && raw.contains("{id}") => raw,
            Some(raw) => return Err(ConfigError::Invalid { key: "API_UPDATE_PATH", value: raw }),
        };
        let register_path = match lookup("API_REGISTER_PATH") {
            None => DEFAULT_REGISTER_PATH.to_owned(),
            Some(raw) if raw.starts_with('/') => raw,
            Some(raw) => return Err(ConfigError::Invalid { key: "API_REGISTER_PATH", value: raw }),
        };

        let conventions = ApiConventions { credential_field, update_path, register_path };

        Ok(Self { timeout_secs, ..Self::new(&base_url).with_conventions(conventions) })
    }
}
