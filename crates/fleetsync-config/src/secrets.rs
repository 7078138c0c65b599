//! Runtime secret resolution.
//!
//! # Contract
//! - Config YAML stores only **env var NAMES** (e.g. `"DIVERA_ACCESSKEY"`).
//! - At startup the CLI calls [`resolve_secrets`] once and passes the result
//!   into the platform client constructors.
//! - `Debug` redacts values; errors name the env var, never its value.
//!
//! # Enforcement
//! | secret                 | required |
//! |------------------------|----------|
//! | Divera access key      | yes      |
//! | Stein API key          | yes      |
//! | Stein username/password| both or neither |

use anyhow::{bail, Result};
use serde_json::Value;

pub const DEFAULT_DIVERA_ACCESSKEY_VAR: &str = "FLEETSYNC_DIVERA_ACCESSKEY";
pub const DEFAULT_STEIN_API_KEY_VAR: &str = "FLEETSYNC_STEIN_API_KEY";
pub const DEFAULT_STEIN_USERNAME_VAR: &str = "FLEETSYNC_STEIN_USERNAME";
pub const DEFAULT_STEIN_PASSWORD_VAR: &str = "FLEETSYNC_STEIN_PASSWORD";

/// Stein login credentials.
#[derive(Clone)]
pub struct SteinLogin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SteinLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SteinLogin")
            .field("username", &"<REDACTED>")
            .field("password", &"<REDACTED>")
            .finish()
    }
}

/// All secrets for one sync run. **Values are redacted in `Debug` output.**
#[derive(Clone)]
pub struct ResolvedSecrets {
    pub divera_accesskey: String,
    pub stein_api_key: String,
    /// `None` when no login is configured; the client then relies on the API key.
    pub stein_login: Option<SteinLogin>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field("divera_accesskey", &"<REDACTED>")
            .field("stein_api_key", &"<REDACTED>")
            .field("stein_login", &self.stein_login)
            .finish()
    }
}

/// Env var names extracted from the config JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEnvNames {
    pub divera_accesskey_var: String,
    pub stein_api_key_var: String,
    pub stein_username_var: String,
    pub stein_password_var: String,
}

/// Non-empty trimmed string at `pointer`, or `None`.
fn read_str_at(config: &Value, pointer: &str) -> Option<String> {
    let s = config.pointer(pointer)?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parse env var names from config, falling back to the `FLEETSYNC_*` defaults.
pub fn parse_env_names(config_json: &Value) -> SecretEnvNames {
    SecretEnvNames {
        divera_accesskey_var: read_str_at(config_json, "/divera/keys_env/accesskey")
            .unwrap_or_else(|| DEFAULT_DIVERA_ACCESSKEY_VAR.to_string()),
        stein_api_key_var: read_str_at(config_json, "/stein/keys_env/api_key")
            .unwrap_or_else(|| DEFAULT_STEIN_API_KEY_VAR.to_string()),
        stein_username_var: read_str_at(config_json, "/stein/keys_env/username")
            .unwrap_or_else(|| DEFAULT_STEIN_USERNAME_VAR.to_string()),
        stein_password_var: read_str_at(config_json, "/stein/keys_env/password")
            .unwrap_or_else(|| DEFAULT_STEIN_PASSWORD_VAR.to_string()),
    }
}

/// Resolve secrets from the process environment.
pub fn resolve_secrets(config_json: &Value) -> Result<ResolvedSecrets> {
    resolve_secrets_with(config_json, |name| std::env::var(name).ok())
}

/// Resolve secrets through `lookup` (env var name → value). Blank values count
/// as unset.
pub fn resolve_secrets_with<F>(config_json: &Value, lookup: F) -> Result<ResolvedSecrets>
where
    F: Fn(&str) -> Option<String>,
{
    let names = parse_env_names(config_json);
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let Some(divera_accesskey) = get(&names.divera_accesskey_var) else {
        bail!(
            "SECRETS_MISSING: required env var '{}' (divera accesskey) is not set or empty",
            names.divera_accesskey_var
        );
    };
    let Some(stein_api_key) = get(&names.stein_api_key_var) else {
        bail!(
            "SECRETS_MISSING: required env var '{}' (stein api key) is not set or empty",
            names.stein_api_key_var
        );
    };

    let stein_login = match (get(&names.stein_username_var), get(&names.stein_password_var)) {
        (Some(username), Some(password)) => Some(SteinLogin { username, password }),
        (None, None) => None,
        (Some(_), None) => bail!(
            "SECRETS_INCOMPLETE: '{}' is set but '{}' (stein password) is not",
            names.stein_username_var,
            names.stein_password_var
        ),
        (None, Some(_)) => bail!(
            "SECRETS_INCOMPLETE: '{}' is set but '{}' (stein username) is not",
            names.stein_password_var,
            names.stein_username_var
        ),
    };

    Ok(ResolvedSecrets {
        divera_accesskey,
        stein_api_key,
        stein_login,
    })
}
