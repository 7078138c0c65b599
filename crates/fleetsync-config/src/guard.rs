//! Refuse configs that carry secret values instead of env var names.
//!
//! Two rules, checked on every string leaf:
//! - anything under a `keys_env` object must look like an env var name
//!   (`[A-Za-z_][A-Za-z0-9_]*`)
//! - no leaf may start with a well-known token prefix

use anyhow::{bail, Result};
use serde_json::Value;

use crate::leaves::leaves;

/// Token prefixes that are never legitimate config values.
const TOKEN_PREFIXES: &[&str] = &[
    "sk-",        // OpenAI style
    "sk_live",    // Stripe
    "AKIA",       // AWS access key id
    "-----BEGIN", // PEM
    "ghp_",       // GitHub PAT
    "glpat-",     // GitLab PAT
    "xoxb-",      // Slack bot
    "xoxp-",      // Slack user
];

pub(crate) fn reject_secret_literals(config: &Value) -> Result<()> {
    for (pointer, value) in leaves(config) {
        let Some(s) = value.as_str() else { continue };
        let s = s.trim();

        if has_token_prefix(s) {
            bail!("CONFIG_SECRET_DETECTED leaf={pointer} value=REDACTED");
        }
        if in_keys_env(&pointer) && !is_env_var_name(s) {
            bail!(
                "CONFIG_SECRET_DETECTED leaf={pointer} value=REDACTED \
                (keys_env entries must be env var names)"
            );
        }
    }
    Ok(())
}

fn has_token_prefix(s: &str) -> bool {
    s.len() >= 8 && TOKEN_PREFIXES.iter().any(|p| s.starts_with(p))
}

fn in_keys_env(pointer: &str) -> bool {
    pointer.split('/').any(|token| token == "keys_env")
}

fn is_env_var_name(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn env_var_names_pass() {
        let cfg = json!({"divera": {"keys_env": {"accesskey": "DIVERA_ACCESSKEY_OV_PB"}}});
        assert!(reject_secret_literals(&cfg).is_ok());
    }

    #[test]
    fn raw_key_under_keys_env_is_rejected() {
        // A Divera access key pasted in place of the variable name.
        let cfg = json!({"divera": {"keys_env": {"accesskey": "aB3x-9kQ2.zz"}}});
        let err = reject_secret_literals(&cfg).unwrap_err().to_string();
        assert!(err.contains("/divera/keys_env/accesskey"));
        assert!(!err.contains("aB3x"));
    }

    #[test]
    fn short_values_are_not_token_matches() {
        assert!(!has_token_prefix("sk-1"));
        assert!(has_token_prefix("sk-12345678"));
    }

    #[test]
    fn env_var_name_shape() {
        assert!(is_env_var_name("_X1"));
        assert!(!is_env_var_name("1X"));
        assert!(!is_env_var_name("X-Y"));
        assert!(!is_env_var_name(""));
    }
}
