//! Snapshot of the environment variables the update subsystem cares about.
//!
//! The surrounding CLI takes this snapshot once at startup with
//! [`EnvOverrides::from_env`] and hands it over inside
//! [`Options`](super::Options). Nothing below the snapshot reads the process
//! environment, so every skip and detection decision is a function of its
//! inputs.

use std::path::PathBuf;

use crate::constants::{
    CONFIG_PATH_ENV_VAR, HOMEBREW_PREFIX_ENV_VAR, NO_UPDATE_ENV_VAR, SKIP_UPDATE_ENV_VAR,
};

/// Environment-derived overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// Raw value of `UPDRAFT_NO_UPDATE`.
    pub no_update: Option<String>,
    /// Raw value of `UPDRAFT_SKIP_UPDATE` (set on restarted children).
    pub skip_update: Option<String>,
    /// Raw value of `HOMEBREW_PREFIX`.
    pub homebrew_prefix: Option<String>,
    /// Explicit configuration file from `UPDRAFT_CONFIG_PATH`.
    pub config_path: Option<PathBuf>,
}

impl EnvOverrides {
    /// Read the overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the overrides from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config_path = lookup(CONFIG_PATH_ENV_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Self {
            no_update: lookup(NO_UPDATE_ENV_VAR),
            skip_update: lookup(SKIP_UPDATE_ENV_VAR),
            homebrew_prefix: lookup(HOMEBREW_PREFIX_ENV_VAR),
            config_path,
        }
    }

    /// Whether either skip variable asks for update checks to be disabled.
    #[must_use]
    pub fn update_disabled(&self) -> bool {
        env_truthy(self.no_update.as_deref()) || env_truthy(self.skip_update.as_deref())
    }
}

/// Interpret an environment value as a boolean switch.
///
/// Unset or blank is `false`. Recognised boolean spellings parse normally.
/// Anything else is `true`, so a typo errs toward skipping updates.
#[must_use]
pub fn env_truthy(value: Option<&str>) -> bool {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return false;
    };
    parse_bool(value).unwrap_or(true)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_truthy() {
        assert!(!env_truthy(None));
        assert!(!env_truthy(Some("")));
        assert!(!env_truthy(Some("   ")));
        assert!(!env_truthy(Some("0")));
        assert!(!env_truthy(Some("false")));
        assert!(!env_truthy(Some(" FALSE ")));
        assert!(env_truthy(Some("1")));
        assert!(env_truthy(Some("true")));
        assert!(env_truthy(Some("T")));
    }

    #[test]
    fn test_unparseable_value_is_truthy() {
        assert!(env_truthy(Some("yes")));
        assert!(env_truthy(Some("please")));
        assert!(env_truthy(Some("off")));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("UPDRAFT_NO_UPDATE", "0"),
            ("UPDRAFT_SKIP_UPDATE", "1"),
            ("HOMEBREW_PREFIX", "/opt/homebrew"),
            ("UPDRAFT_CONFIG_PATH", "  "),
        ]
        .into_iter()
        .collect();

        let env = EnvOverrides::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(env.no_update.as_deref(), Some("0"));
        assert_eq!(env.homebrew_prefix.as_deref(), Some("/opt/homebrew"));
        assert!(env.config_path.is_none());
        assert!(env.update_disabled());
    }

    #[test]
    fn test_update_disabled_defaults_to_false() {
        assert!(!EnvOverrides::default().update_disabled());

        let env = EnvOverrides {
            no_update: Some("false".to_string()),
            ..EnvOverrides::default()
        };
        assert!(!env.update_disabled());
    }
}
