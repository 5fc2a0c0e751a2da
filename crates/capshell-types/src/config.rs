//! Shell configuration.
//!
//! Loaded from TOML at startup. `config set` edits the in-memory copy only.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CapshellError, Result};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "CAPSHELL_CONFIG";

/// Default number of rows the content region scrolls at once.
pub const DEFAULT_SCROLL_BATCH: u16 = 10;

/// Default force-exit window after the first interrupt.
pub const DEFAULT_FORCE_EXIT_MS: u64 = 2000;

/// Runtime configuration for the shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Active theme name.
    pub theme: String,
    /// Prompt text shown before the input line.
    pub prompt: String,
    /// Show the welcome banner before the first prompt.
    pub welcome: bool,
    /// Rows scrolled when the content region fills up.
    pub scroll_batch: u16,
    /// Force-exit window in milliseconds.
    pub force_exit_ms: u64,
    /// Free-form settings, readable by modules.
    pub settings: BTreeMap<String, String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            prompt: "capshell> ".to_string(),
            welcome: true,
            scroll_batch: DEFAULT_SCROLL_BATCH,
            force_exit_ms: DEFAULT_FORCE_EXIT_MS,
            settings: BTreeMap::new(),
        }
    }
}

impl ShellConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(text)?;
        cfg.check()?;
        Ok(cfg)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CapshellError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Load from an explicit path, then `CAPSHELL_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    fn check(&self) -> Result<()> {
        if self.scroll_batch == 0 {
            return Err(CapshellError::Config(
                "scroll_batch must be at least 1".to_string(),
            ));
        }
        if self.force_exit_ms == 0 {
            return Err(CapshellError::Config(
                "force_exit_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set a key from its string form. Known keys are type-checked; any other
    /// key lands in `settings`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "theme" => self.theme = value.to_string(),
            "prompt" => self.prompt = value.to_string(),
            "welcome" => self.welcome = parse_bool(key, value)?,
            "scroll_batch" => {
                let n = parse_number::<u16>(key, value)?;
                if n == 0 {
                    return Err(CapshellError::Config(
                        "scroll_batch must be at least 1".to_string(),
                    ));
                }
                self.scroll_batch = n;
            },
            "force_exit_ms" => {
                let n = parse_number::<u64>(key, value)?;
                if n == 0 {
                    return Err(CapshellError::Config(
                        "force_exit_ms must be at least 1".to_string(),
                    ));
                }
                self.force_exit_ms = n;
            },
            _ if key.is_empty() => {
                return Err(CapshellError::Config("empty config key".to_string()));
            },
            _ => {
                self.settings.insert(key.to_string(), value.to_string());
            },
        }
        Ok(())
    }

    /// Look up a key in its string form.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "theme" => Some(self.theme.clone()),
            "prompt" => Some(self.prompt.clone()),
            "welcome" => Some(self.welcome.to_string()),
            "scroll_batch" => Some(self.scroll_batch.to_string()),
            "force_exit_ms" => Some(self.force_exit_ms.to_string()),
            _ => self.settings.get(key).cloned(),
        }
    }

    /// All keys and values, built-in keys first, then settings by name.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("theme".to_string(), self.theme.clone()),
            ("prompt".to_string(), self.prompt.clone()),
            ("welcome".to_string(), self.welcome.to_string()),
            ("scroll_batch".to_string(), self.scroll_batch.to_string()),
            ("force_exit_ms".to_string(), self.force_exit_ms.to_string()),
        ];
        out.extend(self.settings.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(CapshellError::Config(format!(
            "{key} expects true or false, got '{value}'"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CapshellError::Config(format!("{key} expects a number, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = ShellConfig::default();
        assert_eq!(cfg.theme, "default");
        assert_eq!(cfg.scroll_batch, 10);
        assert_eq!(cfg.force_exit_ms, 2000);
        assert!(cfg.welcome);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = ShellConfig::from_toml_str("theme = \"ocean\"\n").unwrap();
        assert_eq!(cfg.theme, "ocean");
        assert_eq!(cfg.prompt, "capshell> ");
    }

    #[test]
    fn settings_table() {
        let cfg = ShellConfig::from_toml_str("[settings]\nregion = \"eu\"\n").unwrap();
        assert_eq!(cfg.get("region").as_deref(), Some("eu"));
    }

    #[test]
    fn zero_batch_rejected() {
        let err = ShellConfig::from_toml_str("scroll_batch = 0").unwrap_err();
        assert!(matches!(err, CapshellError::Config(_)));
    }

    #[test]
    fn bad_toml_rejected() {
        let err = ShellConfig::from_toml_str("theme = ").unwrap_err();
        assert!(matches!(err, CapshellError::TomlParse(_)));
    }

    #[test]
    fn set_known_keys() {
        let mut cfg = ShellConfig::default();
        cfg.set("welcome", "off").unwrap();
        cfg.set("scroll_batch", "4").unwrap();
        assert!(!cfg.welcome);
        assert_eq!(cfg.scroll_batch, 4);
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut cfg = ShellConfig::default();
        assert!(cfg.set("welcome", "maybe").is_err());
        assert!(cfg.set("scroll_batch", "many").is_err());
        assert!(cfg.set("scroll_batch", "0").is_err());
        assert!(cfg.set("", "x").is_err());
        assert_eq!(cfg, ShellConfig::default());
    }

    #[test]
    fn set_unknown_key_goes_to_settings() {
        let mut cfg = ShellConfig::default();
        cfg.set("api.region", "us").unwrap();
        assert_eq!(cfg.settings.get("api.region").map(String::as_str), Some("us"));
        assert_eq!(cfg.entries().last().unwrap().0, "api.region");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prompt = \"$ \"\nforce_exit_ms = 500").unwrap();
        let cfg = ShellConfig::load(file.path()).unwrap();
        assert_eq!(cfg.prompt, "$ ");
        assert_eq!(cfg.force_exit_ms, 500);
    }

    #[test]
    fn load_missing_file() {
        let err = ShellConfig::load(Path::new("/nonexistent/capshell.toml")).unwrap_err();
        assert!(format!("{err}").contains("cannot read"));
    }

    #[test]
    fn resolve_explicit_path_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "theme = \"mono\"").unwrap();
        let cfg = ShellConfig::resolve(Some(file.path())).unwrap();
        assert_eq!(cfg.theme, "mono");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn scroll_batch_set_get_round_trip(n in 1u16..) {
                let mut cfg = ShellConfig::default();
                cfg.set("scroll_batch", &n.to_string()).unwrap();
                prop_assert_eq!(cfg.get("scroll_batch"), Some(n.to_string()));
                prop_assert!(cfg.check().is_ok());
            }

            #[test]
            fn unknown_keys_round_trip(key in "x_[a-z]{1,10}", value in "[ -~]{0,20}") {
                let mut cfg = ShellConfig::default();
                cfg.set(&key, &value).unwrap();
                prop_assert_eq!(cfg.get(&key), Some(value));
            }
        }
    }
}
