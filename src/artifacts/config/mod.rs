//! Layered configuration
//!
//! Values resolve in three levels: built-in defaults, the user-global layer
//! (`$SOS_CONFIG`, falling back to `$HOME/.sos.json`) and the repository-local
//! layer stored inside the repository metadata file.
//!
//! - `patterns`: compiled glob lists and tracking patterns

pub mod patterns;

use crate::errors::{RepoError, RepoResult};
use anyhow::Context;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "SOS_CONFIG";
pub const GLOBAL_CONFIG_FILE: &str = ".sos.json";

const TRUTH_VALUES: [&str; 5] = ["true", "yes", "on", "1", "enable"];
const FALSE_VALUES: [&str; 5] = ["false", "no", "off", "0", "disable"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Track,
    Picky,
    Strict,
    Compress,
    DefaultBranch,
    TextType,
    BinType,
    IgnoreDirs,
    IgnoreDirsWhitelist,
    Ignores,
    IgnoresWhitelist,
}

pub static CONFIG_KEYS: phf::Map<&'static str, ConfigKey> = phf_map! {
    "track" => ConfigKey::Track,
    "picky" => ConfigKey::Picky,
    "strict" => ConfigKey::Strict,
    "compress" => ConfigKey::Compress,
    "defaultbranch" => ConfigKey::DefaultBranch,
    "texttype" => ConfigKey::TextType,
    "bintype" => ConfigKey::BinType,
    "ignoreDirs" => ConfigKey::IgnoreDirs,
    "ignoreDirsWhitelist" => ConfigKey::IgnoreDirsWhitelist,
    "ignores" => ConfigKey::Ignores,
    "ignoresWhitelist" => ConfigKey::IgnoresWhitelist,
};

impl ConfigKey {
    pub fn try_parse(key: &str) -> RepoResult<Self> {
        CONFIG_KEYS.get(key).copied().ok_or_else(|| {
            let mut known = CONFIG_KEYS.keys().copied().collect::<Vec<_>>();
            known.sort();
            RepoError::user(format!(
                "Unknown config key '{}'. Known keys: {}",
                key,
                known.join(", ")
            ))
        })
    }

    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            ConfigKey::Track | ConfigKey::Picky | ConfigKey::Strict | ConfigKey::Compress
        )
    }

    pub fn is_list(&self) -> bool {
        !self.is_flag() && *self != ConfigKey::DefaultBranch
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub track: bool,
    pub picky: bool,
    pub strict: bool,
    pub compress: bool,
    pub default_branch: String,
    pub text_type: Vec<String>,
    pub bin_type: Vec<String>,
    pub ignore_dirs: Vec<String>,
    pub ignore_dirs_whitelist: Vec<String>,
    pub ignores: Vec<String>,
    pub ignores_whitelist: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            track: false,
            picky: false,
            strict: false,
            compress: false,
            default_branch: "trunk".to_string(),
            text_type: to_strings(&["*.md", "*.coco", "*.py", "*.pyi", "*.pth"]),
            bin_type: Vec::new(),
            ignore_dirs: to_strings(&[".*", "__pycache__", ".mypy_cache"]),
            ignore_dirs_whitelist: Vec::new(),
            ignores: to_strings(&[
                "__coconut__.py",
                "*.bak",
                "*.py[cdo]",
                "*.class",
                ".fslckout",
                "_FOSSIL_",
                "*.sos.zip",
            ]),
            ignores_whitelist: Vec::new(),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// One level of configuration; unset fields fall through to the level below
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picky: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,
    #[serde(
        rename = "defaultbranch",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_branch: Option<String>,
    #[serde(rename = "texttype", default, skip_serializing_if = "Option::is_none")]
    pub text_type: Option<Vec<String>>,
    #[serde(rename = "bintype", default, skip_serializing_if = "Option::is_none")]
    pub bin_type: Option<Vec<String>>,
    #[serde(rename = "ignoreDirs", default, skip_serializing_if = "Option::is_none")]
    pub ignore_dirs: Option<Vec<String>>,
    #[serde(
        rename = "ignoreDirsWhitelist",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ignore_dirs_whitelist: Option<Vec<String>>,
    #[serde(rename = "ignores", default, skip_serializing_if = "Option::is_none")]
    pub ignores: Option<Vec<String>>,
    #[serde(
        rename = "ignoresWhitelist",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ignores_whitelist: Option<Vec<String>>,
}

impl Config {
    /// Apply the global and then the local layer on top of the defaults
    pub fn resolve(global: &ConfigLayer, local: &ConfigLayer) -> Self {
        let mut config = Config::default();
        config.apply(global);
        config.apply(local);
        config
    }

    fn apply(&mut self, layer: &ConfigLayer) {
        if let Some(track) = layer.track {
            self.track = track;
        }
        if let Some(picky) = layer.picky {
            self.picky = picky;
        }
        if let Some(strict) = layer.strict {
            self.strict = strict;
        }
        if let Some(compress) = layer.compress {
            self.compress = compress;
        }
        if let Some(default_branch) = &layer.default_branch {
            self.default_branch = default_branch.clone();
        }

        let lists = [
            (&mut self.text_type, &layer.text_type),
            (&mut self.bin_type, &layer.bin_type),
            (&mut self.ignore_dirs, &layer.ignore_dirs),
            (&mut self.ignore_dirs_whitelist, &layer.ignore_dirs_whitelist),
            (&mut self.ignores, &layer.ignores),
            (&mut self.ignores_whitelist, &layer.ignores_whitelist),
        ];
        for (target, value) in lists {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
    }

    pub fn describe(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::Track => self.track.to_string(),
            ConfigKey::Picky => self.picky.to_string(),
            ConfigKey::Strict => self.strict.to_string(),
            ConfigKey::Compress => self.compress.to_string(),
            ConfigKey::DefaultBranch => self.default_branch.clone(),
            ConfigKey::TextType => self.text_type.join(";"),
            ConfigKey::BinType => self.bin_type.join(";"),
            ConfigKey::IgnoreDirs => self.ignore_dirs.join(";"),
            ConfigKey::IgnoreDirsWhitelist => self.ignore_dirs_whitelist.join(";"),
            ConfigKey::Ignores => self.ignores.join(";"),
            ConfigKey::IgnoresWhitelist => self.ignores_whitelist.join(";"),
        }
    }
}

impl ConfigLayer {
    pub fn global_path() -> Option<PathBuf> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => std::env::var_os("HOME").map(|home| PathBuf::from(home).join(GLOBAL_CONFIG_FILE)),
        }
    }

    /// Load the user-global layer; a missing or unreadable file yields an empty layer
    pub fn load_global() -> Self {
        let Some(path) = Self::global_path() else {
            return ConfigLayer::default();
        };
        if !path.exists() {
            return ConfigLayer::default();
        }

        match std::fs::read_to_string(&path)
            .with_context(|| format!("Unable to read config file {}", path.display()))
            .and_then(|content| {
                serde_json::from_str::<ConfigLayer>(&content)
                    .with_context(|| format!("Malformed config file {}", path.display()))
            }) {
            Ok(layer) => layer,
            Err(error) => {
                tracing::warn!("{:#}; using defaults", error);
                ConfigLayer::default()
            }
        }
    }

    pub fn save_global(&self) -> anyhow::Result<PathBuf> {
        let path = Self::global_path()
            .context("Unable to locate the global config file: neither SOS_CONFIG nor HOME set")?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Unable to write config file {}", path.display()))?;

        Ok(path)
    }

    pub fn is_set(&self, key: ConfigKey) -> bool {
        match key {
            ConfigKey::Track => self.track.is_some(),
            ConfigKey::Picky => self.picky.is_some(),
            ConfigKey::Strict => self.strict.is_some(),
            ConfigKey::Compress => self.compress.is_some(),
            ConfigKey::DefaultBranch => self.default_branch.is_some(),
            list_key => self.list(list_key).is_some(),
        }
    }

    pub fn set(&mut self, key: ConfigKey, value: &str) -> RepoResult<()> {
        if key.is_flag() {
            let flag = parse_flag(value)?;
            *self.flag_mut(key) = Some(flag);
        } else if key == ConfigKey::DefaultBranch {
            self.default_branch = Some(value.trim().to_string());
        } else {
            *self.list_mut(key) = Some(
                value
                    .split(';')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }

        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) -> RepoResult<()> {
        if !self.is_set(key) {
            return Err(RepoError::user("Unknown key or value not set"));
        }

        if key.is_flag() {
            *self.flag_mut(key) = None;
        } else if key == ConfigKey::DefaultBranch {
            self.default_branch = None;
        } else {
            *self.list_mut(key) = None;
        }

        Ok(())
    }

    /// Append to a list key, seeding the list from `fallback` when it is not yet set
    pub fn add(&mut self, key: ConfigKey, value: &str, fallback: &[String]) -> RepoResult<()> {
        if !key.is_list() {
            return Err(RepoError::user("Key is not a list; use 'config set' instead"));
        }

        let list = self.list_mut(key).get_or_insert_with(|| fallback.to_vec());
        if list.iter().any(|entry| entry == value) {
            return Err(RepoError::user(format!("Value '{}' already contained", value)));
        }
        list.push(value.to_string());

        Ok(())
    }

    pub fn remove(&mut self, key: ConfigKey, value: &str, fallback: &[String]) -> RepoResult<()> {
        if !key.is_list() {
            return Err(RepoError::user("Key is not a list; use 'config unset' instead"));
        }

        let list = self.list_mut(key).get_or_insert_with(|| fallback.to_vec());
        let before = list.len();
        list.retain(|entry| entry != value);
        if list.len() == before {
            return Err(RepoError::user(format!("Unknown value '{}'", value)));
        }

        Ok(())
    }

    fn list(&self, key: ConfigKey) -> &Option<Vec<String>> {
        match key {
            ConfigKey::TextType => &self.text_type,
            ConfigKey::BinType => &self.bin_type,
            ConfigKey::IgnoreDirs => &self.ignore_dirs,
            ConfigKey::IgnoreDirsWhitelist => &self.ignore_dirs_whitelist,
            ConfigKey::IgnoresWhitelist => &self.ignores_whitelist,
            _ => &self.ignores,
        }
    }

    fn list_mut(&mut self, key: ConfigKey) -> &mut Option<Vec<String>> {
        match key {
            ConfigKey::TextType => &mut self.text_type,
            ConfigKey::BinType => &mut self.bin_type,
            ConfigKey::IgnoreDirs => &mut self.ignore_dirs,
            ConfigKey::IgnoreDirsWhitelist => &mut self.ignore_dirs_whitelist,
            ConfigKey::IgnoresWhitelist => &mut self.ignores_whitelist,
            _ => &mut self.ignores,
        }
    }

    fn flag_mut(&mut self, key: ConfigKey) -> &mut Option<bool> {
        match key {
            ConfigKey::Track => &mut self.track,
            ConfigKey::Picky => &mut self.picky,
            ConfigKey::Strict => &mut self.strict,
            _ => &mut self.compress,
        }
    }
}

pub fn parse_flag(value: &str) -> RepoResult<bool> {
    let value = value.trim().to_lowercase();
    if TRUTH_VALUES.contains(&value.as_str()) {
        Ok(true)
    } else if FALSE_VALUES.contains(&value.as_str()) {
        Ok(false)
    } else {
        Err(RepoError::user(format!(
            "Not a boolean value: '{}'. Use one of {} or {}",
            value,
            TRUTH_VALUES.join("/"),
            FALSE_VALUES.join("/")
        )))
    }
}
