//! CLI configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use drillrun_core::config::EngineConfig;

/// Top-level drillrun configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillrunConfig {
    /// Engine timing and scoring.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Ring the terminal bell on each resolution.
    #[serde(default = "default_sound")]
    pub sound: bool,
    /// Where finished reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Fixed shuffle seed. Random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_sound() -> bool {
    true
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./drillrun-results")
}

impl Default for DrillrunConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            sound: default_sound(),
            output_dir: default_output_dir(),
            seed: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied through as-is and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    resolve_with(s, |name| std::env::var(name).ok())
}

fn resolve_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&lookup(&rest[start + 2..start + end]).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. the explicit path (must exist)
/// 2. `drillrun.toml` in the current directory
/// 3. `~/.config/drillrun/config.toml`
///
/// Environment variable overrides: `DRILLRUN_SEED`, `DRILLRUN_SOUND`.
pub fn load_config_from(path: Option<&Path>) -> Result<DrillrunConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("drillrun.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<DrillrunConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => DrillrunConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));
    config
        .engine
        .validate()
        .context("invalid [engine] configuration")?;

    Ok(config)
}

fn apply_env_overrides(
    config: &mut DrillrunConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(seed) = lookup("DRILLRUN_SEED") {
        let seed = seed
            .trim()
            .parse()
            .with_context(|| format!("DRILLRUN_SEED is not a number: '{seed}'"))?;
        config.seed = Some(seed);
    }

    if let Some(sound) = lookup("DRILLRUN_SOUND") {
        config.sound = match sound.trim().to_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => true,
            "0" | "false" | "off" | "no" => false,
            other => anyhow::bail!("DRILLRUN_SOUND must be on or off, got '{other}'"),
        };
    }

    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("drillrun"))
}
