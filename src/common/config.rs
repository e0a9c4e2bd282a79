use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::layout_engine::SpaceMode;

pub fn config_file() -> PathBuf {
    dirs::home_dir()
        .expect("home directory is not set")
        .join(".config")
        .join("cleave")
        .join("config.toml")
}

/// What focus shifting does when it runs off the end of a space.
#[derive(Default, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CycleMode {
    /// Stop at the boundary.
    None,
    /// Wrap to the opposite end of the same space.
    #[default]
    Screen,
    /// Continue onto the adjacent display.
    All,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    #[serde(default = "default_mode")]
    pub default_mode: SpaceMode,
    /// Initial ratio for new splits. Must stay strictly inside (0, 1).
    #[serde(default = "default_split_ratio")]
    pub split_ratio: f64,
    #[serde(default)]
    pub cycle_focus: CycleMode,
    #[serde(default = "yes")]
    pub mouse_follows_focus: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            split_ratio: default_split_ratio(),
            cycle_focus: CycleMode::default(),
            mouse_follows_focus: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(deny_unknown_fields)]
pub struct OuterGaps {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub right: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(deny_unknown_fields)]
pub struct InnerGaps {
    #[serde(default)]
    pub horizontal: f64,
    #[serde(default)]
    pub vertical: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    #[serde(default)]
    pub outer: OuterGaps,
    #[serde(default)]
    pub inner: InnerGaps,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: LayoutSettings,
    #[serde(default)]
    pub gaps: GapSettings,
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config at {}", path.display()))?;
        Config::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let ratio = self.settings.split_ratio;
        if !(ratio > 0.0 && ratio < 1.0) {
            bail!("split_ratio must be strictly between 0 and 1, got {ratio}");
        }
        Ok(())
    }
}

fn yes() -> bool {
    true
}

fn default_mode() -> SpaceMode {
    SpaceMode::Bsp
}

fn default_split_ratio() -> f64 {
    0.5
}
