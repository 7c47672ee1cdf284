use std::path::PathBuf;

use anyhow::{Context, Result, bail};

const DEFAULT_DB_PATH: &str = "shardkeep.db";
const DEFAULT_SCAN_FPS: u32 = 5;
const MAX_SCAN_FPS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    /// Scan polls per second.
    pub scan_fps: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("SHARDKEEP_DB_PATH")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.into())
            .into();

        let scan_fps = match lookup("SHARDKEEP_SCAN_FPS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("SHARDKEEP_SCAN_FPS is not a number: {:?}", raw))?,
            None => DEFAULT_SCAN_FPS,
        };
        if !(1..=MAX_SCAN_FPS).contains(&scan_fps) {
            bail!("SHARDKEEP_SCAN_FPS must be between 1 and {}, got {}", MAX_SCAN_FPS, scan_fps);
        }

        Ok(Self { db_path, scan_fps })
    }
}
