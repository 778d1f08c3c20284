use crate::session::SessionOptions;
use crate::snake::Board;
use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// Portfolio terminal with a built-in snake game.
#[derive(Parser, Debug)]
#[command(name = "portfolio-cli", version)]
pub(crate) struct Args {
    /// settings file (defaults to the per-user config dir)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// ms per snake move
    #[arg(long)]
    pub(crate) tick_ms: Option<u64>,

    /// rng seed for jokes, matrix and food placement
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// start with the terminal closed (Ctrl+K opens it)
    #[arg(long, default_value_t = false)]
    pub(crate) closed: bool,

    /// write tracing output to this file
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,

    /// save the effective settings and exit
    #[arg(long, default_value_t = false)]
    pub(crate) write_config: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) grid_width: i32,
    pub(crate) grid_height: i32,
    pub(crate) tick_ms: u64,
    pub(crate) fps_cap: u32,
    pub(crate) seed: Option<u64>,
    pub(crate) start_open: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: Board::DEFAULT.width,
            grid_height: Board::DEFAULT.height,
            tick_ms: 150,
            fps_cap: 30,
            seed: None,
            start_open: true,
        }
    }
}

impl Settings {
    /// Flags win over the file.
    pub(crate) fn apply_args(mut self, args: &Args) -> Self {
        if let Some(ms) = args.tick_ms {
            self.tick_ms = ms;
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if args.closed {
            self.start_open = false;
        }
        self.clamped()
    }

    pub(crate) fn clamped(mut self) -> Self {
        self.grid_width = self.grid_width.clamp(8, 60);
        self.grid_height = self.grid_height.clamp(6, 40);
        self.tick_ms = self.tick_ms.clamp(40, 1000);
        self.fps_cap = self.fps_cap.clamp(10, 240);
        self
    }

    pub(crate) fn session_options(&self, fallback_seed: u64) -> SessionOptions {
        SessionOptions {
            board: Board {
                width: self.grid_width,
                height: self.grid_height,
            },
            tick: Duration::from_millis(self.tick_ms),
            seed: self.seed.unwrap_or(fallback_seed),
        }
    }
}

pub(crate) fn default_settings_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "portfolio-cli", "PortfolioCli")
        .context("could not resolve project directories")?;
    Ok(proj.config_dir().join("settings.json"))
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    if let Ok(s) = fs::read_to_string(path) {
        match serde_json::from_str::<Settings>(&s) {
            Ok(v) => return v,
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings"),
        }
    }
    Settings::default()
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename-over-existing fails on Windows
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to).with_context(|| format!("renaming to {}", to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["portfolio-cli"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn flags_override_file_values() {
        let s = Settings::default().apply_args(&args(&["--tick-ms", "90", "--seed", "5", "--closed"]));
        assert_eq!(s.tick_ms, 90);
        assert_eq!(s.seed, Some(5));
        assert!(!s.start_open);
    }

    #[test]
    fn values_are_clamped() {
        let s = Settings {
            grid_width: 1000,
            grid_height: 1,
            tick_ms: 1,
            fps_cap: 9999,
            ..Settings::default()
        }
        .clamped();
        assert_eq!((s.grid_width, s.grid_height, s.tick_ms, s.fps_cap), (60, 6, 40, 240));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "tick_ms": 200 }"#).unwrap();
        assert_eq!(s.tick_ms, 200);
        assert_eq!(s.grid_width, Settings::default().grid_width);
    }

    #[test]
    fn missing_or_bad_file_falls_back() {
        let dir = std::env::temp_dir().join(format!("portfolio-cli-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let bad = dir.join("bad.json");
        fs::write(&bad, "not json").unwrap();
        assert_eq!(load_settings(&bad), Settings::default());
        assert_eq!(load_settings(&dir.join("missing.json")), Settings::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = std::env::temp_dir().join(format!("portfolio-cli-save-{}", std::process::id()));
        let path = dir.join("nested").join("settings.json");
        let s = Settings {
            tick_ms: 120,
            seed: Some(3),
            ..Settings::default()
        };
        save_settings_atomic(&path, &s).unwrap();
        save_settings_atomic(&path, &s).unwrap();
        assert_eq!(load_settings(&path), s);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn session_options_follow_settings() {
        let s = Settings::default();
        let opts = s.session_options(77);
        assert_eq!(opts.seed, 77);
        assert_eq!(opts.board, Board::DEFAULT);
        assert_eq!(opts.tick, Duration::from_millis(150));
    }
}
