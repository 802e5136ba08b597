use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;

pub const DEFAULT_LYRICS_FILE: &str = "snowman_lyrics.lrc";

/// Fixed layout of one frame.
///
/// The same row budget drives both columns: the tree uses one star row,
/// `tree_height / 2` branch rows and three trunk rows, and the lyric panel
/// spends three of those rows on its borders and the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub tree_width: usize,
    pub tree_height: usize,
    pub gap: usize,
    pub panel_width: usize,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            tree_width: 40,
            tree_height: 20,
            gap: 12,
            panel_width: 60,
        }
    }
}

impl Geometry {
    pub const TRUNK_ROWS: usize = 3;

    pub fn branch_rows(&self) -> usize {
        self.tree_height / 2
    }

    pub fn total_rows(&self) -> usize {
        1 + self.branch_rows() + Self::TRUNK_ROWS
    }

    /// Rows left for scrolling lyrics after the top border, title and bottom border.
    pub fn lyric_rows(&self) -> usize {
        self.total_rows() - 3
    }

    pub fn trunk_width(&self) -> usize {
        (self.tree_height / 4).min(self.tree_width)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub geometry: Geometry,
    pub lyrics_path: PathBuf,
    pub tick: Duration,
    pub min_sleep: Duration,
    pub ornament_chance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geometry: Geometry::default(),
            lyrics_path: PathBuf::from(DEFAULT_LYRICS_FILE),
            tick: Duration::from_millis(100),
            min_sleep: Duration::from_millis(10),
            ornament_chance: 0.2,
        }
    }
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Self {
            geometry: Geometry {
                tree_width: cli.tree_width,
                tree_height: cli.tree_height,
                gap: cli.gap,
                panel_width: cli.panel_width,
            },
            lyrics_path: cli.lyrics.clone().unwrap_or_else(default_lyrics_path),
            tick: Duration::from_millis(cli.tick_ms),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let g = &self.geometry;
        if g.tree_width == 0 {
            bail!("tree width must be positive");
        }
        if g.tree_height == 0 || g.tree_height % 2 != 0 {
            bail!("tree height must be a positive even number, got {}", g.tree_height);
        }
        if g.panel_width == 0 {
            bail!("panel width must be positive");
        }
        if !(0.0..=1.0).contains(&self.ornament_chance) {
            bail!("ornament chance must be within 0..=1, got {}", self.ornament_chance);
        }
        if self.tick.is_zero() {
            bail!("tick must be at least 1ms");
        }
        Ok(())
    }
}

/// The lyric file sits next to the executable; fall back to the bare name.
fn default_lyrics_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .map(|dir| dir.join(DEFAULT_LYRICS_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LYRICS_FILE))
}
