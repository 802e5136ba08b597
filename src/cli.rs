use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(name = "xmas_tree")]
#[command(about = "Animated Christmas tree with scrolling, time-synced lyrics")]
pub struct Cli {
    /// LRC file to show next to the tree. Defaults to snowman_lyrics.lrc beside the
    /// executable; a sample ships as assets/snowman_lyrics.lrc.
    #[arg(long)]
    pub lyrics: Option<PathBuf>,

    /// Redraw interval in milliseconds while waiting for the next lyric.
    #[arg(long, default_value_t = 100)]
    pub tick_ms: u64,

    /// Width of the tree column.
    #[arg(long, default_value_t = 40)]
    pub tree_width: usize,

    /// Tree height; must be even.
    #[arg(long, default_value_t = 20)]
    pub tree_height: usize,

    /// Spaces between the tree column and the lyric panel.
    #[arg(long, default_value_t = 12)]
    pub gap: usize,

    /// Inner width of the lyric panel.
    #[arg(long, default_value_t = 60)]
    pub panel_width: usize,
}
