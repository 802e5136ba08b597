use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

static ARTIST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[ar:([^\]]*)\]").unwrap());
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[ti:([^\]]*)\]").unwrap());
static TIMED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(\d{2}):(\d{2})\.(\d{2,3})\](.*)$").unwrap());

pub const DEFAULT_TITLE: &str = "Unknown Song";
pub const DEFAULT_ARTIST: &str = "Unknown Artist";

#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("cannot read lyrics at {path:?}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LyricEntry {
    pub offset: Duration,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SongMeta {
    pub title: String,
    pub artist: String,
}

impl Default for SongMeta {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            artist: DEFAULT_ARTIST.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lyrics {
    pub meta: SongMeta,
    /// Kept in file order, never re-sorted.
    pub entries: Vec<LyricEntry>,
}

impl Lyrics {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse LRC text. Lines that match none of the known tags are dropped.
pub fn parse_lrc(text: &str) -> Lyrics {
    let mut lyrics = Lyrics::default();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = ARTIST_RE.captures(line) {
            lyrics.meta.artist = clean_text(&caps[1]);
        } else if let Some(caps) = TITLE_RE.captures(line) {
            lyrics.meta.title = clean_text(&caps[1]);
        } else if let Some(entry) = parse_timed_line(line) {
            lyrics.entries.push(entry);
        }
    }

    lyrics
}

fn parse_timed_line(line: &str) -> Option<LyricEntry> {
    let caps = TIMED_RE.captures(line)?;
    let minutes: u64 = caps[1].parse().ok()?;
    let seconds: u64 = caps[2].parse().ok()?;
    // ".50" means 500ms, not 50ms
    let millis: u64 = format!("{:0<3}", &caps[3]).parse().ok()?;

    Some(LyricEntry {
        offset: Duration::from_millis(minutes * 60_000 + seconds * 1_000 + millis),
        text: clean_text(&caps[4]),
    })
}

/// Trim, and turn control characters into spaces so every char has a known width.
fn clean_text(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

pub fn load_lrc(path: &Path) -> Result<Lyrics, LyricsError> {
    let text = fs::read_to_string(path).map_err(|source| LyricsError::Io {
        source,
        path: path.to_path_buf(),
    })?;
    Ok(parse_lrc(&text))
}

/// Load lyrics, falling back to an empty song when the file is unusable.
pub fn load_or_default(path: &Path) -> Lyrics {
    match load_lrc(path) {
        Ok(lyrics) => {
            tracing::info!(
                entries = lyrics.entries.len(),
                title = %lyrics.meta.title,
                artist = %lyrics.meta.artist,
                "lyrics loaded"
            );
            lyrics
        }
        Err(err) => {
            tracing::warn!("{err}; showing the tree without lyrics");
            Lyrics::default()
        }
    }
}
