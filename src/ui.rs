use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::io::{self, Write};
use std::sync::LazyLock;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::{Config, Geometry};
use crate::lyrics::SongMeta;

static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

const STAR: char = '★';
const FOLIAGE: char = '▲';
const ORNAMENT: char = '●';
const TRUNK: char = '█';
const MESSAGE: &str = "Merry Christmas!";

const STAR_COLOR: Color = Color::Yellow;
const FOLIAGE_COLOR: Color = Color::Green;
const TRUNK_COLOR: Color = Color::White;
const BORDER_COLOR: Color = Color::Cyan;
const TITLE_COLOR: Color = Color::AnsiValue(220);
const MESSAGE_COLOR: Color = Color::Red;

const ORNAMENT_COLORS: [Color; 8] = [
    Color::Red,
    Color::Yellow,
    Color::Blue,
    Color::Cyan,
    Color::Magenta,
    Color::AnsiValue(208),
    Color::AnsiValue(220),
    Color::AnsiValue(200),
];

/// Remove ANSI color sequences.
pub fn strip_ansi(s: &str) -> String {
    ANSI_RE.replace_all(s, "").into_owned()
}

/// Columns a string occupies on screen, ignoring color sequences.
pub fn visible_width(s: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(s).as_str())
}

fn fg(color: Color) -> String {
    SetForegroundColor(color).to_string()
}

fn reset() -> String {
    ResetColor.to_string()
}

fn spaces(n: usize) -> String {
    " ".repeat(n)
}

/// Cut `text` to at most `width` display columns.
///
/// Measured on the growing prefix so multi-char sequences (emoji with a
/// variation selector) are counted the same way as the final string.
fn truncate_to_width(text: &str, width: usize) -> &str {
    if UnicodeWidthStr::width(text) <= width {
        return text;
    }
    let mut end = 0;
    for (idx, c) in text.char_indices() {
        let next = idx + c.len_utf8();
        if UnicodeWidthStr::width(&text[..next]) > width {
            break;
        }
        end = next;
    }
    &text[..end]
}

/// Truncate then pad both sides so the result is exactly `width` columns.
fn fit_centered(text: &str, width: usize) -> String {
    let text = truncate_to_width(text, width);
    let used = UnicodeWidthStr::width(text);
    let left = width.saturating_sub(used) / 2;
    let right = width.saturating_sub(used + left);
    format!("{}{}{}", spaces(left), text, spaces(right))
}

/// Center already-styled content whose visible width is `used` inside `width`.
fn pad_centered(content: String, used: usize, width: usize) -> String {
    let left = width.saturating_sub(used) / 2;
    let right = width.saturating_sub(used + left);
    format!("{}{}{}", spaces(left), content, spaces(right))
}

pub struct FrameRenderer {
    geometry: Geometry,
    ornament_chance: f64,
}

impl FrameRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            geometry: config.geometry,
            ornament_chance: config.ornament_chance,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Build one full frame: a blank line, tree and panel side by side, then the greeting.
    pub fn render<'a, R, I>(&self, meta: &SongMeta, lyrics: I, rng: &mut R) -> Vec<String>
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = &'a str>,
    {
        let g = &self.geometry;
        let tree = self.tree_rows(rng);
        let panel = self.panel_rows(meta, lyrics);

        let mut frame = Vec::with_capacity(g.total_rows() + 4);
        frame.push(String::new());
        for (tree_row, panel_row) in tree.into_iter().zip(panel) {
            let gap = (g.tree_width + g.gap).saturating_sub(visible_width(&tree_row));
            frame.push(format!("{}{}{}", tree_row, spaces(gap), panel_row));
        }

        frame.push(String::new());
        frame.push(self.message_row());
        frame.push(String::new());
        frame
    }

    pub fn tree_rows<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let g = &self.geometry;
        let mut rows = Vec::with_capacity(g.total_rows());

        rows.push(pad_centered(
            format!("{}{}{}", fg(STAR_COLOR), STAR, reset()),
            1,
            g.tree_width,
        ));

        for r in 1..=g.branch_rows() {
            let width = (2 * r - 1).min(g.tree_width);
            rows.push(pad_centered(self.branch(width, rng), width, g.tree_width));
        }

        let trunk_width = g.trunk_width();
        let trunk = format!(
            "{}{}{}",
            fg(TRUNK_COLOR),
            TRUNK.to_string().repeat(trunk_width),
            reset()
        );
        for _ in 0..Geometry::TRUNK_ROWS {
            rows.push(pad_centered(trunk.clone(), trunk_width, g.tree_width));
        }

        rows
    }

    fn branch<R: Rng + ?Sized>(&self, width: usize, rng: &mut R) -> String {
        let mut branch = fg(FOLIAGE_COLOR);
        for _ in 0..width {
            if rng.gen_bool(self.ornament_chance) {
                let color = ORNAMENT_COLORS.choose(rng).copied().unwrap_or(Color::Red);
                branch.push_str(&fg(color));
                branch.push(ORNAMENT);
                branch.push_str(&fg(FOLIAGE_COLOR));
            } else {
                branch.push(FOLIAGE);
            }
        }
        branch.push_str(&reset());
        branch
    }

    /// One panel row per frame row: top border, title, lyrics, bottom border.
    pub fn panel_rows<'a, I>(&self, meta: &SongMeta, lyrics: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let g = &self.geometry;
        let rule = "═".repeat(g.panel_width);
        let mut rows = Vec::with_capacity(g.total_rows());

        rows.push(format!("{}╔{}╗{}", fg(BORDER_COLOR), rule, reset()));

        let title = format!("♪ {} - {} ♪", meta.title, meta.artist);
        rows.push(self.bordered(format!(
            "{}{}{}",
            fg(TITLE_COLOR),
            fit_centered(&title, g.panel_width),
            reset()
        )));

        let mut lyrics = lyrics.into_iter();
        for _ in 0..g.lyric_rows() {
            let line = lyrics.next().unwrap_or("");
            rows.push(self.bordered(fit_centered(line, g.panel_width)));
        }

        rows.push(format!("{}╚{}╝{}", fg(BORDER_COLOR), rule, reset()));
        rows
    }

    fn bordered(&self, content: String) -> String {
        let side = format!("{}║{}", fg(BORDER_COLOR), reset());
        format!("{side}{content}{side}")
    }

    fn message_row(&self) -> String {
        let width = UnicodeWidthStr::width(MESSAGE);
        let styled = format!("{}{}{}", fg(MESSAGE_COLOR), MESSAGE, reset());
        let left = self.geometry.tree_width.saturating_sub(width) / 2;
        format!("{}{}", spaces(left), styled)
    }
}

/// Clear the screen and write a frame from the top-left corner.
pub fn draw_frame<W: Write>(out: &mut W, frame: &[String]) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for line in frame {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn renderer() -> FrameRenderer {
        FrameRenderer::new(&Config::default())
    }

    fn meta(title: &str, artist: &str) -> SongMeta {
        SongMeta {
            title: title.to_string(),
            artist: artist.to_string(),
        }
    }

    #[test]
    fn strip_ansi_removes_crossterm_colors() {
        let styled = format!(
            "{}a{}b{}c{}",
            fg(Color::Green),
            fg(Color::AnsiValue(208)),
            fg(Color::Red),
            reset()
        );
        assert_eq!(strip_ansi(&styled), "abc");
        assert_eq!(visible_width(&styled), 3);
    }

    #[test]
    fn tree_rows_have_fixed_visible_width() {
        let r = renderer();
        let w = r.geometry().tree_width;
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let rows = r.tree_rows(&mut rng);
            assert_eq!(rows.len(), r.geometry().total_rows());
            for row in &rows {
                assert_eq!(visible_width(row), w, "row {:?}", strip_ansi(row));
            }
        }
    }

    #[test]
    fn narrow_tree_clamps_branches() {
        let config = Config {
            geometry: Geometry {
                tree_width: 7,
                tree_height: 20,
                ..Geometry::default()
            },
            ..Config::default()
        };
        let r = FrameRenderer::new(&config);
        for row in &r.tree_rows(&mut StdRng::seed_from_u64(7)) {
            assert_eq!(visible_width(row), 7);
        }

        let rows = r.tree_rows(&mut StepRng::new(u64::MAX, 0));
        assert_eq!(strip_ansi(&rows[4]), "▲▲▲▲▲▲▲");
        assert_eq!(strip_ansi(&rows[10]), "▲▲▲▲▲▲▲");
    }

    #[test]
    fn ornaments_follow_the_random_source() {
        let r = renderer();

        let none = r.tree_rows(&mut StepRng::new(u64::MAX, 0));
        assert_eq!(strip_ansi(&none[0]).trim(), "★");
        assert_eq!(strip_ansi(&none[1]).trim(), "▲");
        assert_eq!(strip_ansi(&none[3]).trim(), "▲▲▲▲▲");
        assert!(none.iter().all(|row| !row.contains(ORNAMENT)));

        let all = r.tree_rows(&mut StepRng::new(0, 0));
        assert_eq!(strip_ansi(&all[2]).trim(), "●●●");
        assert_eq!(strip_ansi(&all[10]).trim(), "●".repeat(19));
        assert_eq!(strip_ansi(&all[11]).trim(), "█████");
    }

    #[test]
    fn star_and_trunk_are_centered() {
        let rows = renderer().tree_rows(&mut StepRng::new(u64::MAX, 0));
        assert_eq!(strip_ansi(&rows[0]), format!("{}★{}", " ".repeat(19), " ".repeat(20)));
        assert_eq!(strip_ansi(&rows[1]), format!("{}▲{}", " ".repeat(19), " ".repeat(20)));
        assert_eq!(strip_ansi(&rows[13]), format!("{}█████{}", " ".repeat(17), " ".repeat(18)));
    }

    #[test]
    fn panel_rows_have_fixed_inner_width() {
        let r = renderer();
        let c = r.geometry().panel_width;
        let long = "x".repeat(200);
        let lyrics = ["short", long.as_str(), "", "你好世界"];
        let rows = r.panel_rows(&meta("Snowman", "Sia"), lyrics);

        assert_eq!(rows.len(), r.geometry().total_rows());
        for row in &rows {
            assert_eq!(visible_width(row), c + 2);
        }
        assert_eq!(strip_ansi(&rows[0]), format!("╔{}╗", "═".repeat(c)));
        assert_eq!(strip_ansi(rows.last().unwrap()), format!("╚{}╝", "═".repeat(c)));
    }

    #[test]
    fn long_lyric_is_truncated_not_wrapped() {
        let r = renderer();
        let c = r.geometry().panel_width;
        let long: String = ('a'..='z').cycle().take(c + 15).collect();
        let rows = r.panel_rows(&meta("t", "a"), [long.as_str()]);

        let inner = strip_ansi(&rows[2]);
        assert_eq!(inner, format!("║{}║", &long[..c]));
    }

    #[test]
    fn wide_glyph_at_the_edge_is_dropped() {
        assert_eq!(truncate_to_width("ab你", 3), "ab");
        assert_eq!(UnicodeWidthStr::width(fit_centered("ab你", 3).as_str()), 3);
    }

    #[test]
    fn emoji_sequence_at_the_edge_keeps_the_row_width() {
        let r = renderer();
        let c = r.geometry().panel_width;
        let edge = "x".repeat(c - 1) + "\u{2764}\u{FE0F}";
        let title = "t".repeat(c) + "\u{2764}\u{FE0F}";
        let rows = r.panel_rows(&meta(&title, "a"), [edge.as_str(), "\u{2764}\u{FE0F} short"]);

        for row in &rows {
            assert_eq!(visible_width(row), c + 2, "{:?}", strip_ansi(row));
        }
        assert!(strip_ansi(&rows[2]).starts_with(&format!("║{}", "x".repeat(c - 1))));
        assert!(UnicodeWidthStr::width(truncate_to_width(&edge, c)) <= c);
    }

    #[test]
    fn title_and_lyrics_are_centered() {
        let r = renderer();
        let rows = r.panel_rows(&meta("X", "Y"), ["Hi"]);

        assert_eq!(strip_ansi(&rows[1]), format!("║{}♪ X - Y ♪{}║", " ".repeat(25), " ".repeat(26)));
        assert_eq!(strip_ansi(&rows[2]), format!("║{}Hi{}║", " ".repeat(29), " ".repeat(29)));
        assert_eq!(strip_ansi(&rows[3]), format!("║{}║", " ".repeat(60)));
    }

    #[test]
    fn rows_beyond_buffer_are_blank() {
        let r = renderer();
        let rows = r.panel_rows(&meta("X", "Y"), std::iter::empty());
        let blank = format!("║{}║", " ".repeat(r.geometry().panel_width));
        for row in &rows[2..rows.len() - 1] {
            assert_eq!(strip_ansi(row), blank);
        }
    }

    #[test]
    fn panel_border_starts_at_a_fixed_column() {
        let r = renderer();
        let g = *r.geometry();
        let column = g.tree_width + g.gap;
        let lines = ["one", "two", "three"];

        for seed in 0..20 {
            let frame = r.render(&meta("X", "Y"), lines, &mut StdRng::seed_from_u64(seed));
            assert_eq!(frame.len(), g.total_rows() + 4);
            assert_eq!(frame[0], "");

            for line in &frame[1..=g.total_rows()] {
                let plain: Vec<char> = strip_ansi(line).chars().collect();
                assert!(matches!(plain[column], '║' | '╔' | '╚'), "{:?}", plain);
                assert_eq!(plain.len(), column + g.panel_width + 2);
            }
        }
    }

    #[test]
    fn greeting_follows_the_body() {
        let r = renderer();
        let frame = r.render(&meta("X", "Y"), std::iter::empty(), &mut StepRng::new(0, 0));
        let n = r.geometry().total_rows() + 1;

        assert_eq!(frame[n], "");
        assert_eq!(strip_ansi(&frame[n + 1]), format!("{}{}", " ".repeat(12), MESSAGE));
        assert_eq!(frame[n + 2], "");
    }

    #[test]
    fn draw_frame_clears_then_prints() {
        let mut out = Vec::new();
        draw_frame(&mut out, &["a".to_string(), "b".to_string()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b["));
        assert!(text.ends_with("a\nb\n"));
    }
}
