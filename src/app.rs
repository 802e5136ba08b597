use anyhow::Result;
use rand::Rng;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::Config;
use crate::event::Clock;
use crate::lyrics::{LyricEntry, Lyrics, SongMeta};
use crate::ui::{draw_frame, FrameRenderer};

/// Bounded FIFO of the lyric lines currently on screen, oldest first.
#[derive(Debug, Clone)]
pub struct ScrollBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ScrollBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Nothing to scroll; redraw the tree every tick.
    NoLyrics,
    /// Reveal lines as the clock passes their offsets.
    Timed,
}

pub struct Animator {
    meta: SongMeta,
    entries: Vec<LyricEntry>,
    cursor: usize,
    buffer: ScrollBuffer,
    mode: Mode,
    tick: Duration,
    min_sleep: Duration,
}

impl Animator {
    pub fn new(lyrics: Lyrics, config: &Config) -> Self {
        let mode = if lyrics.is_empty() {
            Mode::NoLyrics
        } else {
            Mode::Timed
        };

        Self {
            meta: lyrics.meta,
            entries: lyrics.entries,
            cursor: 0,
            buffer: ScrollBuffer::new(config.geometry.lyric_rows()),
            mode,
            tick: config.tick,
            min_sleep: config.min_sleep,
        }
    }

    #[cfg(test)]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[cfg(test)]
    pub fn meta(&self) -> &SongMeta {
        &self.meta
    }

    #[cfg(test)]
    pub fn buffer(&self) -> &ScrollBuffer {
        &self.buffer
    }

    pub fn next_entry(&self) -> Option<&LyricEntry> {
        self.entries.get(self.cursor)
    }

    /// Move every entry that is due at `elapsed` into the scroll buffer.
    /// Returns how many were admitted.
    pub fn admit_due(&mut self, elapsed: Duration) -> usize {
        let mut admitted = 0;
        while let Some(entry) = self.entries.get(self.cursor) {
            if entry.offset > elapsed {
                break;
            }
            self.buffer.push(entry.text.clone());
            tracing::debug!(
                offset = ?entry.offset,
                text = %entry.text,
                visible = self.buffer.len(),
                "lyric admitted"
            );
            self.cursor += 1;
            admitted += 1;
        }
        admitted
    }

    /// How long to sleep after rendering at `elapsed`.
    pub fn next_sleep(&self, elapsed: Duration) -> Duration {
        match self.next_entry() {
            Some(entry) => match entry.offset.checked_sub(elapsed) {
                Some(wait) if !wait.is_zero() => wait.min(self.tick),
                _ => self.min_sleep,
            },
            None => self.tick,
        }
    }

    /// Render frames until `stop` is raised.
    pub fn run<W, C, R>(
        &mut self,
        renderer: &FrameRenderer,
        clock: &mut C,
        rng: &mut R,
        out: &mut W,
        stop: &AtomicBool,
    ) -> Result<()>
    where
        W: Write,
        C: Clock,
        R: Rng + ?Sized,
    {
        tracing::info!(
            mode = ?self.mode,
            entries = self.entries.len(),
            rows = self.buffer.capacity(),
            panel_width = renderer.geometry().panel_width,
            "animation started"
        );

        while !stop.load(Ordering::SeqCst) {
            let elapsed = clock.elapsed();
            if self.mode == Mode::Timed {
                self.admit_due(elapsed);
            }

            let frame = renderer.render(&self.meta, self.buffer.iter(), rng);
            draw_frame(out, &frame)?;

            let sleep = match self.mode {
                Mode::Timed => self.next_sleep(elapsed),
                Mode::NoLyrics => self.tick,
            };
            clock.sleep(sleep);
        }

        Ok(())
    }
}
