use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Time source for the animation loop.
pub trait Clock {
    /// Time since the animation started.
    fn elapsed(&self) -> Duration;
    fn sleep(&mut self, duration: Duration);
}

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Install a Ctrl-C handler that raises the returned flag.
pub fn interrupt_flag() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        tracing::info!("interrupt received");
        handler_stop.store(true, Ordering::SeqCst);
    })
    .context("failed to install the Ctrl-C handler")?;
    Ok(stop)
}

pub fn setup_terminal<W: Write>(out: &mut W) -> Result<()> {
    execute!(out, EnterAlternateScreen, Hide)?;
    Ok(())
}

pub fn restore_terminal<W: Write>(out: &mut W) -> Result<()> {
    execute!(out, Show, LeaveAlternateScreen)?;
    Ok(())
}
