mod app;
mod cli;
mod config;
mod event;
mod lyrics;
mod ui;

use anyhow::Result;
use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

use app::Animator;
use cli::Cli;
use config::Config;
use event::{interrupt_flag, restore_terminal, setup_terminal, SystemClock};
use ui::FrameRenderer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_cli(&cli)?;
    let lyrics = lyrics::load_or_default(&config.lyrics_path);

    let renderer = FrameRenderer::new(&config);
    let mut animator = Animator::new(lyrics, &config);
    let stop = interrupt_flag()?;

    let mut stdout = io::stdout();
    setup_terminal(&mut stdout)?;

    let mut clock = SystemClock::start();
    let mut rng = rand::thread_rng();
    let result = animator.run(&renderer, &mut clock, &mut rng, &mut stdout, &stop);

    restore_terminal(&mut stdout)?;
    result?;

    println!("\nAnimation stopped. Merry Christmas!");
    Ok(())
}

/// Logs go to stderr so they never interleave with frames on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(io::stderr)
        .try_init();
}
