//! Full-screen countdown clock.

mod glyphs;
pub mod ui;

use std::io;
use std::time::{Duration as StdDuration, Instant};

use chrono::Duration;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::debug;

use crate::error::Result;
use crate::tracking::Countdown;

pub use glyphs::glyph_lines;

/// Counts down on the alternate screen, one tick per second.
///
/// `q`, `Esc` or `Ctrl-C` stop the clock early; that is a normal return.
#[derive(Debug, Default)]
pub struct TerminalCountdown;

impl Countdown for TerminalCountdown {
    fn run(&mut self, duration: Duration, title: &str) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = run_clock(&mut terminal, duration.num_seconds().max(0), title);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
        terminal.show_cursor()?;

        match &res {
            Ok(Tick::Finished) => debug!("countdown finished"),
            Ok(Tick::Interrupted) => debug!("countdown interrupted"),
            Err(e) => debug!(error = %e, "countdown failed"),
        }
        res.map(|_| ()).map_err(Into::into)
    }
}

enum Tick {
    Finished,
    Interrupted,
}

fn is_interrupt(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn run_clock<B: Backend>(terminal: &mut Terminal<B>, total: i64, title: &str) -> io::Result<Tick> {
    let start = Instant::now();
    for remaining in (0..=total).rev() {
        terminal.draw(|f| ui::draw(f, remaining, title))?;
        if remaining == 0 {
            break;
        }

        let elapsed_ticks = (total - remaining + 1) as u64;
        let deadline = start + StdDuration::from_secs(elapsed_ticks);
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if event::poll(deadline - now)? {
                if let Event::Key(key) = event::read()? {
                    if is_interrupt(&key) {
                        return Ok(Tick::Interrupted);
                    }
                }
            }
        }
    }
    Ok(Tick::Finished)
}
