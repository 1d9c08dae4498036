//! Terminal screen: renders the session on stdout and reads one-letter
//! commands from stdin.
//!
//! The event loop owns the controller, so fetch outcomes, key input and
//! the pulse timer are all handled on one task.

use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::client::QuoteClient;
use crate::config::Config;
use crate::platform::Platform;
use crate::quote::Quote;
use crate::session::{Control, Pulse, SessionController, SessionView};

const TICK: Duration = Duration::from_millis(100);
const HIGHLIGHT: &str = "\x1b[30;43m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Speak,
    Copy,
    Share,
    Quit,
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "n" | "next" => Some(Self::Next),
            "s" | "speak" => Some(Self::Speak),
            "c" | "copy" => Some(Self::Copy),
            "h" | "share" => Some(Self::Share),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct TerminalView {
    loading: bool,
    copy_pulse_until: Option<Instant>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear an expired pulse. Called on every loop tick.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        if self.copy_pulse_until.is_some_and(|until| now >= until) {
            self.copy_pulse_until = None;
            self.render_controls();
        }
    }

    fn controls_line(&self) -> String {
        let next = if self.loading { "[ loading… ]" } else { "[n]ext" };
        let copy = if self.copy_pulse_until.is_some() {
            format!("{HIGHLIGHT}[c]opy{RESET}")
        } else {
            "[c]opy".to_string()
        };
        format!("  {next}  [s]peak  {copy}  s[h]are  [q]uit")
    }

    fn render_controls(&self) {
        println!("{}", self.controls_line());
    }
}

impl SessionView for TerminalView {
    fn show_quote(&mut self, quote: &Quote) {
        println!();
        println!("  \u{201c}{}\u{201d}", quote.text);
        println!("      \u{2014} {}", quote.author);
        println!();
        self.render_controls();
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.render_controls();
        }
    }

    fn pulse(&mut self, control: Control, pulse: Pulse) {
        if control == Control::Copy {
            self.copy_pulse_until = Some(Instant::now() + pulse.reset_after);
            self.render_controls();
        }
    }
}

/// Run the terminal screen until `q`, end of input, or Ctrl-C.
pub async fn run(config: &Config, initial_fetch: bool) -> Result<(), Box<dyn Error>> {
    let source = Arc::new(QuoteClient::new(&config.api)?);
    info!("Quote endpoint: {}", source.endpoint());

    let platform = Platform::desktop(config);
    let (mut controller, mut outcomes) =
        SessionController::new(source, platform, TerminalView::new(), config.speech.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(TICK);

    if initial_fetch {
        controller.request_next();
    } else {
        controller.view().render_controls();
    }

    loop {
        tokio::select! {
            Some(outcome) = outcomes.recv() => {
                controller.on_fetch_complete(outcome);
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match Command::parse(&line) {
                    Some(Command::Next) => controller.request_next(),
                    Some(Command::Speak) => controller.speak_current(),
                    Some(Command::Copy) => controller.copy_current(),
                    Some(Command::Share) => controller.share_current(),
                    Some(Command::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => controller.view().render_controls(),
                }
            }
            _ = tick.tick() => controller.view_mut().tick(),
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    controller.close();
    Ok(())
}
