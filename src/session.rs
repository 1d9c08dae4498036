//! Session controller: owns the current quote and the loading flag,
//! and dispatches user actions to the platform.
//!
//! IDLE → LOADING → IDLE
//!
//! Fetches run as tokio tasks and report back over a channel that the
//! UI loop drains into `on_fetch_complete`. Only one fetch is in flight:
//! a new `request_next` aborts the previous task, and any outcome that
//! still arrives from an older request is discarded by generation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::QuoteSource;
use crate::config::SpeechConfig;
use crate::error::{Action, ActionError, FetchError, SpeechInitError};
use crate::platform::{Platform, QueueMode, ShareRequest, Utterance};
use crate::quote::Quote;

pub const NOTICE_FETCH_FAILED: &str = "Something went wrong";
pub const NOTICE_COPIED: &str = "Quote copied to clipboard";
pub const NOTICE_SPEECH_INIT_FAILED: &str = "Text-to-Speech initialization failed";
pub const NOTICE_LANGUAGE_UNSUPPORTED: &str = "Language not supported";

const UTTERANCE_ID: &str = "QuoteUtterance";
const CLIP_LABEL: &str = "Quote";
const SHARE_TITLE: &str = "Share Quote";
const SHARE_MIME: &str = "text/plain";

/// On-screen controls the controller can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Next,
    Speak,
    Copy,
    Share,
}

/// Color pulse on a control: ramps to the highlight color over `duration`
/// and is cleared after `reset_after` whether or not the ramp finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub duration: Duration,
    pub reset_after: Duration,
}

pub const COPY_PULSE: Pulse = Pulse {
    duration: Duration::from_millis(250),
    reset_after: Duration::from_millis(300),
};

/// What the controller needs from the screen.
pub trait SessionView {
    fn show_quote(&mut self, quote: &Quote);
    /// Loading hides the "next" control and shows progress; idle reverses it.
    fn set_loading(&mut self, loading: bool);
    fn pulse(&mut self, control: Control, pulse: Pulse);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loading,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Loading => write!(f, "LOADING"),
        }
    }
}

/// Result of one fetch, tagged with the request that started it.
#[derive(Debug)]
pub struct FetchOutcome {
    generation: u64,
    result: Result<Quote, FetchError>,
}

impl FetchOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub type FetchOutcomes = mpsc::UnboundedReceiver<FetchOutcome>;

pub struct SessionController<V: SessionView> {
    source: Arc<dyn QuoteSource>,
    platform: Platform,
    view: V,
    speech: SpeechConfig,
    current_quote: Option<Quote>,
    phase: SessionPhase,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    outcome_tx: mpsc::UnboundedSender<FetchOutcome>,
    released: bool,
}

impl<V: SessionView> SessionController<V> {
    /// Build the controller and bring up the speech engine. The returned
    /// receiver carries fetch outcomes; feed each one to `on_fetch_complete`.
    pub fn new(
        source: Arc<dyn QuoteSource>,
        mut platform: Platform,
        view: V,
        speech: SpeechConfig,
    ) -> (Self, FetchOutcomes) {
        match platform.speech.init(&speech.language) {
            Ok(()) => {}
            Err(e @ SpeechInitError::LanguageUnsupported(_)) => {
                warn!("{e}");
                platform.notifier.notify(NOTICE_LANGUAGE_UNSUPPORTED);
            }
            Err(e @ SpeechInitError::EngineFailed(_)) => {
                warn!("{e}");
                platform.notifier.notify(NOTICE_SPEECH_INIT_FAILED);
            }
        }

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let controller = Self {
            source,
            platform,
            view,
            speech,
            current_quote: None,
            phase: SessionPhase::Idle,
            generation: 0,
            in_flight: None,
            outcome_tx,
            released: false,
        };
        (controller, outcome_rx)
    }

    pub fn current_quote(&self) -> Option<&Quote> {
        self.current_quote.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Loading
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Start fetching a new quote. Returns immediately; the session is in
    /// `Loading` by the time this returns. Must be called within a tokio runtime.
    pub fn request_next(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            debug!("Aborted fetch #{}", self.generation);
        }

        self.generation += 1;
        let generation = self.generation;
        self.enter(SessionPhase::Loading);

        let source = self.source.clone();
        let tx = self.outcome_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = source.fetch_random_quote().await;
            // Receiver gone means the screen is closing.
            let _ = tx.send(FetchOutcome { generation, result });
        }));
        debug!("Started fetch #{generation}");
    }

    /// Apply a fetch outcome. Returns false if it belonged to a superseded request.
    pub fn on_fetch_complete(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.generation != self.generation || self.phase != SessionPhase::Loading {
            debug!(
                "Discarding outcome of fetch #{} (current #{})",
                outcome.generation, self.generation
            );
            return false;
        }

        self.in_flight = None;
        self.enter(SessionPhase::Idle);

        match outcome.result {
            Ok(quote) => {
                info!("New quote by {}", quote.author);
                self.view.show_quote(&quote);
                self.current_quote = Some(quote);
            }
            Err(e) => {
                warn!("Quote fetch failed: {e}");
                self.platform.notifier.notify(NOTICE_FETCH_FAILED);
            }
        }
        true
    }

    /// Speak "{text} by {author}", replacing anything already being spoken.
    pub fn speak_current(&mut self) {
        let Some(text) = self.current_quote.as_ref().map(Quote::spoken_text) else {
            self.notify_no_quote(Action::Speak);
            return;
        };

        let audio = &mut self.platform.audio;
        if let Err(e) = audio.request_transient_focus() {
            warn!("Audio focus request failed: {e}");
        }
        let level = (f64::from(audio.max_volume()) * self.speech.volume_fraction).floor() as u32;
        if let Err(e) = audio.set_volume(level) {
            warn!("Failed to set output volume: {e}");
        }

        let utterance = Utterance {
            id: UTTERANCE_ID.to_string(),
            text,
            rate: self.speech.rate,
            pitch: self.speech.pitch,
            volume: 1.0,
            pan: 0.0,
            queue: QueueMode::Flush,
        };
        if let Err(e) = self.platform.speech.speak(&utterance) {
            warn!("Speech failed: {e}");
        }
    }

    /// Put "{text} - {author}" on the clipboard and pulse the copy control.
    pub fn copy_current(&mut self) {
        match self.current_quote.as_ref().map(Quote::clip_text) {
            Some(text) => match self.platform.clipboard.set_text(CLIP_LABEL, &text) {
                Ok(()) => self.platform.notifier.notify(NOTICE_COPIED),
                Err(e) => {
                    warn!("Copy failed: {e}");
                    self.platform.notifier.notify(NOTICE_FETCH_FAILED);
                }
            },
            None => self.notify_no_quote(Action::Copy),
        }
        self.view.pulse(Control::Copy, COPY_PULSE);
    }

    /// Hand "{text} - {author}" to the plain-text share flow.
    pub fn share_current(&mut self) {
        let Some(text) = self.current_quote.as_ref().map(Quote::clip_text) else {
            self.notify_no_quote(Action::Share);
            return;
        };

        let request = ShareRequest {
            title: SHARE_TITLE.to_string(),
            mime_type: SHARE_MIME.to_string(),
            text,
        };
        if let Err(e) = self.platform.share.share(&request) {
            warn!("Share failed: {e}");
            self.platform.notifier.notify(NOTICE_FETCH_FAILED);
        }
    }

    /// Release speech and audio focus. Also runs on drop.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        self.platform.speech.stop();
        self.platform.speech.shutdown();
        self.platform.audio.abandon_focus();
        info!("Session resources released");
    }

    fn enter(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            info!("State: {} → {}", self.phase, phase);
        }
        self.phase = phase;
        self.view.set_loading(phase == SessionPhase::Loading);
    }

    fn notify_no_quote(&self, action: Action) {
        let message = ActionError::NoQuoteAvailable(action).to_string();
        debug!("{message}");
        self.platform.notifier.notify(&message);
    }
}

impl<V: SessionView> Drop for SessionController<V> {
    fn drop(&mut self) {
        self.release();
    }
}
