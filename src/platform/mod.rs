//! Platform capabilities used by the session controller.
//!
//! The controller only talks to these traits, so it can run against the
//! Linux desktop adapters below or the recording mocks in `testing`.
//! - `speech`: speech-dispatcher (`spd-say`)
//! - `audio`: PulseAudio / PipeWire via `pactl` (ducking + volume)
//! - `clipboard`: arboard, xclip fallback
//! - `share`: external command fed on stdin
//! - `notifier`: notify-rust desktop notifications or console notices

pub mod audio;
pub mod clipboard;
pub mod notifier;
pub mod share;
pub mod speech;

use std::sync::Arc;

use crate::error::{PlatformError, SpeechInitError};

/// What happens to utterances already queued when a new one arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueMode {
    /// Drop anything pending or playing, then speak.
    Flush,
}

/// A single request to the speech engine. Rate and pitch are multipliers
/// where 1.0 is the engine's normal value.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: String,
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub pan: f32,
    pub queue: QueueMode,
}

pub trait SpeechService {
    /// Bring the engine up for `language` (BCP 47 tag, e.g. `en-US`).
    fn init(&mut self, language: &str) -> Result<(), SpeechInitError>;
    fn speak(&mut self, utterance: &Utterance) -> Result<(), PlatformError>;
    /// Stop the current utterance and drop the queue.
    fn stop(&mut self);
    /// Release the engine. Further `speak` calls fail.
    fn shutdown(&mut self);
}

/// Audio focus arbitration and output volume.
pub trait AudioOutput {
    /// Ask for short-lived focus that ducks other audio rather than pausing it.
    fn request_transient_focus(&mut self) -> Result<(), PlatformError>;
    fn abandon_focus(&mut self);
    /// Maximum volume level of the output stream, in the adapter's units.
    fn max_volume(&self) -> u32;
    fn set_volume(&mut self, level: u32) -> Result<(), PlatformError>;
}

pub trait ClipboardService {
    fn set_text(&mut self, label: &str, text: &str) -> Result<(), PlatformError>;
}

/// Plain-text share / chooser request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub title: String,
    pub mime_type: String,
    pub text: String,
}

pub trait ShareService {
    fn share(&mut self, request: &ShareRequest) -> Result<(), PlatformError>;
}

/// Short-lived, one-line user notices. Shared with adapters that finish
/// work in the background, hence `Send + Sync`.
pub trait NotificationService: Send + Sync {
    fn notify(&self, message: &str);
}

/// The full set of capabilities the controller owns for its lifetime.
pub struct Platform {
    pub speech: Box<dyn SpeechService>,
    pub audio: Box<dyn AudioOutput>,
    pub clipboard: Box<dyn ClipboardService>,
    pub share: Box<dyn ShareService>,
    pub notifier: Arc<dyn NotificationService>,
}

impl Platform {
    /// Linux desktop adapters selected from config.
    pub fn desktop(config: &crate::config::Config) -> Self {
        let notifier: Arc<dyn NotificationService> = if config.feedback.desktop_notifications {
            Arc::new(notifier::Notifier::new(true))
        } else {
            Arc::new(notifier::ConsoleNotifier)
        };
        Self::desktop_with_notifier(config, notifier)
    }

    /// Desktop adapters with notices routed to `notifier`.
    pub fn desktop_with_notifier(
        config: &crate::config::Config,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            speech: Box::new(speech::SpeechDispatcher::new()),
            audio: Box::new(audio::PulseAudio::new()),
            clipboard: Box::new(clipboard::SystemClipboard::new(&config.clipboard)),
            share: Box::new(share::CommandShare::new(&config.share, notifier.clone())),
            notifier,
        }
    }
}
