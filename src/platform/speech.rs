//! Text-to-speech through speech-dispatcher's `spd-say` client.
//!
//! speech-dispatcher owns synthesis, queueing and output; we translate
//! an `Utterance` into `spd-say` flags. Rate, pitch and volume are
//! multipliers around 1.0 and map onto spd-say's -100..=100 scale.
//!
//! Each `spd-say` run is its own client connection, so there is no handle
//! on "our" queue: `spd-say -C` cancels messages from every client,
//! screen readers included. We only issue it once we have queued speech
//! of our own.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use super::{QueueMode, SpeechService, Utterance};
use crate::error::{PlatformError, SpeechInitError};

const APPLICATION_NAME: &str = "quotify";

pub struct SpeechDispatcher {
    program: Option<PathBuf>,
    /// Empty when no installed voice matches; speech then uses the default voice.
    language: String,
    spoken: bool,
}

impl SpeechDispatcher {
    pub fn new() -> Self {
        Self {
            program: None,
            language: String::new(),
            spoken: false,
        }
    }

    /// Bring up the engine using the given `spd-say` binary.
    fn init_with(&mut self, program: PathBuf, language: &str) -> Result<(), SpeechInitError> {
        let output = Command::new(&program)
            .arg("-L")
            .output()
            .map_err(|e| SpeechInitError::EngineFailed(format!("Failed to run spd-say: {e}")))?;
        if !output.status.success() {
            return Err(SpeechInitError::EngineFailed(format!(
                "spd-say -L exited with {}",
                output.status
            )));
        }

        info!("Speech engine ready ({})", program.display());
        self.program = Some(program);

        let listing = String::from_utf8_lossy(&output.stdout);
        if !voices_support_language(&listing, language) {
            self.language.clear();
            return Err(SpeechInitError::LanguageUnsupported(language.to_string()));
        }
        self.language = language.to_string();
        Ok(())
    }

    fn cancel_all(&self, program: &Path) {
        match Command::new(program).arg("-C").status() {
            Ok(status) if status.success() => debug!("Flushed speech queue"),
            Ok(status) => warn!("spd-say -C exited with {status}"),
            Err(e) => warn!("Failed to flush speech queue: {e}"),
        }
    }
}

impl Default for SpeechDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechService for SpeechDispatcher {
    fn init(&mut self, language: &str) -> Result<(), SpeechInitError> {
        let program = which::which("spd-say")
            .map_err(|e| SpeechInitError::EngineFailed(format!("spd-say not found: {e}")))?;
        self.init_with(program, language)
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<(), PlatformError> {
        let Some(program) = self.program.clone() else {
            return Err(PlatformError::new("speech engine not initialized"));
        };

        if utterance.queue == QueueMode::Flush && self.spoken {
            self.cancel_all(&program);
        }
        if utterance.pan != 0.0 {
            debug!("spd-say has no pan control, ignoring pan {}", utterance.pan);
        }

        let status = Command::new(&program)
            .args(speak_args(utterance, &self.language))
            .status()
            .map_err(|e| PlatformError::new(format!("Failed to run spd-say: {e}")))?;
        if !status.success() {
            return Err(PlatformError::new(format!("spd-say exited with {status}")));
        }
        self.spoken = true;

        debug!("Queued utterance '{}' ({} chars)", utterance.id, utterance.text.len());
        Ok(())
    }

    fn stop(&mut self) {
        if !self.spoken {
            return;
        }
        if let Some(program) = self.program.clone() {
            self.cancel_all(&program);
        }
        self.spoken = false;
    }

    fn shutdown(&mut self) {
        self.stop();
        if self.program.take().is_some() {
            info!("Speech engine released");
        }
    }
}

fn speak_args(utterance: &Utterance, language: &str) -> Vec<String> {
    let mut args = vec![
        "-N".to_string(),
        APPLICATION_NAME.to_string(),
        "-n".to_string(),
        utterance.id.clone(),
    ];
    if !language.is_empty() {
        args.extend(["-l".to_string(), language.to_string()]);
    }
    args.extend([
        "-r".to_string(),
        to_spd_scale(utterance.rate).to_string(),
        "-p".to_string(),
        to_spd_scale(utterance.pitch).to_string(),
        "-i".to_string(),
        volume_to_spd_scale(utterance.volume).to_string(),
        guard_leading_dash(&utterance.text),
    ]);
    args
}

/// Multiplier around 1.0 → spd-say's -100..=100, where 0 is normal.
fn to_spd_scale(multiplier: f32) -> i32 {
    ((multiplier - 1.0) * 100.0).round().clamp(-100.0, 100.0) as i32
}

/// Volume 0.0..=1.0 → spd-say's -100..=100.
fn volume_to_spd_scale(volume: f32) -> i32 {
    (volume * 200.0 - 100.0).round().clamp(-100.0, 100.0) as i32
}

/// spd-say would read a leading `-` as a flag.
fn guard_leading_dash(text: &str) -> String {
    if text.starts_with('-') {
        format!(" {text}")
    } else {
        text.to_string()
    }
}

/// `spd-say -L` prints a header line then `NAME LANGUAGE VARIANT` rows.
/// A language matches when the primary subtags agree (`en-US` ~ `en-gb`).
fn voices_support_language(listing: &str, language: &str) -> bool {
    let wanted = primary_subtag(language);
    listing
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|lang| primary_subtag(lang) == wanted)
}

fn primary_subtag(tag: &str) -> String {
    tag.split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}
