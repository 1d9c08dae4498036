//! System clipboard.
//!
//! Sets the clipboard with arboard and falls back to xclip if arboard
//! can't reach a clipboard. The arboard handle is kept for the whole
//! session: on X11 the selection is lost when its owner is dropped.

use std::io::Write;
use std::process::{Command, Stdio};

use arboard::Clipboard;
use tracing::{debug, info, warn};

use super::ClipboardService;
use crate::config::ClipboardConfig;
use crate::error::PlatformError;

pub struct SystemClipboard {
    backend: ClipboardBackend,
    handle: Option<Clipboard>,
}

enum ClipboardBackend {
    Arboard,
    Xclip,
}

impl SystemClipboard {
    pub fn new(config: &ClipboardConfig) -> Self {
        let backend = if config.backend == "xclip" {
            ClipboardBackend::Xclip
        } else {
            ClipboardBackend::Arboard
        };

        info!(
            "Clipboard initialized (backend: {})",
            match &backend {
                ClipboardBackend::Arboard => "arboard",
                ClipboardBackend::Xclip => "xclip",
            }
        );

        Self {
            backend,
            handle: None,
        }
    }

    fn set_with_arboard(&mut self, text: &str) -> Result<(), PlatformError> {
        let mut clipboard = match self.handle.take() {
            Some(c) => c,
            None => Clipboard::new()
                .map_err(|e| PlatformError::new(format!("Failed to open clipboard: {e}")))?,
        };
        clipboard
            .set_text(text)
            .map_err(|e| PlatformError::new(format!("Failed to set clipboard: {e}")))?;
        self.handle = Some(clipboard);

        debug!("Copied via arboard");
        Ok(())
    }

    fn set_with_xclip(&self, text: &str) -> Result<(), PlatformError> {
        let mut child = Command::new("xclip")
            .args(["-selection", "clipboard"])
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| PlatformError::new(format!("Failed to spawn xclip: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| PlatformError::new(format!("Failed to write to xclip: {e}")))?;
        }
        let status = child
            .wait()
            .map_err(|e| PlatformError::new(format!("xclip failed: {e}")))?;
        if !status.success() {
            return Err(PlatformError::new("xclip exited with non-zero status"));
        }

        debug!("Copied via xclip");
        Ok(())
    }
}

impl ClipboardService for SystemClipboard {
    fn set_text(&mut self, label: &str, text: &str) -> Result<(), PlatformError> {
        debug!("Setting clipboard '{label}' ({} chars)", text.len());

        match self.backend {
            ClipboardBackend::Arboard => match self.set_with_arboard(text) {
                Ok(()) => Ok(()),
                Err(e) => {
                    warn!("arboard failed: {e}, falling back to xclip");
                    self.set_with_xclip(text)
                }
            },
            ClipboardBackend::Xclip => self.set_with_xclip(text),
        }
    }
}
