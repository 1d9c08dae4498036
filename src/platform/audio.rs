//! Audio focus and volume on PulseAudio / PipeWire (pipewire-pulse).
//!
//! Transient ducking focus is `module-role-ducking`: while a stream with
//! a trigger role plays, music and video streams are lowered instead of
//! paused. The module is loaded once and unloaded when focus is abandoned.
//! Volume levels are percent of the sink's normal volume.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info, warn};

use super::AudioOutput;
use crate::error::PlatformError;

const MAX_VOLUME_PERCENT: u32 = 100;
const DUCKING_ARGS: [&str; 3] = [
    "trigger_roles=accessibility,phone",
    "ducking_roles=music,video,game",
    "volume=40%",
];

pub struct PulseAudio {
    pactl: Option<PathBuf>,
    ducking_module: Option<u32>,
}

impl PulseAudio {
    pub fn new() -> Self {
        let pactl = match which::which("pactl") {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("pactl not found ({e}), audio focus and volume disabled");
                None
            }
        };
        Self {
            pactl,
            ducking_module: None,
        }
    }

    fn pactl(&self, args: &[&str]) -> Result<String, PlatformError> {
        let program = self
            .pactl
            .as_ref()
            .ok_or_else(|| PlatformError::new("pactl not available"))?;

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| PlatformError::new(format!("Failed to run pactl: {e}")))?;
        if !output.status.success() {
            return Err(PlatformError::new(format!(
                "pactl {} failed: {}",
                args.first().copied().unwrap_or_default(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for PulseAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for PulseAudio {
    fn request_transient_focus(&mut self) -> Result<(), PlatformError> {
        if self.ducking_module.is_some() {
            return Ok(());
        }

        let mut args = vec!["load-module", "module-role-ducking"];
        args.extend(DUCKING_ARGS);
        let stdout = self.pactl(&args)?;
        let index = parse_module_index(&stdout)
            .ok_or_else(|| PlatformError::new(format!("unexpected load-module output: {stdout:?}")))?;

        info!("Audio focus granted (ducking module #{index})");
        self.ducking_module = Some(index);
        Ok(())
    }

    fn abandon_focus(&mut self) {
        let Some(index) = self.ducking_module.take() else {
            return;
        };
        match self.pactl(&["unload-module", &index.to_string()]) {
            Ok(_) => info!("Audio focus released"),
            Err(e) => warn!("Failed to release audio focus: {e}"),
        }
    }

    fn max_volume(&self) -> u32 {
        MAX_VOLUME_PERCENT
    }

    fn set_volume(&mut self, level: u32) -> Result<(), PlatformError> {
        let level = level.min(MAX_VOLUME_PERCENT);
        self.pactl(&["set-sink-volume", "@DEFAULT_SINK@", &format!("{level}%")])?;
        debug!("Output volume set to {level}%");
        Ok(())
    }
}

fn parse_module_index(stdout: &str) -> Option<u32> {
    stdout.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_load_module_output() {
        assert_eq!(parse_module_index("536870913\n"), Some(536870913));
        assert_eq!(parse_module_index("Failure"), None);
    }

    #[test]
    fn abandon_without_focus_is_a_no_op() {
        let mut audio = PulseAudio {
            pactl: None,
            ducking_module: None,
        };
        audio.abandon_focus();
        assert!(audio.ducking_module.is_none());
    }

    #[test]
    fn missing_pactl_reports_errors() {
        let mut audio = PulseAudio {
            pactl: None,
            ducking_module: None,
        };
        assert!(audio.request_transient_focus().is_err());
        assert!(audio.set_volume(80).is_err());
        assert_eq!(audio.max_volume(), 100);
    }
}
