//! Audio Output
//!
//! The simulation only names cues; a sink decides what to do with them.
//! Playback is fire-and-forget, so `play` cannot fail.

use thiserror::Error;
use tracing::debug;

use crate::game::events::AudioCue;

/// Audio setup errors.
#[derive(Debug, Error)]
pub enum AudioError {
    /// A cue's asset could not be loaded.
    #[error("failed to load sound `{name}`: {reason}")]
    Load {
        /// Cue name
        name: &'static str,
        /// What went wrong
        reason: String,
    },
}

/// Receiver for audio cues.
pub trait AudioSink {
    /// Prepare assets. Called once at startup.
    fn load(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    /// Play a cue.
    fn play(&mut self, cue: AudioCue);
}

/// Sink that logs each cue instead of playing it.
#[derive(Debug, Default)]
pub struct TracingAudio {
    played: u64,
}

impl TracingAudio {
    /// Create a sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues received so far.
    pub fn played(&self) -> u64 {
        self.played
    }
}

impl AudioSink for TracingAudio {
    fn play(&mut self, cue: AudioCue) {
        self.played += 1;
        debug!(cue = cue.name(), "sound");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_audio_counts() {
        let mut sink = TracingAudio::new();
        assert!(sink.load().is_ok());
        sink.play(AudioCue::Eat);
        sink.play(AudioCue::Hit);
        assert_eq!(sink.played(), 2);
    }

    #[test]
    fn test_load_error_message() {
        let err = AudioError::Load {
            name: AudioCue::Bonus.name(),
            reason: "missing file".to_string(),
        };
        assert_eq!(err.to_string(), "failed to load sound `bonus`: missing file");
    }
}
