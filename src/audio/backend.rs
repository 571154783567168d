//! The synthesis collaborator and a recording stand-in.

use std::cell::{Cell, RefCell};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, ShellError};

/// A decoded sample buffer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioBuffer {
    pub url: String,
    /// Length in seconds.
    pub duration: f64,
}

/// How a voice is triggered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayType {
    /// Start and stop after the duration.
    #[default]
    AttackRelease,
    /// Start and hold until released.
    Attack,
    /// Release a held voice.
    Release,
}

/// One triggered sound, as handed to the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub play_type: PlayType,
    /// Start time on the backend clock, in seconds.
    pub time: f64,
    /// Pitch offset in semitones, already clamped.
    pub semitones: f64,
    /// Playback rate matching `semitones`.
    pub rate: f64,
    /// Seconds; only meaningful for `AttackRelease`.
    pub duration: f64,
    /// Linear velocity, 0..=1.
    pub velocity: f64,
    /// Source gain in dB.
    pub gain_db: f64,
}

/// Whatever actually makes sound.
pub trait AudioBackend {
    /// Fetch and decode the buffer at `url`.
    fn load_buffer(&self, url: &str) -> Result<AudioBuffer>;

    /// Current time on the backend clock, in seconds.
    fn now(&self) -> f64;

    fn trigger(&self, voice: &Voice);

    /// Ramp the master output to `db` over `ramp_seconds`.
    fn set_master_gain(&self, db: f64, ramp_seconds: f64);
}

/// Backend that records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingAudioBackend {
    durations: FxHashMap<String, f64>,
    clock: Cell<f64>,
    loads: RefCell<Vec<String>>,
    voices: RefCell<Vec<Voice>>,
    gains: RefCell<Vec<f64>>,
}

impl RecordingAudioBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `url` loadable with the given duration (builder pattern).
    #[must_use]
    pub fn with_buffer(mut self, url: impl Into<String>, duration: f64) -> Self {
        self.durations.insert(url.into(), duration);
        self
    }

    pub fn set_time(&self, seconds: f64) {
        self.clock.set(seconds);
    }

    /// URLs passed to `load_buffer`, in order.
    #[must_use]
    pub fn loads(&self) -> Vec<String> {
        self.loads.borrow().clone()
    }

    #[must_use]
    pub fn voices(&self) -> Vec<Voice> {
        self.voices.borrow().clone()
    }

    /// Master gain targets, in order.
    #[must_use]
    pub fn gains(&self) -> Vec<f64> {
        self.gains.borrow().clone()
    }
}

impl AudioBackend for RecordingAudioBackend {
    fn load_buffer(&self, url: &str) -> Result<AudioBuffer> {
        self.loads.borrow_mut().push(url.to_string());
        self.durations
            .get(url)
            .map(|&duration| AudioBuffer {
                url: url.to_string(),
                duration,
            })
            .ok_or_else(|| ShellError::Load {
                src: url.to_string(),
                message: "no such buffer".into(),
            })
    }

    fn now(&self) -> f64 {
        self.clock.get()
    }

    fn trigger(&self, voice: &Voice) {
        self.voices.borrow_mut().push(voice.clone());
    }

    fn set_master_gain(&self, db: f64, _ramp_seconds: f64) {
        self.gains.borrow_mut().push(db);
    }
}
