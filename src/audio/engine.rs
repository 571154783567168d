//! Named-sound playback on top of an [`AudioBackend`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::{debug, error};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::backend::{AudioBackend, PlayType, Voice};
use super::cache::BufferCache;
use crate::core::error::{Result, ShellError};
use crate::core::math::clamp;

/// Transpose range in semitones.
pub const MAX_TRANSPOSE: f64 = 48.0;

/// Master gain ramp on focus changes, in seconds.
const FOCUS_RAMP_SECONDS: f64 = 0.1;

/// Playback rate for a pitch offset: `2^(semitones / 12)`.
#[must_use]
pub fn semitone_to_rate(semitones: f64) -> f64 {
    (semitones * std::f64::consts::LN_2 / 12.0).exp()
}

/// One named sound in the manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    /// Gain in dB.
    #[serde(default)]
    pub volume: Option<f64>,
}

/// Sound manifest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    /// Master gain in dB.
    #[serde(default)]
    pub master_volume: Option<f64>,
    pub sources: BTreeMap<String, SourceConfig>,
}

impl AudioConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source (builder pattern).
    #[must_use]
    pub fn with_source(
        mut self,
        name: impl Into<String>,
        url: impl Into<String>,
        volume: Option<f64>,
    ) -> Self {
        self.sources.insert(
            name.into(),
            SourceConfig {
                url: url.into(),
                volume,
            },
        );
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Options for a single [`AudioEngine::play`] call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayOptions {
    pub play_type: PlayType,
    /// Seconds from now.
    pub delay: f64,
    /// Semitones; clamped to `[-48, 48]`.
    pub transpose: f64,
    /// Seconds; defaults to the buffer's length.
    pub duration: Option<f64>,
    /// Linear velocity.
    pub volume: f64,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            play_type: PlayType::AttackRelease,
            delay: 0.0,
            transpose: 0.0,
            duration: None,
            volume: 1.0,
        }
    }
}

impl PlayOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_type(mut self, play_type: PlayType) -> Self {
        self.play_type = play_type;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }

    #[must_use]
    pub fn with_transpose(mut self, semitones: f64) -> Self {
        self.transpose = semitones;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    #[must_use]
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }
}

/// A loaded source.
#[derive(Clone, Debug, PartialEq)]
pub struct Source {
    pub url: String,
    pub duration: f64,
    pub gain_db: f64,
}

struct EngineState {
    config: AudioConfig,
    backend: Rc<dyn AudioBackend>,
    sources: FxHashMap<String, Source>,
}

/// Plays sounds by name.
///
/// Starts empty; [`init`](Self::init) loads the manifest once. Until then
/// every `play` fails with a missing-sound error.
pub struct AudioEngine {
    state: RefCell<Option<EngineState>>,
    focused: Cell<bool>,
}

impl AudioEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new(None),
            focused: Cell::new(true),
        }
    }

    /// Load every source in `config`.
    ///
    /// Sources whose buffer fails to load are skipped and the first such
    /// error is returned after the rest have been attempted. A second call
    /// fails with `AlreadyInitialized` either way.
    pub fn init(&self, config: AudioConfig, backend: Rc<dyn AudioBackend>) -> Result<()> {
        if self.state.borrow().is_some() {
            return Err(ShellError::AlreadyInitialized("Audio"));
        }

        let mut sources = FxHashMap::default();
        let mut first_error = None;
        for (name, source) in &config.sources {
            match BufferCache::get_or_load(&source.url, backend.as_ref()) {
                Ok(buffer) => {
                    sources.insert(
                        name.clone(),
                        Source {
                            url: source.url.clone(),
                            duration: buffer.duration,
                            gain_db: source.volume.unwrap_or(0.0),
                        },
                    );
                }
                Err(err) => {
                    error!("failed to load sound \"{name}\": {err}");
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(db) = config.master_volume {
            backend.set_master_gain(db, 0.0);
        }
        debug!("audio initialized with {} sources", sources.len());

        *self.state.borrow_mut() = Some(EngineState {
            config,
            backend,
            sources,
        });

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Trigger the sound registered as `name`.
    pub fn play(&self, name: &str, options: PlayOptions) -> Result<Voice> {
        let state = self.state.borrow();
        let state = state.as_ref();
        let (backend, source) = state
            .and_then(|s| s.sources.get(name).map(|source| (&s.backend, source)))
            .ok_or_else(|| ShellError::MissingSound(name.to_string()))?;

        let semitones = clamp(options.transpose, -MAX_TRANSPOSE, MAX_TRANSPOSE);
        let voice = Voice {
            name: name.to_string(),
            play_type: options.play_type,
            time: backend.now() + options.delay,
            semitones,
            rate: semitone_to_rate(semitones),
            duration: options.duration.unwrap_or(source.duration),
            velocity: options.volume,
            gain_db: source.gain_db,
        };
        backend.trigger(&voice);
        Ok(voice)
    }

    /// A loaded source by name.
    #[must_use]
    pub fn source(&self, name: &str) -> Option<Source> {
        self.state.borrow().as_ref()?.sources.get(name).cloned()
    }

    /// Mute on blur, restore on focus.
    pub fn set_focused(&self, focused: bool) {
        if self.focused.replace(focused) == focused {
            return;
        }
        if let Some(state) = self.state.borrow().as_ref() {
            let db = if focused {
                state.config.master_volume.unwrap_or(0.0)
            } else {
                f64::NEG_INFINITY
            };
            state.backend.set_master_gain(db, FOCUS_RAMP_SECONDS);
        }
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AudioEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("AudioEngine")
            .field("initialized", &state.is_some())
            .field("sources", &state.as_ref().map_or(0, |s| s.sources.len()))
            .field("focused", &self.focused.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::backend::RecordingAudioBackend;

    fn engine() -> (AudioEngine, Rc<RecordingAudioBackend>) {
        let backend = Rc::new(
            RecordingAudioBackend::new()
                .with_buffer("sfx/click.mp3", 0.2)
                .with_buffer("sfx/swish.mp3", 0.8),
        );
        let config = AudioConfig::new()
            .with_source("click", "sfx/click.mp3", Some(-6.0))
            .with_source("swish", "sfx/swish.mp3", None);
        let engine = AudioEngine::new();
        engine.init(config, backend.clone()).unwrap();
        (engine, backend)
    }

    #[test]
    fn test_semitone_to_rate() {
        assert!((semitone_to_rate(0.0) - 1.0).abs() < 1e-12);
        assert!((semitone_to_rate(12.0) - 2.0).abs() < 1e-12);
        assert!((semitone_to_rate(-12.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_second_init_fails() {
        let (engine, backend) = engine();
        let err = engine.init(AudioConfig::new(), backend).unwrap_err();
        assert_eq!(err, ShellError::AlreadyInitialized("Audio"));
        assert_eq!(err.to_string(), "Audio already initialized!");
    }

    #[test]
    fn test_play_defaults_and_clamps() {
        let (engine, backend) = engine();
        backend.set_time(3.0);

        let voice = engine
            .play("click", PlayOptions::new().with_transpose(60.0).with_delay(0.5))
            .unwrap();

        assert_eq!(voice.semitones, 48.0);
        assert!((voice.rate - 16.0).abs() < 1e-9);
        assert_eq!(voice.time, 3.5);
        assert_eq!(voice.duration, 0.2);
        assert_eq!(voice.gain_db, -6.0);
        assert_eq!(backend.voices().len(), 1);
    }

    #[test]
    fn test_unknown_sound() {
        let (engine, _) = engine();
        let err = engine.play("boom", PlayOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Can't find sound with name \"boom\"");

        let empty = AudioEngine::new();
        assert!(empty.play("click", PlayOptions::default()).is_err());
    }

    #[test]
    fn test_failed_source_is_skipped() {
        let backend = Rc::new(RecordingAudioBackend::new().with_buffer("ok.mp3", 1.0));
        let config = AudioConfig::new()
            .with_source("ok", "ok.mp3", None)
            .with_source("bad", "bad.mp3", None);
        let engine = AudioEngine::new();

        assert!(engine.init(config, backend).is_err());
        assert!(engine.is_initialized());
        assert!(engine.source("ok").is_some());
        assert!(engine.source("bad").is_none());
    }

    #[test]
    fn test_focus_ramps_master_gain() {
        let (engine, backend) = engine();

        engine.set_focused(false);
        engine.set_focused(false);
        engine.set_focused(true);

        let gains = backend.gains();
        assert_eq!(gains.len(), 2);
        assert!(gains[0].is_infinite() && gains[0] < 0.0);
        assert_eq!(gains[1], 0.0);
    }

    #[test]
    fn test_config_from_manifest_json() {
        let json = r#"{
            "masterVolume": -3,
            "sources": {
                "click": { "url": "sfx/click.mp3", "volume": -6 },
                "swish": { "url": "sfx/swish.mp3" }
            }
        }"#;
        let config = AudioConfig::from_json(json).unwrap();
        assert_eq!(config.master_volume, Some(-3.0));
        assert_eq!(config.sources["click"].volume, Some(-6.0));
        assert_eq!(config.sources["swish"].volume, None);
    }
}
