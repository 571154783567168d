//! Sound playback by name.
//!
//! [`AudioEngine`] loads a manifest of named sources once, then triggers
//! them with per-call pitch, delay and volume. Decoding and synthesis live
//! behind [`AudioBackend`]; decoded buffers are shared through
//! [`BufferCache`].

mod backend;
mod cache;
mod engine;

pub use backend::{AudioBackend, AudioBuffer, PlayType, RecordingAudioBackend, Voice};
pub use cache::BufferCache;
pub use engine::{
    semitone_to_rate, AudioConfig, AudioEngine, PlayOptions, Source, SourceConfig, MAX_TRANSPOSE,
};
