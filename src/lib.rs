// SaberKit — Motion-Driven Lightsaber Toy Engine
//
// Interprets a continuous 3-axis accelerometer stream to drive a virtual
// lightsaber: tilt-gated on/off toggling, plus swing and crash sound cues
// classified from motion dynamics. The pipeline is one-directional:
//
//   sample source → motion classifier → cue dispatcher → audio backend
//
// with the presentation layer injecting gated toggle requests alongside the
// classifier-driven events. Everything runs on plain threads and mpsc
// channels; the only shared mutable flags are the cue lock and the saber
// state mirror.

pub mod app;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod drivers;
pub mod events;
pub mod tasks;

pub use app::Saber;
pub use classifier::MotionClassifier;
pub use dispatcher::{CueDispatcher, CueLock, CueTiming};
pub use drivers::audio::{AudioBackend, NullAudio};
pub use drivers::sampler::{SampleSource, ScriptedSource, Subscription};
pub use events::{ControlRequest, CueId, SaberEvent, SaberState, Sample};

#[cfg(feature = "playback")]
pub use drivers::audio::RodioAudio;
