// SaberKit — Audio Cue Dispatcher
//
// Drives the audio backend through its load → play → unload lifecycle and
// owns the shared cue lock that debounces swing cues.
//
// The unload is scheduled on a timer started at trigger time, never chained
// onto the backend's completion signal: chaining load→play→unload
// back-to-back cuts playback off almost immediately because the backend's
// playback start is not guaranteed complete when load returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::{CUE_HOLD_MS, CUE_UNLOCK_MS};
use crate::drivers::audio::AudioBackend;
use crate::events::CueId;

// ---------------------------------------------------------------------------
// Cue Lock
// ---------------------------------------------------------------------------

/// Shared "audio channel busy" flag.
///
/// Engaged on every trigger; released by a per-trigger timer a fixed delay
/// later, regardless of backend completion. It is a single boolean, so when
/// triggers overlap the last timer to fire wins — a later cue's window can
/// be cut short by an earlier cue's timer. Known race, kept for behavioural
/// fidelity; only swing cues consult it.
#[derive(Clone, Default)]
pub struct CueLock(Arc<AtomicBool>);

impl CueLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn engage(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn release(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Called when a backend load/unload fails. Failures are reported and
/// contained here; they never reach the caller.
pub type ErrorHook = Arc<dyn Fn(CueId, &anyhow::Error) + Send + Sync>;

/// Cue lifecycle timing. Production values come from [`crate::config`];
/// tests inject shorter ones.
#[derive(Debug, Clone, Copy)]
pub struct CueTiming {
    /// Delay between a trigger and the scheduled unload of its cue.
    pub hold: Duration,
    /// Delay between a trigger and the release of the cue lock.
    pub unlock_after: Duration,
}

impl Default for CueTiming {
    fn default() -> Self {
        Self {
            hold: Duration::from_millis(CUE_HOLD_MS),
            unlock_after: Duration::from_millis(CUE_UNLOCK_MS),
        }
    }
}

pub struct CueDispatcher<B: AudioBackend> {
    backend: Arc<B>,
    lock: CueLock,
    timing: CueTiming,
    error_hook: ErrorHook,
}

impl<B: AudioBackend> CueDispatcher<B> {
    pub fn new(backend: B) -> Self {
        Self::with_timing(backend, CueTiming::default())
    }

    pub fn with_timing(backend: B, timing: CueTiming) -> Self {
        Self {
            backend: Arc::new(backend),
            lock: CueLock::new(),
            timing,
            error_hook: Arc::new(|cue, err| {
                log::warn!("cue {} failed: {err:#}", cue.as_str());
            }),
        }
    }

    /// Replace the default log-based error hook, e.g. to surface backend
    /// failures to a host application.
    pub fn set_error_hook(&mut self, hook: ErrorHook) {
        self.error_hook = hook;
    }

    /// Handle to the shared cue lock, for the classifier's swing debounce.
    pub fn lock(&self) -> CueLock {
        self.lock.clone()
    }

    /// Start playback of `cue`: engage the lock, load the cue (playback
    /// begins on load success), and schedule both the unload and the lock
    /// release on independent timers.
    ///
    /// Never blocks beyond the backend's load call and never fails: backend
    /// errors go through the error hook, and the lock release timer runs
    /// unconditionally so a failed load cannot wedge the lock.
    pub fn trigger(&self, cue: CueId) {
        self.lock.engage();

        // Per-trigger release timer; never cancelled, even on load failure.
        let lock = self.lock.clone();
        let unlock_after = self.timing.unlock_after;
        thread::spawn(move || {
            thread::sleep(unlock_after);
            lock.release();
        });

        let backend = Arc::clone(&self.backend);
        let hook = Arc::clone(&self.error_hook);
        let hold = self.timing.hold;
        thread::spawn(move || match backend.load(cue) {
            Ok(handle) => {
                log::debug!("cue {} playing", cue.as_str());
                thread::sleep(hold);
                if let Err(err) = backend.unload(handle) {
                    hook(cue, &err);
                }
            }
            Err(err) => hook(cue, &err),
        });
    }
}
