// SaberKit — Motion Classifier
//
// Turns the raw accelerometer stream into semantic saber events. Holds only
// the latest sample and the reference sample captured at the last qualifying
// swing — no history buffer.
//
// Known limitation: readings hovering around the swing threshold can miss or
// duplicate swings/crashes. That nondeterminism comes from the sensor and is
// accepted, not filtered.

use crate::config::*;
use crate::events::{SaberEvent, SaberState, Sample};

/// Events produced by one classification tick. A single sample can yield
/// both a swing and a crash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub swing: bool,
    pub crash: bool,
}

pub struct MotionClassifier {
    state: SaberState,
    latest: Sample,
    /// Sample captured at the most recent qualifying swing; baseline for
    /// crash detection. Cleared when a crash fires.
    swing_ref: Option<Sample>,
}

impl MotionClassifier {
    pub fn new() -> Self {
        Self {
            state: SaberState::Closed,
            latest: Sample::default(),
            swing_ref: None,
        }
    }

    pub fn state(&self) -> SaberState {
        self.state
    }

    pub fn latest(&self) -> Sample {
        self.latest
    }

    /// Process one incoming sample.
    ///
    /// The swing test runs first and refreshes the swing reference on any
    /// sample above [`SWING_THRESHOLD_G`] (even while `cue_locked` suppresses
    /// the event). The crash test then compares against the reference value
    /// as it was at the *start* of the tick, and on a crash clears the
    /// reference — including one refreshed on this very tick.
    pub fn feed(&mut self, sample: Sample, cue_locked: bool) -> TickOutcome {
        self.latest = sample;

        let mut out = TickOutcome::default();
        if self.state != SaberState::Open {
            // Closed saber: no events, no reference mutation.
            return out;
        }

        let mag_now = sample.magnitude();
        let pre_tick_ref = self.swing_ref;

        if mag_now > SWING_THRESHOLD_G {
            if !cue_locked {
                out.swing = true;
            }
            self.swing_ref = Some(sample);
        }

        if let Some(reference) = pre_tick_ref {
            let delta = (mag_now - reference.magnitude()) / SWING_WINDOW_MS;
            if delta < CRASH_DELTA_THRESHOLD {
                out.crash = true;
                self.swing_ref = None;
            }
        }

        out
    }

    /// Handle a tap on the toggle control.
    ///
    /// Gated on the latest sample's y-axis rounded to the nearest integer:
    /// opening requires -1 (hilt up), closing requires +1 (hilt down). Any
    /// other tilt is a silent no-op. The returned event is chosen from the
    /// state *before* the transition.
    pub fn request_toggle(&mut self) -> Option<SaberEvent> {
        let tilt = self.latest.y.round();
        match self.state {
            SaberState::Closed if tilt == OPEN_TILT_Y => {
                self.state = SaberState::Open;
                Some(SaberEvent::Open)
            }
            SaberState::Open if tilt == CLOSE_TILT_Y => {
                // The swing reference deliberately survives a close/reopen
                // cycle; only a crash clears it.
                self.state = SaberState::Closed;
                Some(SaberEvent::Close)
            }
            _ => None,
        }
    }

    #[cfg(test)]
    fn swing_ref(&self) -> Option<Sample> {
        self.swing_ref
    }
}

impl Default for MotionClassifier {
    fn default() -> Self {
        Self::new()
    }
}
