// SaberKit — Sample Source Drivers
//
// The engine consumes orientation samples through the `SampleSource` trait:
// subscribe once at startup, receive samples on a channel at the platform
// rate, unsubscribe at teardown. `ScriptedSource` replays a canned motion
// sequence for the demo binary and for end-to-end tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::events::Sample;

/// Continuous orientation sample delivery.
pub trait SampleSource {
    /// Begin delivering samples into `tx` at the source's native rate.
    /// Delivery stops when the returned [`Subscription`] is dropped.
    fn subscribe(&self, tx: Sender<Sample>) -> anyhow::Result<Subscription>;
}

/// Active sample delivery, cancelled exactly once — either through
/// [`Subscription::unsubscribe`] or on drop.
pub struct Subscription {
    cancel: Arc<AtomicBool>,
}

impl Subscription {
    pub fn new(cancel: Arc<AtomicBool>) -> Self {
        Self { cancel }
    }

    /// Stop sample delivery. Equivalent to dropping the subscription.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Scripted source — canned sample sequence at a fixed tick rate
// ---------------------------------------------------------------------------

pub struct ScriptedSource {
    script: Vec<Sample>,
    interval: Duration,
    /// When the script runs out, keep repeating its last sample so the
    /// stream stays continuous (a phone lying still keeps reporting).
    hold_last: bool,
}

impl ScriptedSource {
    pub fn new(script: Vec<Sample>, interval: Duration) -> Self {
        Self {
            script,
            interval,
            hold_last: true,
        }
    }

    /// Stop after the last scripted sample instead of repeating it.
    pub fn finite(mut self) -> Self {
        self.hold_last = false;
        self
    }
}

impl SampleSource for ScriptedSource {
    fn subscribe(&self, tx: Sender<Sample>) -> anyhow::Result<Subscription> {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let script = self.script.clone();
        let interval = self.interval;
        let hold_last = self.hold_last;

        thread::Builder::new()
            .name("sampler".into())
            .spawn(move || {
                log::debug!("scripted source started ({} samples)", script.len());
                let mut ix = 0usize;

                loop {
                    let tick_start = Instant::now();

                    if worker_cancel.load(Ordering::SeqCst) {
                        log::debug!("scripted source unsubscribed");
                        return;
                    }

                    let sample = if ix < script.len() {
                        script[ix]
                    } else if hold_last {
                        match script.last() {
                            Some(&s) => s,
                            None => return,
                        }
                    } else {
                        return;
                    };
                    ix = ix.saturating_add(1);

                    if tx.send(sample).is_err() {
                        // Receiver dropped — engine has shut down.
                        log::debug!("sample channel closed — exiting sampler");
                        return;
                    }

                    // Sleep for the remainder of the tick to hold the rate.
                    let elapsed = tick_start.elapsed();
                    if elapsed < interval {
                        thread::sleep(interval - elapsed);
                    }
                }
            })?;

        Ok(Subscription::new(cancel))
    }
}
