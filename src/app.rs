// SaberKit — Engine Wiring
//
// `Saber` owns the whole pipeline: it subscribes the sample source, spawns
// the motion task, and hands the host a small control surface (tap, state,
// shutdown). Teardown unsubscribes the source exactly once and joins the
// worker, in that order — the worker exits when the sample channel drains
// and disconnects.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use crate::dispatcher::CueDispatcher;
use crate::drivers::audio::AudioBackend;
use crate::drivers::sampler::{SampleSource, Subscription};
use crate::events::{ControlRequest, SaberEvent, SaberState};
use crate::tasks::motion::{motion_task, SaberStateHandle};

pub struct Saber {
    control_tx: Sender<ControlRequest>,
    state: SaberStateHandle,
    subscription: Option<Subscription>,
    worker: Option<JoinHandle<()>>,
}

impl Saber {
    /// Wire up and start the engine with default cue timing.
    ///
    /// Semantic events (open/close/swing/crash) are mirrored into
    /// `event_tx` for the host; dropping the receiver is harmless.
    pub fn start<B: AudioBackend>(
        source: &dyn SampleSource,
        backend: B,
        event_tx: Sender<SaberEvent>,
    ) -> anyhow::Result<Self> {
        Self::start_with(source, CueDispatcher::new(backend), event_tx)
    }

    /// Start with a pre-built dispatcher (custom timing or error hook).
    pub fn start_with<B: AudioBackend>(
        source: &dyn SampleSource,
        dispatcher: CueDispatcher<B>,
        event_tx: Sender<SaberEvent>,
    ) -> anyhow::Result<Self> {
        let (sample_tx, sample_rx) = mpsc::channel();
        let (control_tx, control_rx) = mpsc::channel();
        let state = SaberStateHandle::default();
        let state_handle = state.clone();

        let worker = thread::Builder::new().name("motion".into()).spawn(move || {
            motion_task(sample_rx, control_rx, dispatcher, event_tx, state_handle);
        })?;

        // Subscribe last: on failure `sample_tx` drops here, the sample
        // channel disconnects, and the worker exits on its own.
        let subscription = match source.subscribe(sample_tx) {
            Ok(sub) => sub,
            Err(err) => {
                log::error!("sample source subscribe failed: {err:#}");
                let _ = worker.join();
                return Err(err);
            }
        };

        log::info!("saber engine started");
        Ok(Self {
            control_tx,
            state,
            subscription: Some(subscription),
            worker: Some(worker),
        })
    }

    /// Forward a tap on the toggle control. Whether it takes effect is up
    /// to the tilt gate in the motion task.
    pub fn tap(&self) {
        if self.control_tx.send(ControlRequest::Toggle).is_err() {
            log::warn!("tap dropped — motion task has exited");
        }
    }

    pub fn state(&self) -> SaberState {
        self.state.state()
    }

    /// Label the toggle control should currently show.
    pub fn toggle_label(&self) -> &'static str {
        self.state.toggle_label()
    }

    /// Stop sample delivery, let the worker drain, and join it.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        // Dropping the subscription unsubscribes exactly once; the producer
        // then drops its sender and the worker exits.
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("motion task panicked");
            }
            log::info!("saber engine stopped");
        }
    }
}

impl Drop for Saber {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SWING_THRESHOLD_G;
    use crate::dispatcher::CueTiming;
    use crate::drivers::audio::NullAudio;
    use crate::drivers::sampler::ScriptedSource;
    use crate::events::Sample;
    use std::sync::mpsc::Sender;
    use std::time::Duration;

    /// Source whose subscribe always fails.
    struct BrokenSource;

    impl SampleSource for BrokenSource {
        fn subscribe(&self, _tx: Sender<Sample>) -> anyhow::Result<Subscription> {
            anyhow::bail!("sensor service unavailable")
        }
    }

    fn fast_dispatcher() -> CueDispatcher<NullAudio> {
        CueDispatcher::with_timing(
            NullAudio,
            CueTiming {
                hold: Duration::from_millis(10),
                unlock_after: Duration::from_millis(20),
            },
        )
    }

    #[test]
    fn scripted_session_opens_swings_crashes_and_closes() {
        // A long tilt-up rest (so the opening tap lands on a settled
        // orientation), then a swing followed by a dead stop, then a
        // repeating tilt-down tail for the closing tap.
        let mut script = vec![Sample::new(0.0, -1.0, 0.0); 40];
        script.push(Sample::new(0.0, 0.0, 4.0));
        script.push(Sample::new(0.0, 0.0, 0.0));
        script.push(Sample::new(0.0, 1.0, 0.0));
        let source = ScriptedSource::new(script, Duration::from_millis(5));

        let (event_tx, event_rx) = mpsc::channel();
        let saber = Saber::start_with(&source, fast_dispatcher(), event_tx).unwrap();
        assert_eq!(saber.state(), SaberState::Closed);
        assert_eq!(saber.toggle_label(), "Turn On");

        // Tap inside the tilt-up window, once samples have surely arrived.
        std::thread::sleep(Duration::from_millis(50));
        saber.tap();
        assert_eq!(
            event_rx.recv_timeout(Duration::from_secs(2)),
            Ok(SaberEvent::Open)
        );
        assert_eq!(
            event_rx.recv_timeout(Duration::from_secs(2)),
            Ok(SaberEvent::Swing)
        );
        assert_eq!(
            event_rx.recv_timeout(Duration::from_secs(2)),
            Ok(SaberEvent::Crash)
        );

        // By now the source holds the tilt-down tail.
        std::thread::sleep(Duration::from_millis(50));
        saber.tap();
        assert_eq!(
            event_rx.recv_timeout(Duration::from_secs(2)),
            Ok(SaberEvent::Close)
        );

        saber.shutdown();
    }

    #[test]
    fn tap_is_rejected_until_the_tilt_gate_is_met() {
        let source = ScriptedSource::new(
            vec![Sample::new(0.0, 0.3, 1.0)], // rounds to y = 0
            Duration::from_millis(5),
        );
        let (event_tx, event_rx) = mpsc::channel();
        let saber = Saber::start_with(&source, fast_dispatcher(), event_tx).unwrap();

        std::thread::sleep(Duration::from_millis(30));
        saber.tap();
        std::thread::sleep(Duration::from_millis(50));
        assert!(event_rx.try_recv().is_err());
        assert_eq!(saber.state(), SaberState::Closed);

        saber.shutdown();
    }

    #[test]
    fn quiet_stream_produces_no_events() {
        // Just below the swing threshold, repeated forever.
        let source = ScriptedSource::new(
            vec![Sample::new(0.0, 0.0, SWING_THRESHOLD_G)],
            Duration::from_millis(2),
        );
        let (event_tx, event_rx) = mpsc::channel();
        let saber = Saber::start_with(&source, fast_dispatcher(), event_tx).unwrap();

        std::thread::sleep(Duration::from_millis(100));
        assert!(event_rx.try_recv().is_err());
        saber.shutdown();
    }

    #[test]
    fn failed_subscribe_is_an_error_and_leaves_nothing_running() {
        let (event_tx, _event_rx) = mpsc::channel();
        let result = Saber::start_with(&BrokenSource, fast_dispatcher(), event_tx);
        assert!(result.is_err());
        // start() already joined its worker; nothing left to tear down.
    }

    #[test]
    fn dropping_the_saber_tears_down_cleanly() {
        let source =
            ScriptedSource::new(vec![Sample::new(0.0, 0.0, 1.0)], Duration::from_millis(2));
        let (event_tx, _event_rx) = mpsc::channel();
        let saber = Saber::start_with(&source, fast_dispatcher(), event_tx).unwrap();
        drop(saber); // must not hang or double-unsubscribe
    }
}
