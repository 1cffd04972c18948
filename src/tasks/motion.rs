// SaberKit — Motion Task
//
// The one worker loop of the engine. Drains the sample channel and the
// control-request channel at a short poll cadence, runs the classifier,
// fires audio cues through the dispatcher, and forwards semantic events to
// the presentation channel. Exits when the sample channel disconnects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::classifier::MotionClassifier;
use crate::config::MOTION_POLL_INTERVAL_MS;
use crate::dispatcher::CueDispatcher;
use crate::drivers::audio::AudioBackend;
use crate::events::{ControlRequest, SaberEvent, SaberState, Sample};

/// Shared mirror of the saber state, readable by the control surface
/// without touching the worker thread.
#[derive(Clone, Default)]
pub struct SaberStateHandle(Arc<AtomicBool>);

impl SaberStateHandle {
    pub fn state(&self) -> SaberState {
        if self.0.load(Ordering::SeqCst) {
            SaberState::Open
        } else {
            SaberState::Closed
        }
    }

    /// Current label for the toggle control.
    pub fn toggle_label(&self) -> &'static str {
        self.state().toggle_label()
    }

    fn set(&self, state: SaberState) {
        self.0.store(state == SaberState::Open, Ordering::SeqCst);
    }
}

pub fn motion_task<B: AudioBackend>(
    sample_rx: Receiver<Sample>,
    control_rx: Receiver<ControlRequest>,
    dispatcher: CueDispatcher<B>,
    event_tx: Sender<SaberEvent>,
    state_handle: SaberStateHandle,
) {
    log::info!("Motion task started");

    let mut classifier = MotionClassifier::new();
    let lock = dispatcher.lock();
    let poll_interval = Duration::from_millis(MOTION_POLL_INTERVAL_MS);

    loop {
        // 1. Drain pending samples in arrival order.
        loop {
            match sample_rx.try_recv() {
                Ok(sample) => {
                    let outcome = classifier.feed(sample, lock.is_locked());
                    // Swing first; a same-tick crash follows it.
                    if outcome.swing {
                        dispatcher.trigger(SaberEvent::Swing.cue());
                        let _ = event_tx.send(SaberEvent::Swing);
                    }
                    if outcome.crash {
                        dispatcher.trigger(SaberEvent::Crash.cue());
                        let _ = event_tx.send(SaberEvent::Crash);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::info!("Sample channel closed — exiting motion task");
                    return;
                }
            }
        }

        // 2. Drain pending control requests.
        while let Ok(request) = control_rx.try_recv() {
            match request {
                ControlRequest::Toggle => {
                    if let Some(event) = classifier.request_toggle() {
                        log::info!("saber {:?} (tilt gate passed)", classifier.state());
                        state_handle.set(classifier.state());
                        dispatcher.trigger(event.cue());
                        let _ = event_tx.send(event);
                    } else {
                        log::debug!("toggle ignored — tilt gate not met");
                    }
                }
            }
        }

        thread::sleep(poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::CueTiming;
    use crate::events::CueId;
    use std::sync::mpsc;
    use std::sync::Mutex;

    /// Backend that records which cues were started.
    #[derive(Default)]
    struct TriggerLog(Mutex<Vec<CueId>>);

    impl AudioBackend for Arc<TriggerLog> {
        type Handle = ();

        fn load(&self, cue: CueId) -> anyhow::Result<Self::Handle> {
            self.0.lock().unwrap().push(cue);
            Ok(())
        }

        fn unload(&self, _: Self::Handle) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct Rig {
        sample_tx: Sender<Sample>,
        control_tx: Sender<ControlRequest>,
        event_rx: Receiver<SaberEvent>,
        state: SaberStateHandle,
        triggers: Arc<TriggerLog>,
        worker: thread::JoinHandle<()>,
    }

    fn start_rig(timing: CueTiming) -> Rig {
        let (sample_tx, sample_rx) = mpsc::channel();
        let (control_tx, control_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let triggers = Arc::new(TriggerLog::default());
        let dispatcher = CueDispatcher::with_timing(Arc::clone(&triggers), timing);
        let state = SaberStateHandle::default();
        let handle = state.clone();

        let worker = thread::spawn(move || {
            motion_task(sample_rx, control_rx, dispatcher, event_tx, handle)
        });

        Rig {
            sample_tx,
            control_tx,
            event_rx,
            state,
            triggers,
            worker,
        }
    }

    fn recv(rig: &Rig) -> SaberEvent {
        rig.event_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("expected a saber event")
    }

    fn fast() -> CueTiming {
        CueTiming {
            hold: Duration::from_millis(10),
            unlock_after: Duration::from_millis(60),
        }
    }

    #[test]
    fn tap_opens_when_tilted_up_and_plays_saber_on_once() {
        let rig = start_rig(fast());

        rig.sample_tx.send(Sample::new(0.0, -1.2, 0.0)).unwrap();
        rig.control_tx.send(ControlRequest::Toggle).unwrap();

        assert_eq!(recv(&rig), SaberEvent::Open);
        assert_eq!(rig.state.state(), SaberState::Open);
        assert_eq!(rig.state.toggle_label(), "Turn Off");

        thread::sleep(Duration::from_millis(30));
        assert_eq!(rig.triggers.0.lock().unwrap().as_slice(), [CueId::SaberOn]);

        drop(rig.sample_tx);
        rig.worker.join().unwrap();
    }

    #[test]
    fn tap_is_ignored_when_flat() {
        let rig = start_rig(fast());

        rig.sample_tx.send(Sample::new(0.0, 0.4, 0.9)).unwrap();
        thread::sleep(Duration::from_millis(30));
        rig.control_tx.send(ControlRequest::Toggle).unwrap();
        thread::sleep(Duration::from_millis(30));

        assert_eq!(rig.state.state(), SaberState::Closed);
        assert!(rig.event_rx.try_recv().is_err());
        assert!(rig.triggers.0.lock().unwrap().is_empty());

        drop(rig.sample_tx);
        rig.worker.join().unwrap();
    }

    #[test]
    fn swing_is_debounced_by_the_cue_lock() {
        let rig = start_rig(fast());

        // Open first.
        rig.sample_tx.send(Sample::new(0.0, -1.0, 0.0)).unwrap();
        rig.control_tx.send(ControlRequest::Toggle).unwrap();
        assert_eq!(recv(&rig), SaberEvent::Open);

        // Wait out the lock window from the saber_on cue.
        thread::sleep(Duration::from_millis(100));

        // Two fast swings: the second arrives inside the first one's window.
        rig.sample_tx.send(Sample::new(0.0, 0.0, 1.8)).unwrap();
        assert_eq!(recv(&rig), SaberEvent::Swing);
        rig.sample_tx.send(Sample::new(0.0, 0.0, 1.9)).unwrap();
        thread::sleep(Duration::from_millis(30));
        assert!(rig.event_rx.try_recv().is_err(), "second swing is debounced");

        drop(rig.sample_tx);
        rig.worker.join().unwrap();
    }

    #[test]
    fn swing_then_hard_stop_plays_a_crash_even_while_locked() {
        let rig = start_rig(fast());

        rig.sample_tx.send(Sample::new(0.0, -1.0, 0.0)).unwrap();
        rig.control_tx.send(ControlRequest::Toggle).unwrap();
        assert_eq!(recv(&rig), SaberEvent::Open);
        thread::sleep(Duration::from_millis(100));

        // Swing at 4 g, then stop dead: (0 - 4) / 200 = -0.02.
        rig.sample_tx.send(Sample::new(0.0, 0.0, 4.0)).unwrap();
        assert_eq!(recv(&rig), SaberEvent::Swing);
        // The swing's lock window is still open; the crash bypasses it.
        rig.sample_tx.send(Sample::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(recv(&rig), SaberEvent::Crash);

        // Load calls run on spawned threads, so only membership is ordered.
        thread::sleep(Duration::from_millis(30));
        let cues = rig.triggers.0.lock().unwrap();
        assert_eq!(cues.len(), 3);
        for cue in [CueId::SaberOn, CueId::SaberSwing, CueId::SaberCrash] {
            assert!(cues.contains(&cue), "missing {}", cue.as_str());
        }
        drop(cues);

        drop(rig.sample_tx);
        rig.worker.join().unwrap();
    }

    #[test]
    fn worker_exits_when_the_sample_channel_closes() {
        let rig = start_rig(fast());
        drop(rig.sample_tx);
        rig.worker.join().unwrap();
    }
}
