// SaberKit — Headless Demo
//
// Replays a scripted duel through the full engine:
//   1. Rest tilted up (hilt raised), tap → saber on.
//   2. A couple of swings, then a dead stop → crash.
//   3. Rest tilted down, tap → saber off.
//
// Cues go to the logging stub backend by default; build with
// `--features playback` and point SABERKIT_ASSETS at a directory holding
// saber_on/saber_off/saber_swing/saber_crash audio files for real sound.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use saberkit::config::SAMPLE_INTERVAL_MS;
use saberkit::{Saber, SaberEvent, Sample, ScriptedSource};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("saberkit demo starting");

    let interval = Duration::from_millis(SAMPLE_INTERVAL_MS);
    let source = ScriptedSource::new(demo_script(), interval);

    let (event_tx, event_rx) = mpsc::channel();

    #[cfg(not(feature = "playback"))]
    let saber = Saber::start(&source, saberkit::NullAudio, event_tx)?;

    #[cfg(feature = "playback")]
    let (saber, _stream) = {
        let asset_dir =
            std::env::var("SABERKIT_ASSETS").unwrap_or_else(|_| "assets/sounds".into());
        let (backend, stream) = saberkit::RodioAudio::new(&asset_dir)?;
        (Saber::start(&source, backend, event_tx)?, stream)
    };

    // Presentation stand-in: tap while tilted up, later tap while tilted
    // down, and log everything the engine reports in between.
    thread::sleep(Duration::from_millis(200));
    log::info!("[ui] {} pressed", saber.toggle_label());
    saber.tap();

    let session = Duration::from_secs(4);
    let deadline = std::time::Instant::now() + session;
    let mut closed_again = false;
    while std::time::Instant::now() < deadline {
        match event_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                log::info!("[event] {event:?} → cue {}", event.cue().as_str());
                if event == SaberEvent::Crash && !closed_again {
                    // Give the tail of the script time to settle tilt-down.
                    thread::sleep(Duration::from_millis(500));
                    log::info!("[ui] {} pressed", saber.toggle_label());
                    saber.tap();
                    closed_again = true;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    log::info!("saberkit demo shutting down ({:?})", saber.state());
    saber.shutdown();
    Ok(())
}

/// Tilt up and rest, two swings with a crash, then tilt down and rest.
fn demo_script() -> Vec<Sample> {
    let mut script = Vec::new();

    // Hilt raised, at rest (~1 g straight down the y axis). Long enough
    // that the saber_on cue's lock window expires before the first swing.
    script.extend(std::iter::repeat(Sample::new(0.0, -1.0, 0.1)).take(80));

    // First swing: ramp up past the threshold, then ease off.
    script.extend([
        Sample::new(0.4, -0.9, 0.8),
        Sample::new(0.9, -0.5, 1.6),
        Sample::new(1.2, 0.1, 1.9),
        Sample::new(0.7, 0.3, 1.0),
    ]);
    script.extend(std::iter::repeat(Sample::new(0.1, -0.3, 0.9)).take(70));

    // Second swing ending in a dead stop — the crash.
    script.extend([
        Sample::new(1.5, 0.2, 2.1),
        Sample::new(2.4, 0.5, 3.1),
        Sample::new(0.05, 0.02, 0.05),
    ]);
    script.extend(std::iter::repeat(Sample::new(0.0, 0.2, 0.9)).take(20));

    // Hilt lowered, at rest.
    script.push(Sample::new(0.0, 1.0, 0.1));
    script
}
