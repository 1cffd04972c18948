// SaberKit — Audio Backend Drivers
//
// The dispatcher only sees the `AudioBackend` trait. `NullAudio` is the
// always-available logging stub; the real rodio-backed output lives behind
// the `playback` feature so the engine builds without system audio headers.

use crate::events::CueId;

/// Asynchronous cue playback resource.
///
/// `load` decodes the cue and begins playback immediately on success,
/// returning a handle for the running instance. `unload` releases that
/// instance's resources. Handles are per-call: overlapping loads are safe,
/// but a handle must only be unloaded once.
pub trait AudioBackend: Send + Sync + 'static {
    type Handle: Send + 'static;

    fn load(&self, cue: CueId) -> anyhow::Result<Self::Handle>;

    fn unload(&self, handle: Self::Handle) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// Stub backend — development and tests without an audio device
// ---------------------------------------------------------------------------

/// Logs the cue lifecycle instead of playing audio.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioBackend for NullAudio {
    type Handle = CueId;

    fn load(&self, cue: CueId) -> anyhow::Result<Self::Handle> {
        log::info!("[null-audio] play {}", cue.as_str());
        Ok(cue)
    }

    fn unload(&self, cue: Self::Handle) -> anyhow::Result<()> {
        log::debug!("[null-audio] unload {}", cue.as_str());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rodio backend — real playback (feature `playback`)
// ---------------------------------------------------------------------------
#[cfg(feature = "playback")]
pub use self::rodio_backend::RodioAudio;

#[cfg(feature = "playback")]
mod rodio_backend {
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};

    use anyhow::Context;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::AudioBackend;
    use crate::events::CueId;

    const AUDIO_EXTENSIONS: [&str; 3] = ["wav", "mp3", "ogg"];

    /// Plays cues from audio files named after the cue ids
    /// (`saber_on.wav`, `saber_off.mp3`, …) in one asset directory.
    pub struct RodioAudio {
        handle: OutputStreamHandle,
        assets: HashMap<CueId, PathBuf>,
    }

    impl RodioAudio {
        /// Open the default output device and resolve all four cue assets.
        ///
        /// The returned `OutputStream` must be kept alive for as long as
        /// cues play; dropping it silences everything.
        pub fn new(asset_dir: impl AsRef<Path>) -> anyhow::Result<(Self, OutputStream)> {
            let asset_dir = asset_dir.as_ref();
            let mut assets = HashMap::new();
            for cue in CueId::ALL {
                assets.insert(cue, resolve_asset(asset_dir, cue)?);
            }

            let (stream, handle) =
                OutputStream::try_default().context("no audio output device")?;
            log::info!("rodio backend ready ({} cues)", assets.len());
            Ok((Self { handle, assets }, stream))
        }
    }

    fn resolve_asset(dir: &Path, cue: CueId) -> anyhow::Result<PathBuf> {
        for ext in AUDIO_EXTENSIONS {
            let candidate = dir.join(format!("{}.{ext}", cue.as_str()));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        anyhow::bail!(
            "missing asset for cue {} in {}",
            cue.as_str(),
            dir.display()
        )
    }

    impl AudioBackend for RodioAudio {
        type Handle = Sink;

        fn load(&self, cue: CueId) -> anyhow::Result<Self::Handle> {
            // The constructor resolved every cue id, so this cannot miss.
            let path = &self.assets[&cue];
            let file = File::open(path)
                .with_context(|| format!("open {}", path.display()))?;
            let source = Decoder::new(BufReader::new(file))
                .with_context(|| format!("decode {}", path.display()))?;

            let sink = Sink::try_new(&self.handle).context("open playback sink")?;
            sink.append(source);
            Ok(sink)
        }

        fn unload(&self, sink: Self::Handle) -> anyhow::Result<()> {
            sink.stop();
            Ok(())
        }
    }
}
