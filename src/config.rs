// SaberKit — Tuning & Timing Configuration

// ---------------------------------------------------------------------------
// Motion Classification Thresholds
// ---------------------------------------------------------------------------

/// Magnitude (in g) above which a sample counts as a swing candidate.
pub const SWING_THRESHOLD_G: f32 = 1.5;

/// Assumed duration of one swing, in milliseconds. The crash test divides
/// the magnitude drop by this window to get a per-millisecond rate. It is a
/// fixed calibration constant, not a measured inter-sample interval.
pub const SWING_WINDOW_MS: f32 = 200.0;

/// Per-millisecond magnitude drop below which a crash is detected
/// (strict `<` comparison — a drop of exactly this rate does not trigger).
pub const CRASH_DELTA_THRESHOLD: f32 = -0.015;

// ---------------------------------------------------------------------------
// Tilt Gate (rounded y-axis reading required to toggle the saber)
// ---------------------------------------------------------------------------
pub const OPEN_TILT_Y: f32 = -1.0; // hilt pointing up
pub const CLOSE_TILT_Y: f32 = 1.0; // hilt pointing down

// ---------------------------------------------------------------------------
// Audio Cue Timing (milliseconds)
// ---------------------------------------------------------------------------

/// How long a cue is held loaded before its scheduled unload fires.
pub const CUE_HOLD_MS: u64 = 1000;

/// How long the shared cue lock stays engaged after any trigger.
pub const CUE_UNLOCK_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// Task Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const SAMPLE_INTERVAL_MS: u64 = 16; // ~62.5 Hz, typical phone rate
pub const MOTION_POLL_INTERVAL_MS: u64 = 4; // motion task drain cadence
