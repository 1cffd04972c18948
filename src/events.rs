// SaberKit — Shared Events & Data Types

// ---------------------------------------------------------------------------
// Orientation Sample (3-axis accelerometer reading, one unit ≈ 1 g)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the reading, in g.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Saber State
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaberState {
    #[default]
    Closed,
    Open,
}

impl SaberState {
    /// Label for the user-facing toggle control.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Self::Closed => "Turn On",
            Self::Open => "Turn Off",
        }
    }
}

// ---------------------------------------------------------------------------
// Semantic Events — produced by the classifier / tilt gate
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaberEvent {
    /// Saber turned on via a gated tap.
    Open,
    /// Saber turned off via a gated tap.
    Close,
    /// High-magnitude motion while open.
    Swing,
    /// Sudden deceleration following a swing.
    Crash,
}

impl SaberEvent {
    /// The audio cue this event plays.
    pub fn cue(&self) -> CueId {
        match self {
            Self::Open => CueId::SaberOn,
            Self::Close => CueId::SaberOff,
            Self::Swing => CueId::SaberSwing,
            Self::Crash => CueId::SaberCrash,
        }
    }
}

// ---------------------------------------------------------------------------
// Audio Cue Identifiers
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueId {
    SaberOn,
    SaberOff,
    SaberSwing,
    SaberCrash,
}

impl CueId {
    /// Every cue a backend must be able to play.
    pub const ALL: [CueId; 4] = [
        Self::SaberOn,
        Self::SaberOff,
        Self::SaberSwing,
        Self::SaberCrash,
    ];

    /// Asset/base name of the cue.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaberOn => "saber_on",
            Self::SaberOff => "saber_off",
            Self::SaberSwing => "saber_swing",
            Self::SaberCrash => "saber_crash",
        }
    }
}

// ---------------------------------------------------------------------------
// Control Requests — sent from the presentation layer to the motion task
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy)]
pub enum ControlRequest {
    /// The user pressed the toggle control. Subject to the tilt gate.
    Toggle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_is_euclidean_norm() {
        assert_eq!(Sample::new(0.0, 0.0, 2.0).magnitude(), 2.0);
        assert!((Sample::new(1.0, 2.0, 2.0).magnitude() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn events_map_to_their_cues() {
        assert_eq!(SaberEvent::Open.cue(), CueId::SaberOn);
        assert_eq!(SaberEvent::Close.cue(), CueId::SaberOff);
        assert_eq!(SaberEvent::Swing.cue(), CueId::SaberSwing);
        assert_eq!(SaberEvent::Crash.cue(), CueId::SaberCrash);
    }

    #[test]
    fn toggle_label_reflects_state() {
        assert_eq!(SaberState::Closed.toggle_label(), "Turn On");
        assert_eq!(SaberState::Open.toggle_label(), "Turn Off");
    }
}
