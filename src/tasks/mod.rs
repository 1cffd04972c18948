// SaberKit — Worker Tasks

pub mod motion;
