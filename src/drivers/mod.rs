// SaberKit — External Interface Drivers

pub mod audio;
pub mod sampler;
