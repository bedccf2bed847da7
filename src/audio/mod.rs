// Audio module - Mixing core samples for the platform audio device
//
// This module provides:
// - Interleaved stereo samples
// - A fixed-size per-frame mix pipeline with silence padding
// - Switchable direct / low-pass mixing
// - The port through which the emulation core produces samples

pub mod mixer;
pub mod pipeline;

pub use mixer::{Mixer, LOWPASS_RANGE};
pub use pipeline::{AudioMixPipeline, AudioPort, AudioStats};

use serde::{Deserialize, Serialize};

/// Default output rate of the handheld audio device
pub const AUDIO_SAMPLE_RATE: u32 = 22050;

/// One interleaved stereo sample pair
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StereoSample {
    /// Left channel
    pub left: i16,
    /// Right channel
    pub right: i16,
}

impl StereoSample {
    /// Digital silence
    pub const SILENCE: StereoSample = StereoSample { left: 0, right: 0 };

    /// Create a sample pair
    pub const fn new(left: i16, right: i16) -> Self {
        Self { left, right }
    }

    /// Same value on both channels
    pub const fn mono(value: i16) -> Self {
        Self {
            left: value,
            right: value,
        }
    }
}

/// How mixed audio reaches the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioMode {
    /// The loop flushes and submits exactly one frame of audio per iteration
    #[default]
    PerFrame,

    /// The core signals when samples are ready and they are submitted inline
    OnDemand,
}
