// Error taxonomy for the frontend
//
// Boot failures are fatal and halt the process. Save/load/reset requests are
// explicitly unsupported. A slow emulation step is never an error: it only
// shows up as a larger elapsed time.

use std::fmt;
use thiserror::Error;

/// Startup stage that failed during boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    /// Display memory (screen, sub screen, Z-buffers)
    DisplayMemory,
    /// Emulation core memory map
    Memory,
    /// Audio processing unit
    Apu,
    /// Sound mixer
    Sound,
    /// Graphics renderer
    Graphics,
    /// ROM image
    RomLoad,
    /// Host platform (window, audio device)
    Platform,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitStage::DisplayMemory => "Display",
            InitStage::Memory => "Memory",
            InitStage::Apu => "APU",
            InitStage::Sound => "Sound",
            InitStage::Graphics => "Graphics",
            InitStage::RomLoad => "ROM loading",
            InitStage::Platform => "Platform",
        };
        f.write_str(name)
    }
}

/// Operation a platform may request that this frontend does not implement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Serialize the running game to a file
    SaveState,
    /// Restore the running game from a file
    LoadState,
    /// Soft or hard reset of the emulated console
    Reset,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SaveState => "save state",
            Operation::LoadState => "load state",
            Operation::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the frontend
#[derive(Debug, Error)]
pub enum FrontendError {
    /// A subsystem failed during startup; the process cannot continue
    #[error("{stage} init failed: {reason}")]
    FatalInit { stage: InitStage, reason: String },

    /// The requested operation is a known gap, nothing was done
    #[error("{0} is not supported")]
    Unsupported(Operation),

    /// `step` was called before `boot` succeeded or after quit
    #[error("scheduler is not running")]
    NotRunning,

    /// `boot` was called a second time
    #[error("scheduler already booted")]
    AlreadyBooted,
}

impl FrontendError {
    /// Shorthand for a fatal boot error
    pub fn fatal(stage: InitStage, reason: impl Into<String>) -> Self {
        FrontendError::FatalInit {
            stage,
            reason: reason.into(),
        }
    }

    /// True for errors that must halt the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, FrontendError::FatalInit { .. })
    }
}
