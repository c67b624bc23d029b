//! din-lib — Voice relay control engine.
//!
//! Audio capture, STT transcription, spoken feedback, the device HTTP
//! client, and the listen-interpret-act session loop. Depends on din-core
//! for pure types, matching, and narration.

pub mod capture;
pub mod device;
pub mod executor;
pub mod session;
pub mod speech;
pub mod stt;

// Re-export din-core for convenience
pub use din_core;
