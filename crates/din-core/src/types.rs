//! Shared types for the din voice relay controller.
//!
//! These types are used across din-lib and din-cli. Keeping them in
//! din-core means consumers can depend on the command model without
//! pulling in tokio, cpal, or other heavy deps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lowest addressable relay index.
pub const RELAY_MIN: u8 = 1;
/// Highest addressable relay index.
pub const RELAY_MAX: u8 = 4;

// ─── Command model ─────────────────────────────────────────────────────────

/// A fully interpreted voice command.
///
/// Produced by the command table or the fuzzy matcher, consumed by the
/// executor. Exactly one variant; the matchers only ever construct `Relay`
/// with an index in `RELAY_MIN..=RELAY_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Action {
    /// Switch a single relay on or off.
    Relay { relay: u8, state: bool },
    /// Switch every relay on or off with one device-side call.
    All { state: bool },
    /// Ask the device which relays are on.
    Status,
    /// Describe what the controller can do.
    Help,
}

/// Relay states reported by the device, `relay1..relayN` → on/off.
///
/// N is whatever the device answers with; nothing here assumes four.
pub type DeviceStatus = BTreeMap<String, bool>;

// ─── Configuration ─────────────────────────────────────────────────────────

/// Where the relay device lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.1.100".into(),
            timeout_secs: 5,
        }
    }
}

/// Transcription backend settings.
#[derive(Debug, Clone)]
pub struct ListenConfig {
    /// Whisper-compatible transcription server.
    pub whisper_url: String,
    pub model: String,
    /// How long to wait for speech to start before giving up the cycle.
    pub timeout_secs: u64,
    /// Hard cap on a single utterance.
    pub phrase_limit_secs: u64,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            whisper_url: "http://localhost:2022".into(),
            model: "base".into(),
            timeout_secs: 5,
            phrase_limit_secs: 5,
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// OpenAI-speech-compatible synthesis server.
    pub tts_url: String,
    pub voice: String,
    pub speed: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            tts_url: "http://localhost:8880".into(),
            voice: "af_heart".into(),
            speed: 1.0,
        }
    }
}
