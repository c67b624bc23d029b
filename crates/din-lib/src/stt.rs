//! Speech-to-text — voice-activity capture plus a Whisper-compatible
//! transcription client.
//!
//! The session loop only ever sees the [`Transcriber`] trait:
//! `listen(timeout, phrase_limit)` returns `Ok(Some(text))` for a usable
//! lower-cased utterance, `Ok(None)` when nothing intelligible was said
//! within the timeout, and `Err` when the backend itself failed. All three
//! are routine outcomes for the loop.

use std::time::{Duration, Instant};

use tracing::debug;

use din_core::types::ListenConfig;
use din_core::wav::{SAMPLE_RATE, encode_wav, rms_level};

use crate::capture::Microphone;

// VAD constants
const MIN_SPEECH_MS: u64 = 180;
const TRAILING_SILENCE_MS: u64 = 700;
const CHUNK_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Floor for the adaptive silence threshold; quiet rooms calibrate lower
/// than the mic noise floor and would otherwise trigger on nothing.
const MIN_SILENCE_THRESHOLD: f32 = 0.004;

/// Headroom applied to the calibrated ambient level.
const AMBIENT_MARGIN: f32 = 2.5;

/// One bounded attempt to hear something.
pub trait Transcriber {
    /// Wait up to `timeout` for speech to start, then capture at most
    /// `phrase_limit` of it and transcribe.
    fn listen(
        &mut self,
        timeout: Duration,
        phrase_limit: Duration,
    ) -> impl Future<Output = Result<Option<String>, String>>;
}

/// Microphone + local Whisper-compatible server.
pub struct WhisperTranscriber {
    config: ListenConfig,
    client: reqwest::Client,
    silence_threshold: f32,
}

impl WhisperTranscriber {
    pub fn new(config: ListenConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            silence_threshold: MIN_SILENCE_THRESHOLD,
        }
    }

    /// Measure ambient noise for ~2 s and derive the VAD threshold from it.
    pub async fn calibrate(&mut self) -> Result<f32, String> {
        let mut mic = Microphone::open()?;
        let ambient = mic.ambient_level(Duration::from_secs(2)).await?;
        self.silence_threshold = (ambient * AMBIENT_MARGIN).max(MIN_SILENCE_THRESHOLD);
        debug!(ambient, threshold = self.silence_threshold, "microphone calibrated");
        Ok(self.silence_threshold)
    }

    /// Capture one utterance: wait for onset, then record until the speaker
    /// trails off or `phrase_limit` elapses. `None` = no speech in time.
    async fn capture_utterance(
        &self,
        timeout: Duration,
        phrase_limit: Duration,
    ) -> Result<Option<Vec<i16>>, String> {
        let mut mic = Microphone::open()?;
        let mut utterance: Vec<i16> = Vec::new();

        let started = Instant::now();
        let mut speech_started: Option<Instant> = None;
        let mut silence_since: Option<Instant> = None;

        loop {
            let chunk =
                match tokio::time::timeout(CHUNK_READ_TIMEOUT, mic.read_chunk()).await {
                    Ok(Ok(chunk)) => chunk,
                    Ok(Err(e)) => {
                        // Stream died mid-utterance: transcribe what we have.
                        if utterance.is_empty() {
                            return Err(format!("audio capture error: {e}"));
                        }
                        break;
                    }
                    Err(_) => return Err("audio capture read timed out".into()),
                };

            let loud = rms_level(&chunk) > self.silence_threshold;

            match speech_started {
                None => {
                    if loud {
                        speech_started = Some(Instant::now());
                        utterance.extend_from_slice(&chunk);
                    } else if started.elapsed() >= timeout {
                        return Ok(None);
                    }
                }
                Some(onset) => {
                    utterance.extend_from_slice(&chunk);

                    if loud {
                        silence_since = None;
                    } else if onset.elapsed().as_millis() as u64 >= MIN_SPEECH_MS {
                        let since = *silence_since.get_or_insert_with(Instant::now);
                        if since.elapsed().as_millis() as u64 >= TRAILING_SILENCE_MS {
                            break;
                        }
                    }

                    if onset.elapsed() >= phrase_limit {
                        break;
                    }
                }
            }
        }

        Ok(Some(utterance))
    }

    /// Send a WAV clip to the transcription server, return the raw text.
    async fn transcribe(&self, wav: &[u8]) -> Result<String, String> {
        let part = reqwest::multipart::Part::bytes(wav.to_vec())
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| format!("mime error: {e}"))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("language", "en")
            .text("response_format", "json");

        let resp = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.config.whisper_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("transcription request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("transcription failed ({status}): {body}"));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| format!("response read error: {e}"))?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| format!("invalid JSON: {e}; raw={body}"))?;

        let raw = value.get("text").and_then(|v| v.as_str()).unwrap_or("");
        Ok(raw.replace("[BLANK_AUDIO]", "").trim().to_string())
    }
}

impl Transcriber for WhisperTranscriber {
    async fn listen(
        &mut self,
        timeout: Duration,
        phrase_limit: Duration,
    ) -> Result<Option<String>, String> {
        let Some(utterance) = self.capture_utterance(timeout, phrase_limit).await? else {
            return Ok(None);
        };
        if utterance.is_empty() {
            return Ok(None);
        }

        let wav = encode_wav(&utterance, SAMPLE_RATE);
        let text = self.transcribe(&wav).await?;

        // Empty transcript = noise the model couldn't make words of.
        if text.is_empty() {
            debug!("utterance transcribed to nothing");
            return Ok(None);
        }

        // Downstream matching is all lowercase substrings.
        Ok(Some(text.to_lowercase()))
    }
}
