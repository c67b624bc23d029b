//! Spoken feedback — console echo plus blocking speech synthesis.
//!
//! Every narration goes through [`Feedback::say`], which prints the line
//! and then blocks until playback finishes, so utterances never overlap.
//! Synthesis failures degrade to console-only: the line was already
//! printed, a warning is logged, and the session keeps running — a dead
//! speaker must not kill the assistant.

use std::io::Cursor;

use rodio::{Decoder, OutputStream, Sink};
use tokio::sync::oneshot;
use tracing::warn;

use din_core::types::SpeechConfig;

/// Narration sink used by the executor and the session loop.
pub trait Feedback {
    /// Echo `text` to the console and speak it, returning once speech has
    /// finished (or immediately when there is nothing to play it with).
    fn say(&mut self, text: &str) -> impl Future<Output = ()>;
}

// ─── Console-only feedback ─────────────────────────────────────────────────

/// Print-only feedback for `--text-only` runs and environments without an
/// output device.
#[derive(Debug, Default)]
pub struct Console;

impl Feedback for Console {
    async fn say(&mut self, text: &str) {
        println!("din: {text}");
    }
}

// ─── Synthesized speech ────────────────────────────────────────────────────

struct PlayJob {
    wav: Vec<u8>,
    done: oneshot::Sender<()>,
}

/// HTTP synthesis + rodio playback.
///
/// Playback runs on a dedicated OS thread (`rodio::OutputStream` is !Send);
/// `say` ships it a WAV clip and awaits the completion signal, which is
/// what serializes spoken output.
pub struct Speaker {
    config: SpeechConfig,
    client: reqwest::Client,
    jobs: std::sync::mpsc::Sender<PlayJob>,
}

impl Speaker {
    pub fn new(config: SpeechConfig) -> Self {
        let (jobs, job_rx) = std::sync::mpsc::channel::<PlayJob>();

        std::thread::Builder::new()
            .name("din-playback".into())
            .spawn(move || playback_thread(job_rx))
            .expect("failed to spawn playback thread");

        Self {
            config,
            client: reqwest::Client::new(),
            jobs,
        }
    }

    /// Fetch a WAV clip for `text` from the synthesis server.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, String> {
        let resp = self
            .client
            .post(format!("{}/v1/audio/speech", self.config.tts_url))
            .json(&serde_json::json!({
                "model": "kokoro",
                "input": text,
                "voice": self.config.voice,
                "speed": self.config.speed,
                "response_format": "wav",
            }))
            .send()
            .await
            .map_err(|e| format!("synthesis request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("synthesis failed ({status})"));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| format!("synthesis body read error: {e}"))?;
        Ok(bytes.to_vec())
    }
}

impl Feedback for Speaker {
    async fn say(&mut self, text: &str) {
        println!("din: {text}");

        let wav = match self.synthesize(text).await {
            Ok(wav) => wav,
            Err(e) => {
                warn!("speech degraded to console only: {e}");
                return;
            }
        };

        let (done, finished) = oneshot::channel();
        if self.jobs.send(PlayJob { wav, done }).is_err() {
            warn!("playback thread gone; speech degraded to console only");
            return;
        }
        // Sender dropped without signalling means playback failed; either
        // way the utterance is over.
        let _ = finished.await;
    }
}

/// Owns the audio output for the life of the process and plays clips
/// strictly one at a time.
fn playback_thread(jobs: std::sync::mpsc::Receiver<PlayJob>) {
    let output = match OutputStream::try_default() {
        Ok(pair) => Some(pair),
        Err(e) => {
            warn!("no audio output, running console-only: {e}");
            None
        }
    };

    while let Ok(job) = jobs.recv() {
        if let Some((_stream, handle)) = output.as_ref() {
            match Sink::try_new(handle) {
                Ok(sink) => match Decoder::new(Cursor::new(job.wav)) {
                    Ok(source) => {
                        sink.append(source);
                        sink.sleep_until_end();
                    }
                    Err(e) => warn!("undecodable synthesis clip: {e}"),
                },
                Err(e) => warn!("failed to open playback sink: {e}"),
            }
        }
        let _ = job.done.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_say_returns_immediately() {
        let mut console = Console;
        console.say("hello").await;
    }
}
