//! The listen-interpret-act session loop.
//!
//! One logical worker drives everything: a bounded listen is the only
//! suspension point, then matching, the device call, and the narration all
//! run to completion before the next cycle. Cancellation is cooperative —
//! [`SessionState::stop`] is observed between cycles, so an in-flight
//! device call always finishes and the loop exits with exactly one
//! deactivation narration.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use din_core::commands::interpret;
use din_core::narrate;

use crate::executor::Executor;
use crate::speech::Feedback;
use crate::stt::Transcriber;

/// The controller's only shared mutable state: two flags, flipped by
/// `stop()` from whichever task handles the interrupt, read by the loop.
#[derive(Debug, Default)]
pub struct SessionState {
    running: AtomicBool,
    listening: AtomicBool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cooperative stop; the loop exits after its current cycle.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        self.listening.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }

    fn begin(&self) {
        self.running.store(true, Ordering::Relaxed);
        self.listening.store(true, Ordering::Relaxed);
    }
}

/// Loop timing knobs.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bound on waiting for speech to start.
    pub listen_timeout: Duration,
    /// Bound on a single utterance.
    pub phrase_limit: Duration,
    /// Pause between cycles so trailing audio doesn't re-trigger.
    pub debounce: Duration,
    /// Longer pause after an unexpected cycle error.
    pub error_pause: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            listen_timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(5),
            debounce: Duration::from_millis(500),
            error_pause: Duration::from_secs(1),
        }
    }
}

/// The continuous voice control session.
pub struct Session<T, F> {
    state: Arc<SessionState>,
    config: SessionConfig,
    executor: Executor,
    transcriber: T,
    feedback: F,
}

impl<T: Transcriber, F: Feedback> Session<T, F> {
    pub fn new(config: SessionConfig, executor: Executor, transcriber: T, feedback: F) -> Self {
        Self {
            state: Arc::new(SessionState::new()),
            config,
            executor,
            transcriber,
            feedback,
        }
    }

    /// Handle for `stop()` from outside the loop (interrupt handler).
    pub fn state(&self) -> Arc<SessionState> {
        self.state.clone()
    }

    /// Run until someone calls `stop()`. No single cycle's failure ends
    /// the loop; the only exit is the cooperative stop.
    pub async fn run(mut self) {
        self.state.begin();
        info!("voice control session started");
        println!("Voice control started. Say 'help' for available commands.");
        self.feedback.say(narrate::greeting()).await;

        while self.state.is_running() {
            let heard = self
                .transcriber
                .listen(self.config.listen_timeout, self.config.phrase_limit)
                .await;

            match heard {
                Ok(Some(text)) => {
                    println!("Heard: {text}");
                    match interpret(&text) {
                        Some(action) => {
                            let ok = self.executor.execute(action, &mut self.feedback).await;
                            debug!(?action, ok, "command executed");
                        }
                        None => {
                            debug!(%text, "utterance not interpretable");
                            self.feedback.say(narrate::not_understood()).await;
                        }
                    }
                    tokio::time::sleep(self.config.debounce).await;
                }
                // Timeouts and unintelligible speech are routine; stay quiet.
                Ok(None) => {
                    debug!("nothing heard this cycle");
                    tokio::time::sleep(self.config.debounce).await;
                }
                Err(e) => {
                    warn!("cycle error, continuing: {e}");
                    tokio::time::sleep(self.config.error_pause).await;
                }
            }
        }

        self.state.stop();
        self.feedback.say(narrate::deactivation()).await;
        info!("voice control session ended");
    }
}
