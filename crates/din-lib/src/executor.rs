//! Turns one interpreted [`Action`] into one device call and one narration.
//!
//! The contract: every branch speaks exactly once through the feedback
//! channel and returns a bool — `true` when the action happened and was
//! confirmed, `false` otherwise. No error gets past this module; every
//! failure becomes a spoken apology.

use tracing::debug;

use din_core::narrate;
use din_core::types::{Action, RELAY_MAX, RELAY_MIN};

use crate::device::{ApiReply, DeviceClient, DeviceError};
use crate::speech::Feedback;

/// What a set call was aimed at, for narration purposes.
#[derive(Debug, Clone, Copy)]
enum Target {
    Relay(u8),
    All,
}

pub struct Executor {
    device: DeviceClient,
}

impl Executor {
    pub fn new(device: DeviceClient) -> Self {
        Self { device }
    }

    /// Dispatch `action`, narrate the outcome, report success.
    pub async fn execute<F: Feedback>(&self, action: Action, feedback: &mut F) -> bool {
        let (line, ok) = match action {
            Action::Relay { relay, state } => {
                // The matchers only construct 1..=4, but hold the invariant
                // here too: an out-of-range index never reaches the device.
                if !(RELAY_MIN..=RELAY_MAX).contains(&relay) {
                    (narrate::invalid_relay(relay), false)
                } else {
                    let reply = self.device.set_relay(relay, state).await;
                    narrate_set(Target::Relay(relay), state, &reply)
                }
            }
            Action::All { state } => {
                let reply = self.device.set_all(state).await;
                narrate_set(Target::All, state, &reply)
            }
            Action::Status => match self.device.status().await {
                Ok(status) => (narrate::status_summary(&status), true),
                Err(e) => {
                    debug!("status call failed: {e}");
                    (narrate::status_failed().into(), false)
                }
            },
            Action::Help => {
                println!("{}", narrate::help_listing());
                (narrate::help_spoken().into(), true)
            }
        };

        feedback.say(&line).await;
        ok
    }
}

/// Map a set-call outcome to its narration and success flag.
fn narrate_set(target: Target, state: bool, reply: &Result<ApiReply, DeviceError>) -> (String, bool) {
    match reply {
        Ok(reply) if reply.success => {
            let line = match target {
                Target::Relay(relay) => narrate::relay_changed(relay, state),
                Target::All => narrate::all_changed(state),
            };
            (line, true)
        }
        Ok(reply) => {
            // Device answered and said no.
            let error = reply.error.as_deref();
            let line = match target {
                Target::Relay(relay) => narrate::relay_refused(relay, error),
                Target::All => narrate::all_refused(error),
            };
            (line, false)
        }
        Err(DeviceError::Unreachable(e)) => {
            debug!("device unreachable: {e}");
            (narrate::unreachable().into(), false)
        }
        Err(e) => {
            debug!("device call failed: {e}");
            (narrate::connection_error().into(), false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use din_core::types::DeviceConfig;

    /// Records narrations instead of speaking them.
    #[derive(Default)]
    struct Recorder {
        lines: Vec<String>,
    }

    impl Feedback for Recorder {
        async fn say(&mut self, text: &str) {
            self.lines.push(text.to_string());
        }
    }

    fn executor() -> Executor {
        // Never contacted by the branches under test.
        Executor::new(DeviceClient::new(&DeviceConfig::default()))
    }

    #[tokio::test]
    async fn out_of_range_relay_is_rejected_before_any_io() {
        let mut feedback = Recorder::default();
        let ok = executor()
            .execute(Action::Relay { relay: 5, state: true }, &mut feedback)
            .await;
        assert!(!ok);
        assert_eq!(feedback.lines.len(), 1);
        assert!(feedback.lines[0].contains("no device 5"));
    }

    #[tokio::test]
    async fn help_always_succeeds_and_narrates_once() {
        let mut feedback = Recorder::default();
        let ok = executor().execute(Action::Help, &mut feedback).await;
        assert!(ok);
        assert_eq!(feedback.lines, vec![narrate::help_spoken().to_string()]);
    }

    #[test]
    fn confirmed_set_narrates_the_change() {
        let reply = Ok(ApiReply { success: true, error: None });
        let (line, ok) = narrate_set(Target::Relay(2), true, &reply);
        assert!(ok);
        assert_eq!(line, "Device 2 has been turned on");

        let (line, ok) = narrate_set(Target::All, false, &reply);
        assert!(ok);
        assert_eq!(line, "All devices have been turned off");
    }

    #[test]
    fn refused_set_carries_the_device_error_text() {
        let reply = Ok(ApiReply {
            success: false,
            error: Some("relay stuck".into()),
        });
        let (line, ok) = narrate_set(Target::Relay(3), false, &reply);
        assert!(!ok);
        assert_eq!(line, "Sorry, I couldn't control device 3: relay stuck");
    }

    #[test]
    fn refused_set_without_error_text_says_unknown() {
        let reply = Ok(ApiReply { success: false, error: None });
        let (line, ok) = narrate_set(Target::All, true, &reply);
        assert!(!ok);
        assert_eq!(line, "Sorry, I couldn't control all devices: Unknown error");
    }

    #[test]
    fn http_400_surfaces_as_failure_not_panic() {
        let reply = Err(DeviceError::BadStatus(400));
        let (line, ok) = narrate_set(Target::Relay(1), true, &reply);
        assert!(!ok);
        assert_eq!(line, narrate::connection_error());
    }

    #[test]
    fn transport_failure_gets_the_unreachable_apology() {
        let reply = Err(DeviceError::Unreachable("timed out".into()));
        let (line, ok) = narrate_set(Target::Relay(1), true, &reply);
        assert!(!ok);
        assert_eq!(line, narrate::unreachable());
    }
}
