//! Everything the controller says, as pure string builders.
//!
//! Keeping the wording in one place means the executor and session stay
//! free of format strings and the exact sentences can be pinned by tests.

use crate::types::DeviceStatus;

// ─── Session lifecycle ─────────────────────────────────────────────────────

pub fn greeting() -> &'static str {
    "Voice control activated. How can I help you?"
}

pub fn deactivation() -> &'static str {
    "Voice control deactivated"
}

pub fn not_understood() -> &'static str {
    "Sorry, I didn't understand that command"
}

// ─── Relay and bulk outcomes ───────────────────────────────────────────────

fn state_word(state: bool) -> &'static str {
    if state { "turned on" } else { "turned off" }
}

pub fn relay_changed(relay: u8, state: bool) -> String {
    format!("Device {relay} has been {}", state_word(state))
}

/// Device answered but refused the request.
pub fn relay_refused(relay: u8, error: Option<&str>) -> String {
    format!(
        "Sorry, I couldn't control device {relay}: {}",
        error.unwrap_or("Unknown error")
    )
}

pub fn all_changed(state: bool) -> String {
    format!("All devices have been {}", state_word(state))
}

pub fn all_refused(error: Option<&str>) -> String {
    format!(
        "Sorry, I couldn't control all devices: {}",
        error.unwrap_or("Unknown error")
    )
}

pub fn invalid_relay(relay: u8) -> String {
    format!("Sorry, there is no device {relay}. I control devices 1 through 4")
}

// ─── Failure categories ────────────────────────────────────────────────────

/// The device answered with something other than success.
pub fn connection_error() -> &'static str {
    "Sorry, there was a connection error"
}

/// The device never answered.
pub fn unreachable() -> &'static str {
    "Sorry, I couldn't connect to the device"
}

pub fn status_failed() -> &'static str {
    "Sorry, I couldn't get the device status"
}

// ─── Status narration ──────────────────────────────────────────────────────

/// Summarize a status reply: count `relay*` keys and how many are on.
pub fn status_summary(status: &DeviceStatus) -> String {
    let relays: Vec<bool> = status
        .iter()
        .filter(|(key, _)| key.starts_with("relay"))
        .map(|(_, &on)| on)
        .collect();

    let total = relays.len();
    let active = relays.iter().filter(|&&on| on).count();

    if active == 0 {
        "All devices are currently off".into()
    } else if active == total {
        "All devices are currently on".into()
    } else {
        format!("{active} out of {total} devices are currently on")
    }
}

// ─── Help ──────────────────────────────────────────────────────────────────

pub fn help_spoken() -> &'static str {
    "I can help you control your devices. You can say things like \
     turn on light, turn off fan, turn on all devices, or check status"
}

/// Printed capability listing for the console and the `commands` subcommand.
pub fn help_listing() -> &'static str {
    "Supported commands:\n\
     \n\
     Individual devices:\n\
     - turn on light / turn off light      (device 1)\n\
     - turn on fan / turn off fan          (device 2)\n\
     - turn on tv / turn off tv            (device 3)\n\
     - turn on garage / turn off garage    (device 4)\n\
     - turn on 1 .. turn off 4             (by number)\n\
     \n\
     All devices:\n\
     - turn on all / turn off all\n\
     - turn on everything / turn off everything\n\
     \n\
     Status:\n\
     - what's the status / show me the status / check status\n\
     \n\
     Help:\n\
     - help / what can you do / list commands"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeviceStatus;

    fn status_of(pairs: &[(&str, bool)]) -> DeviceStatus {
        pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn status_summary_mixed() {
        let status = status_of(&[("relay1", true), ("relay2", false)]);
        assert_eq!(status_summary(&status), "1 out of 2 devices are currently on");
    }

    #[test]
    fn status_summary_all_off() {
        let status = status_of(&[("relay1", false), ("relay2", false)]);
        assert_eq!(status_summary(&status), "All devices are currently off");
    }

    #[test]
    fn status_summary_all_on() {
        let status = status_of(&[("relay1", true), ("relay2", true), ("relay3", true)]);
        assert_eq!(status_summary(&status), "All devices are currently on");
    }

    #[test]
    fn status_summary_ignores_non_relay_keys() {
        let status = status_of(&[("relay1", true), ("relay2", false), ("wifi", true)]);
        assert_eq!(status_summary(&status), "1 out of 2 devices are currently on");
    }

    #[test]
    fn status_summary_relay_count_follows_device() {
        // Six relays reported — nothing assumes four.
        let status: DeviceStatus = (1..=6).map(|i| (format!("relay{i}"), i <= 2)).collect();
        assert_eq!(status_summary(&status), "2 out of 6 devices are currently on");
    }

    #[test]
    fn relay_refused_uses_device_error_text() {
        assert_eq!(
            relay_refused(2, Some("relay stuck")),
            "Sorry, I couldn't control device 2: relay stuck"
        );
        assert_eq!(
            relay_refused(2, None),
            "Sorry, I couldn't control device 2: Unknown error"
        );
    }

    #[test]
    fn change_narrations_name_index_and_state() {
        assert_eq!(relay_changed(3, true), "Device 3 has been turned on");
        assert_eq!(relay_changed(1, false), "Device 1 has been turned off");
        assert_eq!(all_changed(true), "All devices have been turned on");
    }
}
