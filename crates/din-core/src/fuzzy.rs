//! Heuristic fallback parse for utterances the phrase table misses.
//!
//! Cheap and explainable: pull a relay number out of the tokens, scan for
//! on/off synonyms, then decide between bulk, single-relay, and status
//! intents. False negatives are fine — the session just asks the user to
//! repeat. False positives are not resolved further.

use crate::types::{Action, RELAY_MAX, RELAY_MIN};

const ON_WORDS: &[&str] = &["on", "enable", "activate", "start"];
const OFF_WORDS: &[&str] = &["off", "disable", "deactivate", "stop"];
const BULK_WORDS: &[&str] = &["all", "everything", "all devices"];
const STATUS_WORDS: &[&str] = &["status", "state", "check", "show"];

/// Parse free-form text into an [`Action`], or `None` when the utterance
/// carries no recognizable intent.
///
/// The on-synonyms are scanned before the off-synonyms, so an utterance
/// containing both ("turn on and off the fan") deterministically resolves
/// to `state = true`.
pub fn fuzzy_match(text: &str) -> Option<Action> {
    // First token that reads as a relay number; later numbers never override.
    let relay = text
        .split_whitespace()
        .find_map(|tok| tok.parse::<u8>().ok().filter(|n| (RELAY_MIN..=RELAY_MAX).contains(n)));

    let state = if contains_any(text, ON_WORDS) {
        Some(true)
    } else if contains_any(text, OFF_WORDS) {
        Some(false)
    } else {
        None
    };

    if contains_any(text, BULK_WORDS) {
        if let Some(state) = state {
            return Some(Action::All { state });
        }
    }

    if let (Some(relay), Some(state)) = (relay, state) {
        return Some(Action::Relay { relay, state });
    }

    if contains_any(text, STATUS_WORDS) {
        return Some(Action::Status);
    }

    None
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_plus_on_synonym() {
        assert_eq!(
            fuzzy_match("switch 3 on"),
            Some(Action::Relay { relay: 3, state: true })
        );
        assert_eq!(
            fuzzy_match("please activate number 2"),
            Some(Action::Relay { relay: 2, state: true })
        );
    }

    #[test]
    fn number_plus_off_synonym() {
        assert_eq!(
            fuzzy_match("shut 4 off"),
            Some(Action::Relay { relay: 4, state: false })
        );
    }

    #[test]
    fn first_valid_number_wins() {
        assert_eq!(
            fuzzy_match("turn 2 on not 3"),
            Some(Action::Relay { relay: 2, state: true })
        );
    }

    #[test]
    fn out_of_range_numbers_are_skipped() {
        // 9 is not a relay; the later 1 is.
        assert_eq!(
            fuzzy_match("turn 9 and 1 on"),
            Some(Action::Relay { relay: 1, state: true })
        );
        // No valid number at all and no bulk/status words: miss.
        assert_eq!(fuzzy_match("turn 9 on"), None);
    }

    #[test]
    fn on_beats_off_when_both_present() {
        assert_eq!(
            fuzzy_match("turn on and off fan 2"),
            Some(Action::Relay { relay: 2, state: true })
        );
    }

    #[test]
    fn bulk_word_outranks_relay_number() {
        // "all" plus a state never becomes a single-relay action.
        assert_eq!(
            fuzzy_match("turn all of them off"),
            Some(Action::All { state: false })
        );
        assert_eq!(
            fuzzy_match("set everything and 3 on"),
            Some(Action::All { state: true })
        );
    }

    #[test]
    fn bulk_word_without_state_falls_through() {
        // "all" alone is not actionable, but "check" makes it a status ask.
        assert_eq!(fuzzy_match("check all of them"), Some(Action::Status));
    }

    #[test]
    fn status_words() {
        assert_eq!(fuzzy_match("what is the state of things"), Some(Action::Status));
        assert_eq!(fuzzy_match("show me"), Some(Action::Status));
    }

    #[test]
    fn no_intent_at_all() {
        assert_eq!(fuzzy_match("good morning"), None);
        assert_eq!(fuzzy_match(""), None);
    }
}
