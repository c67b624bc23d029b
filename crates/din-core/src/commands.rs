//! Canonical phrase table and top-level command interpretation.
//!
//! Pure functions, no I/O. The caller lower-cases transcribed text before
//! handing it in; nothing here normalizes beyond that.

use crate::fuzzy::fuzzy_match;
use crate::types::Action;

/// Canonical phrases in priority order — the first phrase that appears as a
/// substring of the utterance wins, so more specific phrases must come
/// before the generic ones they contain.
pub const COMMAND_TABLE: &[(&str, Action)] = &[
    // Single relays
    ("turn on light", Action::Relay { relay: 1, state: true }),
    ("turn off light", Action::Relay { relay: 1, state: false }),
    ("turn on fan", Action::Relay { relay: 2, state: true }),
    ("turn off fan", Action::Relay { relay: 2, state: false }),
    ("turn on tv", Action::Relay { relay: 3, state: true }),
    ("turn off tv", Action::Relay { relay: 3, state: false }),
    ("turn on garage", Action::Relay { relay: 4, state: true }),
    ("turn off garage", Action::Relay { relay: 4, state: false }),
    // Everything at once
    ("turn on all", Action::All { state: true }),
    ("turn off all", Action::All { state: false }),
    ("turn on everything", Action::All { state: true }),
    ("turn off everything", Action::All { state: false }),
    // Status
    ("what's the status", Action::Status),
    ("show me the status", Action::Status),
    ("check status", Action::Status),
    // Help
    ("help", Action::Help),
    ("what can you do", Action::Help),
    ("list commands", Action::Help),
];

/// Exact-phrase lookup. Returns the action of the first table phrase
/// contained in `text`, or `None` when nothing matches.
pub fn lookup(text: &str) -> Option<Action> {
    COMMAND_TABLE
        .iter()
        .find(|(phrase, _)| text.contains(phrase))
        .map(|&(_, action)| action)
}

/// Interpret one utterance: exact table match first, heuristic parse as
/// the fallback. `None` means the controller should ask the user to repeat.
pub fn interpret(text: &str) -> Option<Action> {
    lookup(text).or_else(|| fuzzy_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_phrase_matches_inside_longer_utterance() {
        assert_eq!(
            lookup("please turn on light now"),
            Some(Action::Relay { relay: 1, state: true })
        );
    }

    #[test]
    fn first_table_entry_wins() {
        // "turn off light" precedes "turn off all" in the table.
        assert_eq!(
            lookup("turn off light and turn off all"),
            Some(Action::Relay { relay: 1, state: false })
        );
    }

    #[test]
    fn bulk_phrases_map_to_all() {
        assert_eq!(lookup("turn on everything"), Some(Action::All { state: true }));
        assert_eq!(lookup("turn off all"), Some(Action::All { state: false }));
    }

    #[test]
    fn status_and_help_phrases() {
        assert_eq!(lookup("what's the status"), Some(Action::Status));
        assert_eq!(lookup("what can you do"), Some(Action::Help));
        assert_eq!(lookup("help"), Some(Action::Help));
    }

    #[test]
    fn unknown_text_misses() {
        assert_eq!(lookup("play some music"), None);
    }

    #[test]
    fn interpret_falls_back_to_fuzzy() {
        // No table phrase, but relay number + state synonym.
        assert_eq!(
            interpret("switch 3 on"),
            Some(Action::Relay { relay: 3, state: true })
        );
    }

    #[test]
    fn interpret_prefers_exact_table_match() {
        // "turn on fan" is relay 2 in the table even though a fuzzy parse
        // of the trailing "3" would pick relay 3.
        assert_eq!(
            interpret("turn on fan 3"),
            Some(Action::Relay { relay: 2, state: true })
        );
    }

    #[test]
    fn interpret_gives_up_on_gibberish() {
        assert_eq!(interpret("the weather is nice"), None);
    }
}
