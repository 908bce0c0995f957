//! Ordered action detection rules
//!
//! The cascade is a data-driven table: rules are tried top to bottom and
//! the first match wins. Value-setting outranks everything, then increase,
//! decrease, on, off, and query last. Keeping the table explicit makes the
//! ordering auditable and lets each rule be tested on its own.

use super::Action;
use crate::resolver::tokenize;
use once_cell::sync::Lazy;
use regex::Regex;
use strsim::levenshtein;

/// One entry of the action cascade
pub struct ActionRule {
    /// Rule name for logging
    pub name: &'static str,
    /// Action produced when the rule matches
    pub action: Action,
    matcher: fn(&str) -> bool,
}

/// The cascade, in priority order
pub static ACTION_RULES: Lazy<Vec<ActionRule>> = Lazy::new(|| {
    vec![
        ActionRule {
            name: "set-value",
            action: Action::SetValue,
            matcher: matches_set_value,
        },
        ActionRule {
            name: "increase",
            action: Action::Increase,
            matcher: matches_increase,
        },
        ActionRule {
            name: "decrease",
            action: Action::Decrease,
            matcher: matches_decrease,
        },
        ActionRule {
            name: "switch-on",
            action: Action::SetOn,
            matcher: matches_on,
        },
        ActionRule {
            name: "switch-off",
            action: Action::SetOff,
            matcher: matches_off,
        },
        ActionRule {
            name: "query",
            action: Action::Query,
            matcher: matches_query,
        },
    ]
});

/// Detect the action expressed in lowercased text; `None` means no
/// deterministic intent exists
pub fn detect_action(text: &str) -> Option<Action> {
    let rule = ACTION_RULES.iter().find(|rule| (rule.matcher)(text))?;
    tracing::debug!(rule = rule.name, "action rule matched");
    Some(rule.action)
}

/// A value-setting preposition followed eventually by a digit, or a bare
/// number adjacent to a unit marker
static SET_VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:auf|setze|stelle|stell)\b.*\d|\d+\s*(?:%|prozent|grad|°)")
        .expect("valid regex")
});

// no bare "hoch" here: it would shadow the "wie hoch" query phrase
static INCREASE_KEYWORDS: &[&str] = &[
    "heller", "wärmer", "waermer", "erhöhe", "erhöhen", "erhoehe", "höher", "hoeher", "rauf",
    "lauter",
];

static DECREASE_KEYWORDS: &[&str] = &[
    "dunkler",
    "kälter",
    "kaelter",
    "kühler",
    "kuehler",
    "verringere",
    "verringern",
    "reduziere",
    "runter",
    "leiser",
];

static ON_KEYWORDS: &[&str] = &["einschalten", "anschalten", "aktiviere", "aktivieren"];

static OFF_KEYWORDS: &[&str] = &[
    "ausschalten",
    "abschalten",
    "ausmachen",
    "deaktiviere",
    "deaktivieren",
];

static QUERY_PHRASES: &[&str] = &[
    "wie ist", "wie sind", "wie warm", "wie kalt", "wie hell", "wie hoch", "was ist", "was macht",
    "ist das", "ist die", "ist der", "sind die", "status",
];

/// Verb stems accepted by the typo-tolerant switch rule
static SWITCH_VERBS: &[&str] = &["schalte", "schalten", "schalt"];

fn matches_set_value(text: &str) -> bool {
    SET_VALUE_RE.is_match(text)
}

fn matches_increase(text: &str) -> bool {
    has_any_token(text, INCREASE_KEYWORDS)
}

fn matches_decrease(text: &str) -> bool {
    has_any_token(text, DECREASE_KEYWORDS)
}

fn matches_on(text: &str) -> bool {
    if has_any_token(text, ON_KEYWORDS) {
        return true;
    }
    let trimmed = text.trim_end_matches(|c: char| !c.is_alphanumeric());
    if trimmed.ends_with(" ein") || trimmed.ends_with(" an") {
        return true;
    }
    has_switch_verb(text) && has_token(text, "ein")
}

fn matches_off(text: &str) -> bool {
    if has_any_token(text, OFF_KEYWORDS) {
        return true;
    }
    let trimmed = text.trim_end_matches(|c: char| !c.is_alphanumeric());
    if trimmed.ends_with(" aus") {
        return true;
    }
    has_switch_verb(text) && has_token(text, "aus")
}

fn matches_query(text: &str) -> bool {
    QUERY_PHRASES.iter().any(|phrase| text.contains(phrase)) || text.contains('?')
}

/// Whether some token is within edit distance 2 of a switch verb stem,
/// so "schlate das licht ein" still switches on
fn has_switch_verb(text: &str) -> bool {
    tokenize(text).iter().any(|token| {
        token.len() >= 4
            && SWITCH_VERBS
                .iter()
                .any(|verb| levenshtein(token, verb) <= 2)
    })
}

fn has_token(text: &str, wanted: &str) -> bool {
    tokenize(text).iter().any(|token| token == wanted)
}

fn has_any_token(text: &str, keywords: &[&str]) -> bool {
    tokenize(text)
        .iter()
        .any(|token| keywords.contains(&token.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_setting_outranks_switch_suffix() {
        // ends with " ein" but carries a value preposition plus digit
        assert_eq!(
            detect_action("stelle das licht auf 50 und schalte es ein"),
            Some(Action::SetValue)
        );
        assert_eq!(
            detect_action("heizung im schlafzimmer auf 22 grad"),
            Some(Action::SetValue)
        );
    }

    #[test]
    fn trailing_particles_switch_on_and_off() {
        assert_eq!(detect_action("licht im wohnzimmer ein"), Some(Action::SetOn));
        assert_eq!(detect_action("mach das licht an"), Some(Action::SetOn));
        assert_eq!(detect_action("licht im wohnzimmer aus"), Some(Action::SetOff));
    }

    #[test]
    fn typo_in_switch_verb_is_tolerated() {
        assert_eq!(
            detect_action("schlate das licht ein bitte"),
            Some(Action::SetOn)
        );
        assert_eq!(
            detect_action("schallte das licht aus bitte"),
            Some(Action::SetOff)
        );
    }

    #[test]
    fn increase_and_decrease_keywords() {
        assert_eq!(detect_action("mach das licht heller"), Some(Action::Increase));
        assert_eq!(detect_action("etwas kälter bitte"), Some(Action::Decrease));
    }

    #[test]
    fn height_questions_are_queries_not_increases() {
        assert_eq!(
            detect_action("wie hoch ist die heizung im schlafzimmer?"),
            Some(Action::Query)
        );
        assert_eq!(
            detect_action("stell die heizung höher"),
            Some(Action::Increase)
        );
    }

    #[test]
    fn question_mark_is_universal_query_fallback() {
        assert_eq!(
            detect_action("wie warm ist es im schlafzimmer"),
            Some(Action::Query)
        );
        assert_eq!(detect_action("licht im keller?"), Some(Action::Query));
    }

    #[test]
    fn unrelated_text_matches_nothing() {
        assert_eq!(detect_action("erzähl mir einen witz"), None);
    }
}
