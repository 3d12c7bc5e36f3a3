//! Matching live key events against a rule table.

use crate::event::{KeyDirection, KeyboardEvent, KeyboardEventArgs};
use crate::table::RuleTable;

/// What a single matching rule decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    /// Lookup key of the rule
    pub rule: String,
    pub prevent: bool,
    pub stop: bool,
    pub subscribe: bool,
}

/// Result of matching one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub direction: KeyDirection,
    /// One entry per matching rule, literal rule first
    pub rules: Vec<RuleOutcome>,
    /// Consolidated event for subscribers, if any matching rule subscribes
    pub forward: Option<KeyboardEventArgs>,
}

impl MatchOutcome {
    /// Number of matching rules.
    pub fn matched(&self) -> usize {
        self.rules.len()
    }

    pub fn prevented(&self) -> bool {
        self.rules.iter().any(|r| r.prevent)
    }

    pub fn stopped(&self) -> bool {
        self.rules.iter().any(|r| r.stop)
    }
}

/// Decide what to do with an event without touching it.
pub fn evaluate(event: &KeyboardEvent, direction: KeyDirection, table: &RuleTable) -> MatchOutcome {
    let key = event.key.to_lowercase();
    let modifiers = event.modifiers;

    let rules: Vec<RuleOutcome> = table
        .matching(&key)
        .map(|rule| RuleOutcome {
            rule: rule.key().to_string(),
            prevent: rule.prevent(direction).matches(modifiers),
            stop: rule.stop(direction).matches(modifiers),
            subscribe: rule.subscribes(direction),
        })
        .collect();

    // One forwarded event no matter how many rules asked for it.
    let forward = rules
        .iter()
        .any(|r| r.subscribe)
        .then(|| event.to_args(direction));

    MatchOutcome {
        direction,
        rules,
        forward,
    }
}

/// Apply an outcome's prevent/stop decisions to the event.
pub fn apply(event: &mut KeyboardEvent, outcome: &MatchOutcome) {
    if outcome.prevented() {
        event.prevent_default();
    }
    if outcome.stopped() {
        event.stop_propagation();
    }
}

/// Evaluate and apply in one step.
pub fn process(
    event: &mut KeyboardEvent,
    direction: KeyDirection,
    table: &RuleTable,
) -> MatchOutcome {
    let outcome = evaluate(event, direction, table);
    apply(event, &outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Modifiers;
    use crate::options::KeyOptions;

    fn table(options: &[KeyOptions]) -> RuleTable {
        RuleTable::from_options(options).unwrap()
    }

    #[test]
    fn test_escape_subscribe_down() {
        let table = table(&[KeyOptions::new("Escape").with_subscribe_down()]);
        let mut event = KeyboardEvent::new("Escape");

        let outcome = process(&mut event, KeyDirection::Down, &table);
        assert_eq!(outcome.matched(), 1);
        let args = outcome.forward.unwrap();
        assert_eq!(args.key, "Escape");
        assert_eq!(args.kind, KeyDirection::Down);
        assert!(!event.default_prevented());

        let outcome = process(&mut event, KeyDirection::Up, &table);
        assert_eq!(outcome.matched(), 1);
        assert!(outcome.forward.is_none());
    }

    #[test]
    fn test_regex_prevent_without_subscribe() {
        let table = table(&[KeyOptions::new("/[a-z]/").with_prevent_down("key+none")]);

        let mut event = KeyboardEvent::new("a");
        let outcome = process(&mut event, KeyDirection::Down, &table);
        assert!(event.default_prevented());
        assert!(!event.propagation_stopped());
        assert!(outcome.forward.is_none());

        let mut shifted = KeyboardEvent::new("A").with_modifiers(Modifiers::SHIFT);
        process(&mut shifted, KeyDirection::Down, &table);
        assert!(!shifted.default_prevented());
    }

    #[test]
    fn test_multiple_patterns_forward_once() {
        let table = table(&[
            KeyOptions::new("/[a-z]/").with_subscribe_down().with_stop_down("any"),
            KeyOptions::new("/x/").with_subscribe_down().with_prevent_down("any"),
            KeyOptions::new("X").with_subscribe_down(),
        ]);

        let mut event = KeyboardEvent::new("x");
        let outcome = process(&mut event, KeyDirection::Down, &table);
        assert_eq!(outcome.matched(), 3);
        assert!(outcome.forward.is_some());
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
        assert_eq!(outcome.rules[0].rule, "x");
    }

    #[test]
    fn test_no_match() {
        let table = table(&[KeyOptions::new("Enter").with_prevent_down("any")]);
        let mut event = KeyboardEvent::new("Escape");
        let outcome = process(&mut event, KeyDirection::Down, &table);
        assert_eq!(outcome.matched(), 0);
        assert!(!event.default_prevented());
    }

    #[test]
    fn test_direction_policies() {
        let table = table(&[KeyOptions::new("Tab")
            .with_prevent_up("key+shift")
            .with_stop_down("key+none")]);

        let mut down = KeyboardEvent::new("Tab").with_modifiers(Modifiers::SHIFT);
        process(&mut down, KeyDirection::Down, &table);
        assert!(!down.default_prevented());
        assert!(!down.propagation_stopped());

        let mut up = KeyboardEvent::new("Tab").with_modifiers(Modifiers::SHIFT);
        process(&mut up, KeyDirection::Up, &table);
        assert!(up.default_prevented());
    }

    #[test]
    fn test_evaluate_is_pure() {
        let table = table(&[KeyOptions::new("a").with_prevent_down("any")]);
        let event = KeyboardEvent::new("a");
        let outcome = evaluate(&event, KeyDirection::Down, &table);
        assert!(outcome.prevented());
        assert!(!event.default_prevented());
    }
}
