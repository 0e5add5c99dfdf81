//! Ordered decision lists.
//!
//! A list of [`Rule`]s is evaluated top to bottom; the first rule whose
//! predicate holds decides the label and later rules are never looked at.

/// One `(predicate, label)` entry of an ordered decision list over inputs `I`
/// and thresholds `C`.
pub struct Rule<L, I, C> {
    pub label: L,
    pub when: fn(&I, &C) -> bool,
}

impl<L: Copy, I, C> Clone for Rule<L, I, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: Copy, I, C> Copy for Rule<L, I, C> {}

/// Label of the first rule that matches, if any.
pub fn first_match<L: Copy, I, C>(rules: &[Rule<L, I, C>], inputs: &I, config: &C) -> Option<L> {
    rules
        .iter()
        .find(|rule| (rule.when)(inputs, config))
        .map(|rule| rule.label)
}
