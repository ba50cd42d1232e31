//! Forward-only constraint filtering by pairing rules
//!
//! Only the attribute currently being picked is restricted, based on traits
//! committed earlier in the attribute order. Earlier picks are never revisited.

use crate::rules::ruleset::{RuleGroup, RuleSet};
use tracing::debug;

/// How an active rule group narrows the candidates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairingMode {
    /// Keep only candidates matched by the group
    MustPair,
    /// Drop every candidate matched by the group
    MustNotPair,
}

impl PairingMode {
    fn keeps(self, group: &RuleGroup, candidate: &str) -> bool {
        match self {
            Self::MustPair => group.matches(candidate),
            Self::MustNotPair => !group.matches(candidate),
        }
    }
}

/// Groups of the rule set that apply to this pick
///
/// A group is active when it matches some already picked trait and some
/// candidate. Activity is decided against the candidates entering the pass.
pub fn active_groups<'r, P, C>(
    rule_set: &'r RuleSet,
    already_picked: &[P],
    candidates: &[C],
) -> Vec<&'r RuleGroup>
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    rule_set
        .groups()
        .iter()
        .filter(|group| group.matches_any(already_picked) && group.matches_any(candidates))
        .collect()
}

/// Apply one rule set to the candidates
///
/// Active groups compose by sequential reduction; with no active group the
/// candidates pass through unchanged.
pub fn filter_by_rule_set<P, C>(
    rule_set: &RuleSet,
    mode: PairingMode,
    already_picked: &[P],
    candidates: &[C],
) -> Vec<String>
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    let groups = active_groups(rule_set, already_picked, candidates);
    let mut remaining: Vec<String> = candidates.iter().map(|c| c.as_ref().to_string()).collect();

    for group in groups {
        debug!(
            ?mode,
            group = ?group.patterns().iter().map(|p| p.source()).collect::<Vec<_>>(),
            "matched rule group"
        );
        remaining.retain(|candidate| mode.keeps(group, candidate));
    }

    remaining
}

/// Narrow the candidates for the attribute being picked
///
/// Runs the must-pair pass, then the must-not-pair pass on its output.
pub fn filter_candidates<P, C>(
    already_picked: &[P],
    candidates: &[C],
    must_pair: &RuleSet,
    must_not_pair: &RuleSet,
) -> Vec<String>
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    let paired = filter_by_rule_set(must_pair, PairingMode::MustPair, already_picked, candidates);
    filter_by_rule_set(
        must_not_pair,
        PairingMode::MustNotPair,
        already_picked,
        &paired,
    )
}
