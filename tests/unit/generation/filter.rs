//! Tests for forward-only pairing filters

#[cfg(test)]
mod tests {
    use traitweave::generation::filter::{
        PairingMode, active_groups, filter_by_rule_set, filter_candidates,
    };
    use traitweave::rules::pattern::PatternSpec;
    use traitweave::rules::ruleset::RuleSet;

    fn rule_set(groups: &[&[&str]]) -> RuleSet {
        let declarations: Vec<Vec<PatternSpec>> = groups
            .iter()
            .map(|group| group.iter().map(|p| PatternSpec::from(*p)).collect())
            .collect();
        RuleSet::compile(&declarations).unwrap_or_default()
    }

    // Tests must-pair keeps only the partner of an earlier pick
    // Verified by inverting the keep predicate
    #[test]
    fn test_must_pair_narrows_candidates() {
        let rules = rule_set(&[&["Base/Red", "Arm/Red"], &["Base/Blue", "Arm/Blue"]]);
        let kept = filter_by_rule_set(
            &rules,
            PairingMode::MustPair,
            &["Base/Red"],
            &["Arm/Red", "Arm/Blue"],
        );
        assert_eq!(kept, vec!["Arm/Red".to_string()]);
    }

    // Tests groups need a match on both sides to apply
    // Verified by activating groups on picked traits alone
    #[test]
    fn test_inactive_groups_pass_through() {
        let rules = rule_set(&[&["Base/Red", "Arm/Red"]]);
        assert!(active_groups(&rules, &["Base/Green"], &["Arm/Red", "Arm/Blue"]).is_empty());
        assert!(active_groups(&rules, &["Base/Red"], &["Arm/Blue"]).is_empty());

        let kept = filter_by_rule_set(
            &rules,
            PairingMode::MustPair,
            &["Base/Green"],
            &["Arm/Red", "Arm/Blue"],
        );
        assert_eq!(kept.len(), 2);
    }

    // Tests must-not-pair removes conflicting candidates
    // Verified by keeping matched candidates
    #[test]
    fn test_must_not_pair_removes_conflicts() {
        let rules = rule_set(&[&["Hat/Cowboy*", "Eyes/Angry"]]);
        let kept = filter_by_rule_set(
            &rules,
            PairingMode::MustNotPair,
            &["Base/Red", "Hat/Cowboy Hat"],
            &["Eyes/Angry", "Eyes/Calm"],
        );
        assert_eq!(kept, vec!["Eyes/Calm".to_string()]);
    }

    // Tests active groups reduce one after another
    // Verified by unioning the groups' matches
    #[test]
    fn test_active_groups_compose_sequentially() {
        let rules = rule_set(&[&["Base/Red", "Arm/Red"], &["Base/Red", "Arm/Blue"]]);
        let kept = filter_by_rule_set(
            &rules,
            PairingMode::MustPair,
            &["Base/Red"],
            &["Arm/Red", "Arm/Blue"],
        );
        assert!(kept.is_empty());
    }

    // Tests must-not-pair runs on the must-pair output
    // Verified by running both passes on the original candidates
    #[test]
    fn test_filter_candidates_chains_passes() {
        let must_pair = rule_set(&[&["Base/Red", "Arm/Red*"]]);
        let must_not_pair = rule_set(&[&["Hat/Cap", "Arm/Red Left"]]);
        let kept = filter_candidates(
            &["Base/Red", "Hat/Cap"],
            &["Arm/Red Left", "Arm/Red Right", "Arm/Blue"],
            &must_pair,
            &must_not_pair,
        );
        assert_eq!(kept, vec!["Arm/Red Right".to_string()]);
    }
}
