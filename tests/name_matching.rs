//! Name matching behavior against the shipped nickname table.

use crd_verify::matcher::NamePartKind;
use crd_verify::{nickname_index, MatchTier, NameMatcher};
use proptest::prelude::*;

fn matcher() -> NameMatcher {
    NameMatcher::new(MatchTier::Moderate)
}

#[test]
fn nickname_equivalence_is_symmetric_and_case_insensitive() {
    let index = nickname_index();
    assert!(index.are_equivalent("douglas", "doug"));
    assert!(index.are_equivalent("doug", "douglas"));
    assert!(index.are_equivalent("Douglas", "Doug"));
}

#[test]
fn variants_are_shared_between_nickname_and_canonical() {
    let index = nickname_index();
    let douglas = index.variants("douglas");
    let doug = index.variants("doug");
    assert_eq!(douglas, doug);
    let expected: Vec<&str> = vec!["doug", "douglas"];
    let actual: Vec<String> = douglas.into_iter().collect();
    assert_eq!(actual, expected);
}

#[test]
fn first_part_scores_nickname_as_exact() {
    let m = matcher();
    assert_eq!(m.match_name_part("Douglas", "Doug", NamePartKind::First), 1.0);
    assert_eq!(
        m.match_name_part("Douglas", "DOUG SCOTT", NamePartKind::First),
        1.0
    );
}

#[test]
fn unrelated_first_name_scores_below_threshold() {
    let m = matcher();
    assert!(m.match_name_part("Douglas", "Robert", NamePartKind::First) < 0.85);
}

#[test]
fn full_name_tolerates_inserted_middle_token() {
    let m = matcher();
    let score = m.match_name_part("Douglas Couden", "DOUG SCOTT COUDEN", NamePartKind::Full);
    assert!(score > 0.85, "score was {}", score);
}

#[test]
fn evaluate_name_exact_match() {
    let m = matcher();
    let (section, alert) = m.evaluate_name("John Doe", Some("John Doe"), &[], "FINRA_BrokerCheck");
    assert!(section.compliance);
    assert!(alert.is_none());
}

#[test]
fn evaluate_name_mismatch() {
    let m = matcher();
    let (section, alert) = m.evaluate_name("John Doe", Some("Jane Doe"), &[], "FINRA_BrokerCheck");
    assert!(!section.compliance);
    assert!(alert.is_some());
}

#[test]
fn get_name_variants_matches_index() {
    let m = matcher();
    assert_eq!(m.get_name_variants("douglas"), nickname_index().variants("doug"));
}

proptest! {
    #[test]
    fn full_score_stays_in_range(
        expected in "[A-Za-z]{1,12}( [A-Za-z]{1,12}){0,3}",
        candidate in "[A-Za-z]{0,12}( [A-Za-z]{1,12}){0,3}",
    ) {
        let m = matcher();
        let score = m.match_name_part(&expected, &candidate, NamePartKind::Full) * 100.0;
        prop_assert!((0.0..=100.0).contains(&score), "score out of range: {}", score);
    }

    #[test]
    fn part_scores_stay_in_range(
        expected in "[A-Za-z]{1,12}",
        candidate in "[A-Za-z]{1,12}( [A-Za-z]{1,12}){0,2}",
    ) {
        let m = matcher();
        for kind in [NamePartKind::First, NamePartKind::Middle, NamePartKind::Last] {
            let score = m.match_name_part(&expected, &candidate, kind);
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn variants_are_symmetric(token in "[a-z]{1,12}") {
        let index = nickname_index();
        for variant in index.variants(&token) {
            prop_assert!(
                index.variants(&variant).contains(&token),
                "asymmetric variants for {} / {}", token, variant
            );
        }
    }

    #[test]
    fn identical_names_always_match(name in "[A-Za-z]{1,12}( [A-Za-z]{1,12}){1,2}") {
        let m = matcher();
        let score = m.match_name_part(&name, &name, NamePartKind::Full);
        prop_assert!((score - 1.0).abs() < f64::EPSILON);
    }
}
