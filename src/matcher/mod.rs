//! Name matching
//!
//! Scores a claimed name against the fetched name and any alternate names a
//! registry knows for the individual. Matching is case-insensitive, tolerant
//! of an inserted or omitted middle name, and treats nickname-equivalent
//! tokens ("Doug"/"Douglas") as exact. The string-similarity fallback is
//! normalized Levenshtein on normalized tokens.

pub mod normalize;

use crate::alerts::{Alert, AlertSeverity, CATEGORY_NAME_MISMATCH};
use crate::config::MatchTier;
use crate::evaluation::sections::NameEvaluation;
use crate::nicknames::{nickname_index, NicknameIndex};
use normalize::{name_tokens, normalize_name, split_name_parts};
use serde::{Deserialize, Serialize};
use serde_json::json;
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Which positional part of a name is being matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamePartKind {
    First,
    Middle,
    Last,
    Full,
}

/// Component and full scores for one candidate name.
///
/// Part scores are in [0, 1]; `full` is in [0, 100]. A part score is `None`
/// when that part was not scored (e.g. neither side has a middle name).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartScores {
    pub first: Option<f64>,
    pub middle: Option<f64>,
    pub last: Option<f64>,
    pub full: f64,
}

/// Where a candidate name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchCandidateKind {
    Fetched,
    Alternate,
}

/// One candidate name with its scores, in consideration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub name: String,
    pub kind: MatchCandidateKind,
    pub scores: PartScores,
}

/// Output of matching a claimed name against all candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub first_score: Option<f64>,
    pub middle_score: Option<f64>,
    pub last_score: Option<f64>,
    /// Score of the best candidate, in [0, 100].
    pub full_score: f64,
    /// Best-matching candidate, original casing preserved.
    pub best_match: String,
    pub best_match_source: MatchCandidateKind,
    /// Every candidate considered: the fetched name first, then alternates
    /// in list order. Ties are broken by this order.
    pub candidates: Vec<ScoredCandidate>,
}

/// Scores claimed names against fetched/alternate names.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    index: Arc<NicknameIndex>,
    tier: MatchTier,
}

impl NameMatcher {
    /// Matcher over the global nickname index.
    pub fn new(tier: MatchTier) -> Self {
        Self {
            index: nickname_index(),
            tier,
        }
    }

    /// Matcher over a custom nickname index.
    pub fn with_index(index: Arc<NicknameIndex>, tier: MatchTier) -> Self {
        Self { index, tier }
    }

    pub fn tier(&self) -> MatchTier {
        self.tier
    }

    /// All nickname-equivalent forms of a single name token.
    pub fn get_name_variants(&self, name: &str) -> BTreeSet<String> {
        self.index.variants(name)
    }

    /// Score one name part against a candidate that may contain extra
    /// tokens. Returns a score in [0, 1].
    pub fn match_name_part(&self, expected: &str, candidate: &str, kind: NamePartKind) -> f64 {
        if matches!(kind, NamePartKind::Full) {
            return self.match_full_name(expected, candidate).full / 100.0;
        }

        let expected_norm = normalize_name(expected);
        if expected_norm.is_empty() {
            // Nothing claimed for this part, nothing to contradict.
            return 1.0;
        }
        let tokens = name_tokens(candidate);
        if tokens.is_empty() {
            return 0.0;
        }

        match kind {
            NamePartKind::First => self.token_score(&expected_norm, &tokens[0], kind),
            NamePartKind::Last => {
                self.token_score(&expected_norm, &tokens[tokens.len() - 1], kind)
            }
            NamePartKind::Middle => {
                let middles = if tokens.len() >= 3 {
                    &tokens[1..tokens.len() - 1]
                } else {
                    &tokens[..]
                };
                middles
                    .iter()
                    .map(|t| self.token_score(&expected_norm, t, kind))
                    .fold(0.0, f64::max)
            }
            NamePartKind::Full => 0.0, // unreachable, handled above
        }
    }

    /// Score a complete expected name against a complete candidate name.
    ///
    /// The full score is the mean of the scored parts: first and last
    /// always, middle only when both sides have one. An inserted or removed
    /// middle token therefore cannot drag a first+last match down.
    pub fn match_full_name(&self, expected: &str, candidate: &str) -> PartScores {
        let expected_parts = split_name_parts(expected);
        let candidate_parts = split_name_parts(candidate);

        let (e_first, c_first) = match (&expected_parts.first, &candidate_parts.first) {
            (None, None) => {
                return PartScores {
                    first: None,
                    middle: None,
                    last: None,
                    full: 100.0,
                }
            }
            (Some(_), None) | (None, Some(_)) => {
                return PartScores {
                    first: None,
                    middle: None,
                    last: None,
                    full: 0.0,
                }
            }
            (Some(e), Some(c)) => (e, c),
        };

        let mut part_scores: SmallVec<[f64; 3]> = SmallVec::new();

        let first = self.token_score(e_first, c_first, NamePartKind::First);
        part_scores.push(first);

        let last = match (&expected_parts.last, &candidate_parts.last) {
            (Some(e), Some(c)) => Some(self.token_score(e, c, NamePartKind::Last)),
            // Candidate is a bare single token; it must carry the surname too.
            (Some(e), None) => Some(self.token_score(e, c_first, NamePartKind::Last)),
            (None, _) => None,
        };
        if let Some(score) = last {
            part_scores.push(score);
        }

        let middle = if !expected_parts.middle.is_empty() && !candidate_parts.middle.is_empty() {
            let sum: f64 = expected_parts
                .middle
                .iter()
                .map(|em| {
                    candidate_parts
                        .middle
                        .iter()
                        .map(|cm| self.token_score(em, cm, NamePartKind::Middle))
                        .fold(0.0, f64::max)
                })
                .sum();
            Some(sum / expected_parts.middle.len() as f64)
        } else {
            None
        };
        if let Some(score) = middle {
            part_scores.push(score);
        }

        let full = part_scores.iter().sum::<f64>() / part_scores.len() as f64 * 100.0;

        PartScores {
            first: Some(first),
            middle,
            last,
            full,
        }
    }

    /// Evaluate the name criterion: score every candidate, pick the best,
    /// classify against the configured tier threshold.
    pub fn evaluate_name(
        &self,
        expected_name: &str,
        fetched_name: Option<&str>,
        other_names: &[String],
        source: &str,
    ) -> (NameEvaluation, Option<Alert>) {
        let mut candidates: Vec<ScoredCandidate> = Vec::new();

        if let Some(fetched) = fetched_name {
            if !fetched.trim().is_empty() {
                candidates.push(self.score_candidate(
                    expected_name,
                    fetched,
                    MatchCandidateKind::Fetched,
                ));
            }
        }
        for name in other_names {
            if !name.trim().is_empty() {
                candidates.push(self.score_candidate(
                    expected_name,
                    name,
                    MatchCandidateKind::Alternate,
                ));
            }
        }

        if candidates.is_empty() {
            let section = NameEvaluation {
                compliance: false,
                compliance_explanation: format!(
                    "No data available from {}: no fetched name to match against",
                    source
                ),
                source: source.to_string(),
                expected_name: expected_name.to_string(),
                match_result: None,
                alerts: Vec::new(),
            };
            return (section, None);
        }

        // Best score wins; ties keep the earlier candidate (fetched first).
        let mut best_idx = 0;
        for (idx, candidate) in candidates.iter().enumerate().skip(1) {
            if candidate.scores.full > candidates[best_idx].scores.full {
                best_idx = idx;
            }
        }

        let best = candidates[best_idx].clone();
        let threshold = self.tier.threshold();
        let full_score = best.scores.full;

        let match_result = MatchResult {
            first_score: best.scores.first,
            middle_score: best.scores.middle,
            last_score: best.scores.last,
            full_score,
            best_match: best.name.clone(),
            best_match_source: best.kind,
            candidates,
        };

        if full_score >= threshold {
            let section = NameEvaluation {
                compliance: true,
                compliance_explanation: format!(
                    "Name verified: best match '{}' scored {:.1}, meeting the {:.0} threshold",
                    best.name, full_score, threshold
                ),
                source: source.to_string(),
                expected_name: expected_name.to_string(),
                match_result: Some(match_result),
                alerts: Vec::new(),
            };
            (section, None)
        } else {
            let alert = Alert::new(
                "NameMismatch",
                CATEGORY_NAME_MISMATCH,
                mismatch_severity(full_score),
                source,
                format!(
                    "Claimed name '{}' best matched '{}' at {:.1}, below the {:.0} threshold",
                    expected_name, best.name, full_score, threshold
                ),
            )
            .with_metadata_entry("expected_name", json!(expected_name))
            .with_metadata_entry("best_match", json!(best.name))
            .with_metadata_entry("score", json!((full_score * 10.0).round() / 10.0));

            let section = NameEvaluation {
                compliance: false,
                compliance_explanation: format!(
                    "Name mismatch: best match '{}' scored {:.1}, below the {:.0} threshold",
                    best.name, full_score, threshold
                ),
                source: source.to_string(),
                expected_name: expected_name.to_string(),
                match_result: Some(match_result),
                alerts: vec![alert.clone()],
            };
            (section, Some(alert))
        }
    }

    fn score_candidate(
        &self,
        expected: &str,
        candidate: &str,
        kind: MatchCandidateKind,
    ) -> ScoredCandidate {
        ScoredCandidate {
            name: candidate.to_string(),
            kind,
            scores: self.match_full_name(expected, candidate),
        }
    }

    /// Score two normalized tokens: exact or nickname-equivalent tokens are
    /// 1.0, a middle initial matching the other token's initial is 1.0,
    /// otherwise normalized Levenshtein.
    fn token_score(&self, expected: &str, candidate: &str, kind: NamePartKind) -> f64 {
        if expected == candidate {
            return 1.0;
        }
        if expected.is_empty() || candidate.is_empty() {
            return 0.0;
        }
        if self.index.are_equivalent(expected, candidate) {
            return 1.0;
        }
        if matches!(kind, NamePartKind::Middle) && initial_match(expected, candidate) {
            return 1.0;
        }
        strsim::normalized_levenshtein(expected, candidate)
    }
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(MatchTier::default())
    }
}

/// A single-letter token matching the other token's initial.
fn initial_match(a: &str, b: &str) -> bool {
    (a.chars().count() == 1 || b.chars().count() == 1)
        && a.chars().next() == b.chars().next()
}

/// Severity of a name-mismatch alert scales with how far the best score
/// fell below threshold.
fn mismatch_severity(score: f64) -> AlertSeverity {
    if score >= 70.0 {
        AlertSeverity::Medium
    } else if score >= 50.0 {
        AlertSeverity::High
    } else {
        AlertSeverity::Critical
    }
}
