//! Password strength evaluation service.
//!
//! The score is a transparent heuristic over length thresholds and
//! character classes, independent of the policy gate. A zxcvbn estimate is
//! attached for callers that want a guess count, but it never affects the
//! score or the feedback.

use serde::{Deserialize, Serialize};
use zxcvbn::zxcvbn;

use crate::TRACING_TARGET_PASSWORD_STRENGTH;
use crate::policy::CharClass;

/// Highest possible score.
pub const MAX_SCORE: u8 = 4;

/// Number of leading characters passed to the entropy estimator.
pub const ESTIMATE_MAX_CHARS: usize = 100;

/// Length at which the basic length criterion is met.
const MIN_LENGTH: usize = 8;

/// Length at which the recommended length criterion is met.
const RECOMMENDED_LENGTH: usize = 12;

/// Result of password strength evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthAssessment {
    /// Score from 0 (weakest) to 4 (strongest).
    pub score: u8,
    /// One suggestion per unmet criterion; empty exactly when `score` is 4.
    pub feedback: Vec<String>,
    /// Advisory guess-based estimate; absent for empty input.
    pub estimate: Option<EntropyEstimate>,
}

/// zxcvbn guess estimate for a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntropyEstimate {
    /// Estimated guesses required to crack the password.
    pub guesses: u64,
    /// zxcvbn's own 0-4 score.
    pub score: u8,
    /// Warning about a recognized weakness, if any.
    pub warning: Option<String>,
}

/// A single scoring criterion.
#[derive(Debug, Clone, Copy)]
enum Criterion {
    Length(usize),
    Class(CharClass),
}

impl Criterion {
    /// All criteria in feedback order.
    const ALL: [Criterion; 6] = [
        Criterion::Length(MIN_LENGTH),
        Criterion::Length(RECOMMENDED_LENGTH),
        Criterion::Class(CharClass::Uppercase),
        Criterion::Class(CharClass::Lowercase),
        Criterion::Class(CharClass::Digit),
        Criterion::Class(CharClass::Special),
    ];

    fn is_met(self, raw: &str, length: usize) -> bool {
        match self {
            Self::Length(threshold) => length >= threshold,
            Self::Class(class) => class.is_present_in(raw),
        }
    }

    fn feedback(self) -> String {
        match self {
            Self::Length(MIN_LENGTH) => format!("use at least {MIN_LENGTH} characters"),
            Self::Length(threshold) => format!("use {threshold} or more characters"),
            Self::Class(CharClass::Uppercase) => "add an uppercase letter".to_owned(),
            Self::Class(CharClass::Lowercase) => "add a lowercase letter".to_owned(),
            Self::Class(CharClass::Digit) => "add a digit".to_owned(),
            Self::Class(CharClass::Special) => "add a special character".to_owned(),
        }
    }
}

/// Password strength evaluator.
///
/// Stateless; never fails, whatever the input.
#[derive(Debug, Clone, Default)]
pub struct PasswordStrength;

impl PasswordStrength {
    /// Creates a new instance of a [`PasswordStrength`] service.
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Scores a password.
    ///
    /// The score is 4 only when every criterion is met; otherwise it is
    /// proportional to the number of met criteria and capped at 3. Meeting
    /// an additional criterion never lowers the score.
    pub fn score(&self, raw: &str) -> StrengthAssessment {
        let length = raw.chars().count();

        let feedback: Vec<String> = Criterion::ALL
            .into_iter()
            .filter(|criterion| !criterion.is_met(raw, length))
            .map(Criterion::feedback)
            .collect();

        let met = Criterion::ALL.len() - feedback.len();
        let score = if feedback.is_empty() {
            MAX_SCORE
        } else {
            let proportional = met * usize::from(MAX_SCORE) / Criterion::ALL.len();
            proportional.min(usize::from(MAX_SCORE - 1)) as u8
        };

        let estimate = Self::estimate(raw);

        tracing::debug!(
            target: TRACING_TARGET_PASSWORD_STRENGTH,
            score,
            unmet = feedback.len(),
            estimated_guesses = estimate.as_ref().map(|e| e.guesses),
            "password strength evaluation completed"
        );

        StrengthAssessment {
            score,
            feedback,
            estimate,
        }
    }

    /// Checks if a password reaches `min_score`.
    #[must_use]
    pub fn meets_requirements(&self, raw: &str, min_score: u8) -> bool {
        self.score(raw).score >= min_score
    }

    /// Runs zxcvbn over the leading characters of `raw`.
    fn estimate(raw: &str) -> Option<EntropyEstimate> {
        if raw.is_empty() {
            return None;
        }

        let analyzed = match raw.char_indices().nth(ESTIMATE_MAX_CHARS) {
            Some((end, _)) => &raw[..end],
            None => raw,
        };

        let entropy = zxcvbn(analyzed, &[]);
        Some(EntropyEstimate {
            guesses: entropy.guesses(),
            score: entropy.score().into(),
            warning: entropy
                .feedback()
                .and_then(|feedback| feedback.warning())
                .map(|warning| warning.to_string()),
        })
    }
}
