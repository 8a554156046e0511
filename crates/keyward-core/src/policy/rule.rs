//! Policy rule identifiers and validation outcomes.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, IntoStaticStr};

use super::CharClass;

/// Identifier of a single composition rule.
///
/// Variants are declared in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, IntoStaticStr)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    /// The secret must not be empty.
    Required,
    /// The secret must reach the configured minimum length.
    MinLength,
    /// The secret must contain an uppercase letter.
    Uppercase,
    /// The secret must contain a lowercase letter.
    Lowercase,
    /// The secret must contain a digit.
    Digit,
    /// The secret must contain a special character.
    Special,
    /// The lower-cased secret must not be a known common password.
    Denylist,
}

impl PolicyRule {
    /// Returns the stable rule identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns the rule that requires the given character class.
    #[must_use]
    pub const fn for_class(class: CharClass) -> Self {
        match class {
            CharClass::Uppercase => Self::Uppercase,
            CharClass::Lowercase => Self::Lowercase,
            CharClass::Digit => Self::Digit,
            CharClass::Special => Self::Special,
        }
    }
}

/// The first rule a secret failed, with a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct PolicyViolation {
    /// Identifier of the failing rule.
    pub rule: PolicyRule,
    /// Human-readable description of the requirement.
    pub message: String,
}

impl PolicyViolation {
    /// Creates a new violation of `rule`.
    pub fn new(rule: PolicyRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

/// Result of validating a secret against a [`PolicyRuleSet`].
///
/// [`PolicyRuleSet`]: super::PolicyRuleSet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[must_use = "validation outcome must be inspected"]
pub enum ValidationOutcome {
    /// The secret satisfies every rule.
    Compliant,
    /// The secret failed a rule; evaluation stopped there.
    Violation(PolicyViolation),
}

impl ValidationOutcome {
    /// Returns `true` if the secret satisfies every rule.
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        matches!(self, Self::Compliant)
    }

    /// Returns the violation, if any.
    #[must_use]
    pub fn violation(&self) -> Option<&PolicyViolation> {
        match self {
            Self::Compliant => None,
            Self::Violation(violation) => Some(violation),
        }
    }

    /// Returns the failing rule, if any.
    #[must_use]
    pub fn rule(&self) -> Option<PolicyRule> {
        self.violation().map(|violation| violation.rule)
    }

    /// Converts the outcome into a `Result` so callers can use `?`.
    pub fn into_result(self) -> Result<(), PolicyViolation> {
        match self {
            Self::Compliant => Ok(()),
            Self::Violation(violation) => Err(violation),
        }
    }
}
