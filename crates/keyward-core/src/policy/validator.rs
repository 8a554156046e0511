//! Fail-fast password policy validation.

use std::sync::Arc;

use super::{PolicyRule, PolicyRuleSet, PolicyViolation, SECRET_REQUIRED, ValidationOutcome};
use crate::TRACING_TARGET_PASSWORD_POLICY;

/// Validates secrets against a shared [`PolicyRuleSet`].
///
/// Rules are evaluated in a fixed order and evaluation stops at the first
/// failure, so the reported violation for a given secret is deterministic.
#[derive(Debug, Clone, Default)]
pub struct PolicyValidator {
    ruleset: Arc<PolicyRuleSet>,
}

impl PolicyValidator {
    /// Creates a new validator over `ruleset`.
    pub fn new(ruleset: Arc<PolicyRuleSet>) -> Self {
        Self { ruleset }
    }

    /// Returns the ruleset this validator enforces.
    #[inline]
    #[must_use]
    pub fn ruleset(&self) -> &Arc<PolicyRuleSet> {
        &self.ruleset
    }

    /// Validates a secret, returning the first violated rule.
    pub fn validate(&self, raw: &str) -> ValidationOutcome {
        let violation = self
            .ruleset
            .rules()
            .find_map(|rule| self.ruleset.check(rule, raw));

        match violation {
            None => {
                tracing::debug!(
                    target: TRACING_TARGET_PASSWORD_POLICY,
                    "password satisfies policy"
                );

                ValidationOutcome::Compliant
            }
            Some(violation) => {
                tracing::debug!(
                    target: TRACING_TARGET_PASSWORD_POLICY,
                    rule = violation.rule.as_str(),
                    "password violates policy"
                );

                ValidationOutcome::Violation(violation)
            }
        }
    }

    /// Checks only the [`PolicyRule::Required`] rule.
    ///
    /// Used where a secret must be present but composition is not enforced,
    /// such as hashing.
    pub fn require_present(raw: &str) -> Result<(), PolicyViolation> {
        if raw.is_empty() {
            return Err(PolicyViolation::new(PolicyRule::Required, SECRET_REQUIRED));
        }

        Ok(())
    }
}
