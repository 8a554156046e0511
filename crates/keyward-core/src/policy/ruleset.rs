//! Immutable password policy configuration.

use std::collections::HashSet;

use super::{CharClass, PolicyRule, PolicyViolation, denylist};
use crate::{CredentialConfig, Result};

/// Default minimum password length in characters.
pub const DEFAULT_MIN_LENGTH: usize = 8;

/// Message of the [`PolicyRule::Required`] rule.
pub const SECRET_REQUIRED: &str = "secret required";

/// Ordered composition rules and the denylist they are checked against.
///
/// Built once at startup and shared behind an `Arc`; there is no way to
/// mutate a ruleset after construction.
#[derive(Debug, Clone)]
pub struct PolicyRuleSet {
    min_length: usize,
    required_classes: Vec<CharClass>,
    denylist: HashSet<String>,
}

impl PolicyRuleSet {
    /// Creates a ruleset with the built-in denylist.
    ///
    /// `required_classes` is normalized into evaluation order with duplicates
    /// removed, so the order callers list classes in has no effect.
    pub fn new(min_length: usize, required_classes: impl IntoIterator<Item = CharClass>) -> Self {
        let requested: HashSet<CharClass> = required_classes.into_iter().collect();
        let required_classes = CharClass::ALL
            .into_iter()
            .filter(|class| requested.contains(class))
            .collect();

        Self {
            min_length,
            required_classes,
            denylist: denylist::builtin(),
        }
    }

    /// Builds the ruleset described by the configuration.
    ///
    /// Reads `denylist_path` when set.
    pub fn from_config(config: &CredentialConfig) -> Result<Self> {
        let mut ruleset = Self::new(config.min_length, config.required_classes.iter().copied())
            .with_denylist_entries(&config.denylist);

        if let Some(path) = &config.denylist_path {
            ruleset = ruleset.with_denylist_entries(denylist::load(path)?);
        }

        Ok(ruleset)
    }

    /// Adds entries to the denylist.
    pub fn with_denylist_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.denylist
            .extend(entries.into_iter().map(|entry| denylist::normalize(entry.as_ref())));
        self
    }

    /// Minimum length in Unicode scalar values.
    #[inline]
    #[must_use]
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Required character classes in evaluation order.
    #[inline]
    #[must_use]
    pub fn required_classes(&self) -> &[CharClass] {
        &self.required_classes
    }

    /// Number of denylist entries.
    #[inline]
    #[must_use]
    pub fn denylist_len(&self) -> usize {
        self.denylist.len()
    }

    /// Returns `true` if the lower-cased secret is on the denylist.
    #[must_use]
    pub fn is_denylisted(&self, raw: &str) -> bool {
        self.denylist.contains(&denylist::normalize(raw))
    }

    /// Active rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = PolicyRule> + '_ {
        [PolicyRule::Required, PolicyRule::MinLength]
            .into_iter()
            .chain(self.required_classes.iter().map(|&class| PolicyRule::for_class(class)))
            .chain([PolicyRule::Denylist])
    }

    /// Checks a single rule, returning the violation if it fails.
    #[must_use]
    pub fn check(&self, rule: PolicyRule, raw: &str) -> Option<PolicyViolation> {
        let passed = match rule {
            PolicyRule::Required => !raw.is_empty(),
            PolicyRule::MinLength => raw.chars().count() >= self.min_length,
            PolicyRule::Uppercase => CharClass::Uppercase.is_present_in(raw),
            PolicyRule::Lowercase => CharClass::Lowercase.is_present_in(raw),
            PolicyRule::Digit => CharClass::Digit.is_present_in(raw),
            PolicyRule::Special => CharClass::Special.is_present_in(raw),
            PolicyRule::Denylist => !self.is_denylisted(raw),
        };

        (!passed).then(|| PolicyViolation::new(rule, self.message(rule)))
    }

    fn message(&self, rule: PolicyRule) -> String {
        match rule {
            PolicyRule::Required => SECRET_REQUIRED.to_owned(),
            PolicyRule::MinLength => {
                format!("must be at least {} characters", self.min_length)
            }
            PolicyRule::Uppercase => "must contain an uppercase letter".to_owned(),
            PolicyRule::Lowercase => "must contain a lowercase letter".to_owned(),
            PolicyRule::Digit => "must contain a digit".to_owned(),
            PolicyRule::Special => "must contain a special character".to_owned(),
            PolicyRule::Denylist => "too common, choose a different one".to_owned(),
        }
    }
}

impl Default for PolicyRuleSet {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH, CharClass::ALL)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_rule_order() {
        let rules: Vec<PolicyRule> = PolicyRuleSet::default().rules().collect();
        assert_eq!(
            rules,
            vec![
                PolicyRule::Required,
                PolicyRule::MinLength,
                PolicyRule::Uppercase,
                PolicyRule::Lowercase,
                PolicyRule::Digit,
                PolicyRule::Special,
                PolicyRule::Denylist,
            ]
        );
    }

    #[test]
    fn test_required_classes_are_normalized() {
        let ruleset = PolicyRuleSet::new(
            10,
            [CharClass::Special, CharClass::Digit, CharClass::Special],
        );

        assert_eq!(
            ruleset.required_classes(),
            &[CharClass::Digit, CharClass::Special]
        );
        let rules: Vec<PolicyRule> = ruleset.rules().collect();
        assert_eq!(
            rules,
            vec![
                PolicyRule::Required,
                PolicyRule::MinLength,
                PolicyRule::Digit,
                PolicyRule::Special,
                PolicyRule::Denylist,
            ]
        );
    }

    #[test]
    fn test_min_length_counts_characters() {
        let ruleset = PolicyRuleSet::new(4, []);
        // Four characters, eight bytes.
        assert!(ruleset.check(PolicyRule::MinLength, "äöüß").is_none());
        assert!(ruleset.check(PolicyRule::MinLength, "äöü").is_some());
    }

    #[test]
    fn test_min_length_message_uses_configured_value() {
        let ruleset = PolicyRuleSet::new(12, []);
        let violation = ruleset.check(PolicyRule::MinLength, "short").unwrap();
        assert_eq!(violation.message, "must be at least 12 characters");
    }

    #[test]
    fn test_denylist_is_case_insensitive() {
        let ruleset = PolicyRuleSet::default();
        assert!(ruleset.is_denylisted("Password123!"));
        assert!(ruleset.is_denylisted("PASSWORD123!"));
        assert!(!ruleset.is_denylisted("StrongPassword123!"));
    }

    #[test]
    fn test_extra_denylist_entries() {
        let ruleset = PolicyRuleSet::default().with_denylist_entries(["Acme2024!"]);
        assert!(ruleset.is_denylisted("acme2024!"));
        assert!(ruleset.denylist_len() > denylist::COMMON_PASSWORDS.len());
    }

    #[test]
    fn test_from_config_reads_denylist_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "Hunter2Hunter2!")?;

        let config = CredentialConfig::builder()
            .with_min_length(10usize)
            .with_denylist(vec!["Inline2024!".to_owned()])
            .with_denylist_path(file.path())
            .build()?;

        let ruleset = PolicyRuleSet::from_config(&config)?;
        assert_eq!(ruleset.min_length(), 10);
        assert!(ruleset.is_denylisted("hunter2hunter2!"));
        assert!(ruleset.is_denylisted("INLINE2024!"));
        assert!(ruleset.is_denylisted("password123!"));
        Ok(())
    }
}
