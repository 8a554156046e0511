//! Password composition policy.
//!
//! A [`PolicyRuleSet`] holds the minimum length, the required character
//! classes and the denylist. A [`PolicyValidator`] evaluates secrets against
//! it and reports the first failing rule as a [`ValidationOutcome`].

mod char_class;
pub mod denylist;
mod rule;
mod ruleset;
mod validator;

pub use char_class::{CharClass, SPECIAL_CHARACTERS};
pub use rule::{PolicyRule, PolicyViolation, ValidationOutcome};
pub use ruleset::{DEFAULT_MIN_LENGTH, PolicyRuleSet, SECRET_REQUIRED};
pub use validator::PolicyValidator;
