//! Temporary password and opaque token generation.
//!
//! Every random value is drawn from the operating system's entropy source,
//! either directly or through a ChaCha-based [`StdRng`] seeded from it. A
//! failing entropy source is reported as [`ErrorKind::RandomSource`]; there
//! is no fallback to a weaker generator.
//!
//! [`ErrorKind::RandomSource`]: crate::ErrorKind::RandomSource

use rand::rngs::{OsRng, StdRng};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, TryRngCore};

use crate::policy::{CharClass, PolicyValidator, ValidationOutcome};
use crate::{Error, Result, TRACING_TARGET_SECURE_GENERATOR};

/// Default temporary password length in characters.
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

/// Default token length in random bytes (64 hex characters).
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Upper bound on attempts to produce a password that passes validation.
const MAX_GENERATION_ATTEMPTS: usize = 16;

/// Generator for policy-compliant temporary passwords and hex tokens.
///
/// Uses the same [`PolicyValidator`] (and therefore the same ruleset
/// instance) that gates user-chosen passwords to self-check its output.
#[derive(Debug, Clone, Default)]
pub struct SecureGenerator {
    validator: PolicyValidator,
}

impl SecureGenerator {
    /// Creates a generator that checks its passwords with `validator`.
    pub fn new(validator: PolicyValidator) -> Self {
        Self { validator }
    }

    /// Returns the validator used for self-checks.
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &PolicyValidator {
        &self.validator
    }

    /// Shortest password length this generator can produce.
    ///
    /// Large enough to satisfy the minimum length and to hold one character
    /// of each required class.
    #[must_use]
    pub fn min_password_length(&self) -> usize {
        let ruleset = self.validator.ruleset();
        ruleset
            .min_length()
            .max(ruleset.required_classes().len())
            .max(1)
    }

    /// Generates a temporary password of [`DEFAULT_PASSWORD_LENGTH`].
    pub fn generate_default_password(&self) -> Result<String> {
        self.generate_temporary_password(DEFAULT_PASSWORD_LENGTH)
    }

    /// Generates a temporary password of `length` characters.
    ///
    /// The password contains at least one character of each required class,
    /// the remaining positions are drawn from the full alphabet, and the
    /// result is shuffled. The output always passes validation.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidInput`] if `length` is below
    ///   [`min_password_length`](Self::min_password_length).
    /// - [`ErrorKind::RandomSource`] if the OS cannot seed the generator.
    /// - [`ErrorKind::Internal`] if no compliant password was produced
    ///   within the attempt limit.
    ///
    /// [`ErrorKind::InvalidInput`]: crate::ErrorKind::InvalidInput
    /// [`ErrorKind::RandomSource`]: crate::ErrorKind::RandomSource
    /// [`ErrorKind::Internal`]: crate::ErrorKind::Internal
    pub fn generate_temporary_password(&self, length: usize) -> Result<String> {
        let min_length = self.min_password_length();
        if length < min_length {
            return Err(Error::invalid_input(format!(
                "temporary password length must be at least {min_length}"
            )));
        }

        let mut rng = StdRng::try_from_os_rng().map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_SECURE_GENERATOR,
                error = %e,
                "failed to seed generator from the operating system"
            );

            Error::random_source("failed to seed password generator").with_source(e)
        })?;

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let candidate = self.assemble(&mut rng, length);

            match self.validator.validate(&candidate) {
                ValidationOutcome::Compliant => {
                    tracing::debug!(
                        target: TRACING_TARGET_SECURE_GENERATOR,
                        length,
                        attempt,
                        "temporary password generated"
                    );
                    return Ok(candidate);
                }
                ValidationOutcome::Violation(violation) => {
                    tracing::debug!(
                        target: TRACING_TARGET_SECURE_GENERATOR,
                        rule = violation.rule.as_str(),
                        attempt,
                        "generated password rejected, retrying"
                    );
                }
            }
        }

        tracing::error!(
            target: TRACING_TARGET_SECURE_GENERATOR,
            length,
            attempts = MAX_GENERATION_ATTEMPTS,
            "could not generate a compliant temporary password"
        );

        Err(Error::internal(
            "generator",
            "could not generate a compliant temporary password",
        ))
    }

    /// Generates a token of [`DEFAULT_TOKEN_BYTES`] random bytes.
    pub fn generate_default_token(&self) -> Result<String> {
        self.generate_secure_token(DEFAULT_TOKEN_BYTES)
    }

    /// Generates `byte_length` random bytes, hex-encoded in lower case.
    ///
    /// The result has `2 * byte_length` characters from `[0-9a-f]`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidInput`] if `byte_length` is zero.
    /// - [`ErrorKind::RandomSource`] if the OS cannot provide entropy.
    ///
    /// [`ErrorKind::InvalidInput`]: crate::ErrorKind::InvalidInput
    /// [`ErrorKind::RandomSource`]: crate::ErrorKind::RandomSource
    pub fn generate_secure_token(&self, byte_length: usize) -> Result<String> {
        if byte_length == 0 {
            return Err(Error::invalid_input("token length must be at least 1 byte"));
        }

        let mut bytes = vec![0u8; byte_length];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_SECURE_GENERATOR,
                error = %e,
                "failed to read random bytes for token"
            );

            Error::random_source("token generation failed").with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET_SECURE_GENERATOR,
            byte_length,
            "secure token generated"
        );

        Ok(hex::encode(bytes))
    }

    /// Builds one shuffled candidate: one character per required class,
    /// the rest from the full alphabet.
    fn assemble(&self, rng: &mut StdRng, length: usize) -> String {
        let alphabet: Vec<u8> = CharClass::ALL
            .iter()
            .flat_map(|class| class.alphabet().iter().copied())
            .collect();

        let mut chars: Vec<u8> = Vec::with_capacity(length);
        for class in self.validator.ruleset().required_classes() {
            chars.push(pick(rng, class.alphabet()));
        }

        while chars.len() < length {
            chars.push(pick(rng, &alphabet));
        }

        chars.shuffle(rng);
        chars.into_iter().map(char::from).collect()
    }
}

/// Picks a uniformly random byte from a non-empty alphabet.
fn pick(rng: &mut StdRng, alphabet: &[u8]) -> u8 {
    alphabet[rng.random_range(0..alphabet.len())]
}
