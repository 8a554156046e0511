//! Composition root for the credential components.

use std::sync::Arc;

use crate::policy::{PolicyRuleSet, PolicyValidator, ValidationOutcome};
use crate::{
    CredentialConfig, HashingPool, PasswordHasher, PasswordStrength, Result, SecureGenerator,
    StrengthAssessment, TRACING_TARGET_PASSWORD_POLICY,
};

/// All credential components built from one configuration.
///
/// The validator and the generator share a single [`PolicyRuleSet`]
/// instance, so every generated password passes the same checks a user
/// chosen password does.
#[must_use = "service does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct CredentialService {
    /// Inline Argon2id hashing and verification.
    pub password_hasher: PasswordHasher,
    /// Policy validation over the shared ruleset.
    pub password_validator: PolicyValidator,
    /// Strength scoring.
    pub password_strength: PasswordStrength,
    /// Temporary password and token generation over the shared ruleset.
    pub secure_generator: SecureGenerator,
    /// Async hashing with bounded concurrency, backed by `password_hasher`.
    pub hashing_pool: HashingPool,
}

impl CredentialService {
    /// Builds every component from `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the hash parameters are rejected or
    /// the denylist file cannot be read.
    pub fn from_config(config: &CredentialConfig) -> Result<Self> {
        let ruleset = Arc::new(PolicyRuleSet::from_config(config)?);
        let password_hasher = PasswordHasher::from_config(config)?;
        let password_validator = PolicyValidator::new(ruleset.clone());

        tracing::info!(
            target: TRACING_TARGET_PASSWORD_POLICY,
            min_length = ruleset.min_length(),
            required_classes = ?ruleset.required_classes(),
            denylist_entries = ruleset.denylist_len(),
            work_factor = config.work_factor,
            memory_cost = config.memory_cost,
            max_concurrent_hashes = config.max_concurrent_hashes,
            "credential service configured"
        );

        Ok(Self {
            hashing_pool: HashingPool::new(password_hasher.clone(), config.max_concurrent_hashes),
            secure_generator: SecureGenerator::new(password_validator.clone()),
            password_strength: PasswordStrength::new(),
            password_validator,
            password_hasher,
        })
    }

    /// Hashes a secret inline on the calling thread.
    pub fn hash(&self, raw: &str) -> Result<String> {
        self.password_hasher.hash(raw)
    }

    /// Verifies a secret inline on the calling thread.
    #[must_use]
    pub fn verify(&self, raw: &str, hashed: &str) -> bool {
        self.password_hasher.verify(raw, hashed)
    }

    /// Validates a secret against the configured policy.
    pub fn validate(&self, raw: &str) -> ValidationOutcome {
        self.password_validator.validate(raw)
    }

    /// Scores a secret.
    pub fn score(&self, raw: &str) -> StrengthAssessment {
        self.password_strength.score(raw)
    }

    /// Generates a policy-compliant temporary password.
    pub fn generate_temporary_password(&self, length: usize) -> Result<String> {
        self.secure_generator.generate_temporary_password(length)
    }

    /// Generates a hex token from `byte_length` random bytes.
    pub fn generate_secure_token(&self, byte_length: usize) -> Result<String> {
        self.secure_generator.generate_secure_token(byte_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{CharClass, PolicyRule};

    fn fast_config() -> anyhow::Result<CredentialConfig> {
        Ok(CredentialConfig::builder()
            .with_work_factor(1u32)
            .with_memory_cost(1024u32)
            .build()?)
    }

    #[test]
    fn test_ruleset_is_shared() -> anyhow::Result<()> {
        let service = CredentialService::from_config(&fast_config()?)?;
        assert!(Arc::ptr_eq(
            service.password_validator.ruleset(),
            service.secure_generator.validator().ruleset()
        ));
        Ok(())
    }

    #[test]
    fn test_end_to_end() -> anyhow::Result<()> {
        let service = CredentialService::from_config(&fast_config()?)?;

        let password = service.generate_temporary_password(12)?;
        assert!(service.validate(&password).is_compliant());
        assert_eq!(service.score(&password).score, 4);

        let hash = service.hash(&password)?;
        assert!(service.verify(&password, &hash));
        assert!(!service.password_hasher.needs_rehash(&hash));

        let token = service.generate_secure_token(32)?;
        assert_eq!(token.len(), 64);
        Ok(())
    }

    #[test]
    fn test_generated_passwords_respect_custom_policy() -> anyhow::Result<()> {
        let config = CredentialConfig::builder()
            .with_work_factor(1u32)
            .with_memory_cost(1024u32)
            .with_min_length(20usize)
            .with_required_classes([CharClass::Lowercase, CharClass::Digit])
            .build()?;
        let service = CredentialService::from_config(&config)?;

        assert_eq!(
            service.validate("abc123").rule(),
            Some(PolicyRule::MinLength)
        );

        let error = service.generate_temporary_password(12).unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::InvalidInput);

        for _ in 0..50 {
            let password = service.generate_temporary_password(20)?;
            assert!(service.validate(&password).is_compliant());
        }
        Ok(())
    }

    #[test]
    fn test_policy_change_keeps_hashes_valid() -> anyhow::Result<()> {
        let lenient = CredentialService::from_config(&fast_config()?)?;
        let hash = lenient.hash("StrongPassword123!")?;

        let strict_config = CredentialConfig::builder()
            .with_work_factor(2u32)
            .with_memory_cost(2048u32)
            .with_min_length(24usize)
            .build()?;
        let strict = CredentialService::from_config(&strict_config)?;

        assert!(!strict.validate("StrongPassword123!").is_compliant());
        assert!(strict.verify("StrongPassword123!", &hash));
        assert!(strict.password_hasher.needs_rehash(&hash));
        Ok(())
    }

    #[tokio::test]
    async fn test_pool_uses_configured_hasher() -> anyhow::Result<()> {
        let service = CredentialService::from_config(&fast_config()?)?;
        assert_eq!(
            service.hashing_pool.max_concurrent(),
            CredentialConfig::default().max_concurrent_hashes
        );

        let hash = service.hashing_pool.hash("StrongPassword123!".to_owned()).await?;
        assert!(service.verify("StrongPassword123!", &hash));
        Ok(())
    }
}
