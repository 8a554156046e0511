//! Secure password hashing and verification using Argon2id.
//!
//! Hashes are emitted as PHC strings which carry the algorithm, version,
//! cost parameters and salt alongside the digest:
//!
//! ```text
//! $argon2id$v=19$m=19456,t=2,p=1$<salt>$<digest>
//! ```
//!
//! Verification reads the parameters back from the stored string, so
//! credentials keep verifying after the configured work factor changes.
//! Stored costs above the [`VerifyLimits`] are refused before Argon2 runs.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use std::sync::{Arc, OnceLock};

use argon2::{Algorithm, Argon2, Params, Version};
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::policy::PolicyValidator;
use crate::{CredentialConfig, Error, Result, TRACING_TARGET_PASSWORD_HASHER};

/// Length of the random salt generated for every hash, in bytes.
pub const SALT_LENGTH: usize = 16;

/// Factor applied to the hashing costs to derive the default [`VerifyLimits`].
pub const VERIFY_COST_MULTIPLIER: u32 = 4;

/// Secret behind the dummy hash used by [`PasswordHasher::verify_dummy`].
const DUMMY_SECRET: &str = "keyward-dummy-credential";

/// Upper bounds on the Argon2 costs accepted from a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyLimits {
    /// Highest memory cost in KiB.
    pub max_memory_cost: u32,
    /// Highest iteration count.
    pub max_work_factor: u32,
    /// Highest lane count.
    pub max_parallelism: u32,
}

impl VerifyLimits {
    /// Limits of [`VERIFY_COST_MULTIPLIER`] times each cost in `params`.
    #[must_use]
    pub fn for_params(params: &Params) -> Self {
        Self {
            max_memory_cost: params.m_cost().saturating_mul(VERIFY_COST_MULTIPLIER),
            max_work_factor: params.t_cost().saturating_mul(VERIFY_COST_MULTIPLIER),
            max_parallelism: params.p_cost().saturating_mul(VERIFY_COST_MULTIPLIER),
        }
    }

    /// Returns `true` if every cost in `params` is within the limits.
    #[must_use]
    pub fn allows(&self, params: &Params) -> bool {
        params.m_cost() <= self.max_memory_cost
            && params.t_cost() <= self.max_work_factor
            && params.p_cost() <= self.max_parallelism
    }

    /// Raises each limit to at least the matching cost in `params`.
    fn covering(self, params: &Params) -> Self {
        Self {
            max_memory_cost: self.max_memory_cost.max(params.m_cost()),
            max_work_factor: self.max_work_factor.max(params.t_cost()),
            max_parallelism: self.max_parallelism.max(params.p_cost()),
        }
    }
}

/// Argon2id password hashing service.
///
/// Cheap to clone. Clones share the dummy hash used by
/// [`verify_dummy`](Self::verify_dummy).
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    limits: VerifyLimits,
    dummy_hash: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Creates a hasher with the default Argon2id parameters.
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Creates a hasher with explicit Argon2id parameters and the default
    /// [`VerifyLimits`] for them.
    pub fn with_params(params: Params) -> Self {
        Self {
            limits: VerifyLimits::for_params(&params),
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Replaces the verification limits.
    ///
    /// Limits below the hasher's own costs are raised to them, so hashes
    /// this hasher produces always verify.
    pub fn with_limits(mut self, limits: VerifyLimits) -> Self {
        self.limits = limits.covering(self.params());
        self
    }

    /// Creates a hasher from the configured costs and verification limits.
    ///
    /// The dummy hash is computed here, so the first
    /// [`verify_dummy`](Self::verify_dummy) costs the same as later ones.
    pub fn from_config(config: &CredentialConfig) -> Result<Self> {
        let params = config.argon2_params()?;

        let mut limits = VerifyLimits::for_params(&params);
        if let Some(max_memory_cost) = config.max_verify_memory_cost {
            limits.max_memory_cost = max_memory_cost;
        }
        if let Some(max_work_factor) = config.max_verify_work_factor {
            limits.max_work_factor = max_work_factor;
        }

        let hasher = Self::with_params(params).with_limits(limits);
        hasher.dummy_hash()?;
        Ok(hasher)
    }

    /// Returns the parameters used for newly produced hashes.
    #[inline]
    #[must_use]
    pub fn params(&self) -> &Params {
        self.argon2.params()
    }

    /// Returns the limits applied to costs read from stored hashes.
    #[inline]
    #[must_use]
    pub fn limits(&self) -> &VerifyLimits {
        &self.limits
    }

    /// Hashes a secret with a freshly generated random salt.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidInput`] if `raw` is empty; Argon2 is not invoked.
    /// - [`ErrorKind::RandomSource`] if the OS cannot provide a salt.
    /// - [`ErrorKind::Internal`] if the hash primitive fails.
    ///
    /// [`ErrorKind::InvalidInput`]: crate::ErrorKind::InvalidInput
    /// [`ErrorKind::RandomSource`]: crate::ErrorKind::RandomSource
    /// [`ErrorKind::Internal`]: crate::ErrorKind::Internal
    pub fn hash(&self, raw: &str) -> Result<String> {
        PolicyValidator::require_present(raw)
            .map_err(|violation| Error::invalid_input(violation.message))?;

        let salt = Self::generate_salt()?;
        let password_hash = self
            .argon2
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    error = %e,
                    "password hashing operation failed"
                );

                Error::internal("argon2", "hash generation failed").with_source(e)
            })?;

        tracing::debug!(
            target: TRACING_TARGET_PASSWORD_HASHER,
            t_cost = self.params().t_cost(),
            m_cost = self.params().m_cost(),
            "password hashed"
        );

        Ok(password_hash.to_string())
    }

    /// Verifies a secret against a stored hash.
    ///
    /// Returns `false` for a wrong secret, an empty secret, and any stored
    /// value that is empty, not a PHC string, names an unsupported algorithm
    /// or carries costs above [`limits`](Self::limits). Callers cannot tell
    /// these cases apart.
    /// The digest comparison runs in constant time.
    #[must_use]
    pub fn verify(&self, raw: &str, hashed: &str) -> bool {
        if raw.is_empty() || hashed.is_empty() {
            return false;
        }

        let Ok(parsed_hash) = PasswordHash::new(hashed) else {
            tracing::warn!(
                target: TRACING_TARGET_PASSWORD_HASHER,
                "stored credential is not a valid PHC string"
            );
            return false;
        };

        if Algorithm::try_from(parsed_hash.algorithm).is_err() {
            tracing::warn!(
                target: TRACING_TARGET_PASSWORD_HASHER,
                algorithm = %parsed_hash.algorithm,
                "stored credential uses an unsupported algorithm"
            );
            return false;
        }

        let stored = match Params::try_from(&parsed_hash) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    error = %e,
                    "stored credential has invalid parameters"
                );
                return false;
            }
        };

        if !self.limits.allows(&stored) {
            tracing::warn!(
                target: TRACING_TARGET_PASSWORD_HASHER,
                m_cost = stored.m_cost(),
                t_cost = stored.t_cost(),
                p_cost = stored.p_cost(),
                "stored credential exceeds verification cost limits"
            );
            return false;
        }

        match self.argon2.verify_password(raw.as_bytes(), &parsed_hash) {
            Ok(()) => {
                tracing::debug!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    "password verification successful"
                );
                true
            }
            Err(argon2::password_hash::Error::Password) => {
                tracing::debug!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    "password verification failed: incorrect password provided"
                );
                false
            }
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    error = %e,
                    "password verification could not be performed"
                );
                false
            }
        }
    }

    /// Verifies `raw` against a dummy hash made with this hasher's
    /// parameters and returns `false`.
    ///
    /// Used when an account does not exist so the response takes as long as
    /// a real verification.
    pub fn verify_dummy(&self, raw: &str) -> bool {
        match self.dummy_hash() {
            Ok(dummy_hash) => {
                let _matched = self.verify(raw, dummy_hash);
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_PASSWORD_HASHER,
                    error = %error,
                    "dummy hash unavailable, skipping dummy verification"
                );
            }
        }

        false
    }

    /// Returns the dummy hash, computing it on first use.
    fn dummy_hash(&self) -> Result<&str> {
        if let Some(dummy_hash) = self.dummy_hash.get() {
            return Ok(dummy_hash.as_str());
        }

        let dummy_hash = self.hash(DUMMY_SECRET)?;
        Ok(self.dummy_hash.get_or_init(|| dummy_hash).as_str())
    }

    /// Returns `true` if a stored hash was produced with a different
    /// algorithm or different cost parameters than this hasher uses.
    ///
    /// Unparseable values also report `true`; they cannot be kept.
    #[must_use]
    pub fn needs_rehash(&self, hashed: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hashed) else {
            return true;
        };

        if !matches!(Algorithm::try_from(parsed_hash.algorithm), Ok(Algorithm::Argon2id)) {
            return true;
        }

        if parsed_hash.version != Some(Version::V0x13 as u32) {
            return true;
        }

        let Ok(stored) = Params::try_from(&parsed_hash) else {
            return true;
        };

        let current = self.params();
        stored.m_cost() != current.m_cost()
            || stored.t_cost() != current.t_cost()
            || stored.p_cost() != current.p_cost()
    }

    /// Draws a fresh salt from the operating system's random source.
    fn generate_salt() -> Result<SaltString> {
        let mut bytes = [0u8; SALT_LENGTH];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_PASSWORD_HASHER,
                error = %e,
                "failed to generate cryptographically secure salt"
            );

            Error::random_source("salt generation failed").with_source(e)
        })?;

        SaltString::encode_b64(&bytes)
            .map_err(|e| Error::internal("argon2", "salt encoding failed").with_source(e))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
