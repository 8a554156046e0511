#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for password hashing and verification.
pub const TRACING_TARGET_PASSWORD_HASHER: &str = "keyward_core::password_hasher";

/// Tracing target for password policy validation.
pub const TRACING_TARGET_PASSWORD_POLICY: &str = "keyward_core::password_policy";

/// Tracing target for password strength evaluation.
pub const TRACING_TARGET_PASSWORD_STRENGTH: &str = "keyward_core::password_strength";

/// Tracing target for temporary password and token generation.
pub const TRACING_TARGET_SECURE_GENERATOR: &str = "keyward_core::secure_generator";

/// Tracing target for the bounded hashing pool.
pub const TRACING_TARGET_HASHING_POOL: &str = "keyward_core::hashing_pool";

mod config;
mod error;
mod service;

pub mod generator;
pub mod hasher;
pub mod policy;
pub mod pool;
pub mod strength;

pub use crate::config::{CredentialConfig, CredentialConfigBuilder, CredentialConfigBuilderError};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::generator::SecureGenerator;
pub use crate::hasher::{PasswordHasher, VerifyLimits};
pub use crate::policy::{
    CharClass, PolicyRule, PolicyRuleSet, PolicyValidator, PolicyViolation, ValidationOutcome,
};
pub use crate::pool::HashingPool;
pub use crate::service::CredentialService;
pub use crate::strength::{EntropyEstimate, PasswordStrength, StrengthAssessment};
