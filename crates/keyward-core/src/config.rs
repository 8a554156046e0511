//! Credential service configuration.

use std::path::PathBuf;

use argon2::Params;
#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::policy::CharClass;
use crate::{Error, Result};

/// Default values for configuration options.
mod defaults {
    use crate::policy::CharClass;

    /// Default Argon2 iteration count (`t_cost`).
    pub const WORK_FACTOR: u32 = argon2::Params::DEFAULT_T_COST;

    /// Default Argon2 memory cost in KiB (`m_cost`).
    pub const MEMORY_COST: u32 = argon2::Params::DEFAULT_M_COST;

    /// Default Argon2 lane count (`p_cost`).
    pub const PARALLELISM: u32 = argon2::Params::DEFAULT_P_COST;

    /// Default minimum password length.
    pub const MIN_LENGTH: usize = crate::policy::DEFAULT_MIN_LENGTH;

    /// Default number of hashes computed at the same time by the pool.
    pub const MAX_CONCURRENT_HASHES: usize = 4;

    pub fn work_factor() -> u32 {
        WORK_FACTOR
    }

    pub fn memory_cost() -> u32 {
        MEMORY_COST
    }

    pub fn parallelism() -> u32 {
        PARALLELISM
    }

    pub fn min_length() -> usize {
        MIN_LENGTH
    }

    pub fn max_concurrent_hashes() -> usize {
        MAX_CONCURRENT_HASHES
    }

    pub fn required_classes() -> Vec<CharClass> {
        CharClass::ALL.to_vec()
    }
}

/// Configuration shared by every credential component.
///
/// Hash parameters only affect newly produced credentials: stored hashes
/// carry their own parameters and keep verifying after a change. Policy
/// options are enforced at validation time only and never invalidate stored
/// hashes.
///
/// # Environment Variables
///
/// With the `config` feature every option can also be set from the
/// environment, e.g. `KEYWARD_WORK_FACTOR=3` or
/// `KEYWARD_REQUIRED_CLASSES=lowercase,digit`.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct CredentialConfig {
    /// Argon2 iteration count; the hash work factor.
    #[cfg_attr(
        feature = "config",
        arg(long = "work-factor", env = "KEYWARD_WORK_FACTOR", default_value_t = defaults::WORK_FACTOR)
    )]
    #[serde(default = "defaults::work_factor")]
    #[builder(default = "defaults::WORK_FACTOR")]
    pub work_factor: u32,

    /// Argon2 memory cost in KiB.
    #[cfg_attr(
        feature = "config",
        arg(long = "memory-cost", env = "KEYWARD_MEMORY_COST", default_value_t = defaults::MEMORY_COST)
    )]
    #[serde(default = "defaults::memory_cost")]
    #[builder(default = "defaults::MEMORY_COST")]
    pub memory_cost: u32,

    /// Argon2 degree of parallelism.
    #[cfg_attr(
        feature = "config",
        arg(long = "parallelism", env = "KEYWARD_PARALLELISM", default_value_t = defaults::PARALLELISM)
    )]
    #[serde(default = "defaults::parallelism")]
    #[builder(default = "defaults::PARALLELISM")]
    pub parallelism: u32,

    /// Minimum password length in characters.
    #[cfg_attr(
        feature = "config",
        arg(long = "min-length", env = "KEYWARD_MIN_LENGTH", default_value_t = defaults::MIN_LENGTH)
    )]
    #[serde(default = "defaults::min_length")]
    #[builder(default = "defaults::MIN_LENGTH")]
    pub min_length: usize,

    /// Character classes every password must contain.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "required-classes",
            env = "KEYWARD_REQUIRED_CLASSES",
            value_enum,
            value_delimiter = ',',
            default_values_t = defaults::required_classes()
        )
    )]
    #[serde(default = "defaults::required_classes")]
    #[builder(default = "defaults::required_classes()")]
    pub required_classes: Vec<CharClass>,

    /// Extra denylist entries on top of the built-in common passwords.
    #[cfg_attr(
        feature = "config",
        arg(long = "denylist", env = "KEYWARD_DENYLIST", value_delimiter = ',')
    )]
    #[serde(default)]
    #[builder(default)]
    pub denylist: Vec<String>,

    /// File with extra denylist entries, one per line.
    #[cfg_attr(
        feature = "config",
        arg(long = "denylist-path", env = "KEYWARD_DENYLIST_PATH")
    )]
    #[serde(default)]
    #[builder(default)]
    pub denylist_path: Option<PathBuf>,

    /// Maximum number of hash or verify operations running at once.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-concurrent-hashes",
            env = "KEYWARD_MAX_CONCURRENT_HASHES",
            default_value_t = defaults::MAX_CONCURRENT_HASHES
        )
    )]
    #[serde(default = "defaults::max_concurrent_hashes")]
    #[builder(default = "defaults::MAX_CONCURRENT_HASHES")]
    pub max_concurrent_hashes: usize,

    /// Highest memory cost in KiB accepted from a stored hash.
    ///
    /// Defaults to four times `memory_cost`. Stored hashes above the limit
    /// fail verification without running Argon2.
    #[cfg_attr(
        feature = "config",
        arg(long = "max-verify-memory-cost", env = "KEYWARD_MAX_VERIFY_MEMORY_COST")
    )]
    #[serde(default)]
    #[builder(default)]
    pub max_verify_memory_cost: Option<u32>,

    /// Highest iteration count accepted from a stored hash.
    ///
    /// Defaults to four times `work_factor`.
    #[cfg_attr(
        feature = "config",
        arg(long = "max-verify-work-factor", env = "KEYWARD_MAX_VERIFY_WORK_FACTOR")
    )]
    #[serde(default)]
    #[builder(default)]
    pub max_verify_work_factor: Option<u32>,
}

impl CredentialConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CredentialConfigBuilder {
        CredentialConfigBuilder::default()
    }

    /// Returns the Argon2 parameters for newly produced hashes.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if Argon2 rejects the cost combination.
    pub fn argon2_params(&self) -> Result<Params> {
        Params::new(self.memory_cost, self.work_factor, self.parallelism, None).map_err(|e| {
            Error::config(format!(
                "invalid argon2 parameters (m={}, t={}, p={})",
                self.memory_cost, self.work_factor, self.parallelism
            ))
            .with_source(e)
        })
    }
}

impl CredentialConfigBuilder {
    fn validate(builder: &CredentialConfigBuilder) -> Result<(), String> {
        if let Some(work_factor) = builder.work_factor
            && work_factor == 0
        {
            return Err("Work factor must be greater than 0".to_string());
        }

        if let Some(parallelism) = builder.parallelism
            && parallelism == 0
        {
            return Err("Parallelism must be greater than 0".to_string());
        }

        let parallelism = builder.parallelism.unwrap_or(defaults::PARALLELISM);
        if let Some(memory_cost) = builder.memory_cost
            && memory_cost < 8 * parallelism
        {
            return Err(format!(
                "Memory cost must be at least {} KiB for parallelism {parallelism}",
                8 * parallelism
            ));
        }

        if let Some(max_concurrent) = builder.max_concurrent_hashes
            && max_concurrent == 0
        {
            return Err("Max concurrent hashes must be greater than 0".to_string());
        }

        let memory_cost = builder.memory_cost.unwrap_or(defaults::MEMORY_COST);
        if let Some(Some(max_memory_cost)) = builder.max_verify_memory_cost
            && max_memory_cost < memory_cost
        {
            return Err(format!(
                "Max verify memory cost must be at least the memory cost ({memory_cost} KiB)"
            ));
        }

        let work_factor = builder.work_factor.unwrap_or(defaults::WORK_FACTOR);
        if let Some(Some(max_work_factor)) = builder.max_verify_work_factor
            && max_work_factor < work_factor
        {
            return Err(format!(
                "Max verify work factor must be at least the work factor ({work_factor})"
            ));
        }

        Ok(())
    }
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            work_factor: defaults::WORK_FACTOR,
            memory_cost: defaults::MEMORY_COST,
            parallelism: defaults::PARALLELISM,
            min_length: defaults::MIN_LENGTH,
            required_classes: defaults::required_classes(),
            denylist: Vec::new(),
            denylist_path: None,
            max_concurrent_hashes: defaults::MAX_CONCURRENT_HASHES,
            max_verify_memory_cost: None,
            max_verify_work_factor: None,
        }
    }
}
