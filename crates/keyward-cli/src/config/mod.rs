//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── credential: CredentialConfig  # Argon2 costs, policy, denylist, pool size
//! └── command: Command              # hash, verify, validate, score, password, token
//! ```
//!
//! Credential options can be given as flags before the subcommand or as
//! `KEYWARD_*` environment variables. Secrets are never accepted as
//! arguments; commands that need one read it from standard input.
//!
//! # Example
//!
//! ```bash
//! printf 'CorrectHorse9!' | keyward --work-factor 3 hash
//! KEYWARD_MIN_LENGTH=12 keyward password --length 16
//! ```

use clap::{Parser, Subcommand};
use keyward_core::CredentialConfig;
use keyward_core::generator::{DEFAULT_PASSWORD_LENGTH, DEFAULT_TOKEN_BYTES};

use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "keyward")]
#[command(about = "Password hashing, policy checks and secret generation")]
#[command(version)]
pub struct Cli {
    /// Hashing, policy and concurrency configuration.
    #[clap(flatten)]
    pub credential: CredentialConfig,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed on the command line.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Hash the secret read from stdin and print the PHC string.
    Hash,

    /// Check the secret read from stdin against a stored hash.
    ///
    /// Exits with status 1 when the secret does not match.
    Verify {
        /// Stored PHC hash string.
        #[arg(long = "hash", env = "KEYWARD_HASH")]
        hash: String,
    },

    /// Check the secret read from stdin against the password policy.
    ///
    /// Prints the outcome as JSON and exits with status 1 on a violation.
    Validate,

    /// Score the secret read from stdin and print the assessment as JSON.
    Score {
        /// Exit with status 1 when the score is below this value.
        #[arg(long = "min-score", value_parser = clap::value_parser!(u8).range(0..=4))]
        min_score: Option<u8>,
    },

    /// Generate a temporary password that satisfies the policy.
    Password {
        /// Password length in characters.
        #[arg(long = "length", short = 'l', default_value_t = DEFAULT_PASSWORD_LENGTH)]
        length: usize,
    },

    /// Generate a random hex token.
    Token {
        /// Number of random bytes; the token has twice as many characters.
        #[arg(long = "bytes", short = 'b', default_value_t = DEFAULT_TOKEN_BYTES)]
        bytes: usize,
    },
}

impl Command {
    /// Returns `true` if the command reads a secret from stdin.
    pub fn reads_secret(&self) -> bool {
        matches!(
            self,
            Self::Hash | Self::Verify { .. } | Self::Validate | Self::Score { .. }
        )
    }

    /// Short name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::Verify { .. } => "verify",
            Self::Validate => "validate",
            Self::Score { .. } => "score",
            Self::Password { .. } => "password",
            Self::Token { .. } => "token",
        }
    }
}

/// Logs the effective credential configuration.
pub fn log_credential_config(config: &CredentialConfig) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        work_factor = config.work_factor,
        memory_cost = config.memory_cost,
        parallelism = config.parallelism,
        min_length = config.min_length,
        required_classes = ?config.required_classes,
        denylist_entries = config.denylist.len(),
        denylist_path = ?config.denylist_path,
        max_concurrent_hashes = config.max_concurrent_hashes,
        max_verify_memory_cost = ?config.max_verify_memory_cost,
        max_verify_work_factor = ?config.max_verify_work_factor,
        "credential configuration"
    );
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_password_with_defaults() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["keyward", "password"])?;
        assert!(matches!(
            cli.command,
            Command::Password { length } if length == DEFAULT_PASSWORD_LENGTH
        ));
        assert!(!cli.command.reads_secret());
        Ok(())
    }

    #[test]
    fn test_parse_credential_flags() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "keyward",
            "--work-factor",
            "3",
            "--min-length",
            "12",
            "--required-classes",
            "lowercase,digit",
            "token",
            "--bytes",
            "16",
        ])?;

        assert_eq!(cli.credential.work_factor, 3);
        assert_eq!(cli.credential.min_length, 12);
        assert_eq!(
            cli.credential.required_classes,
            vec![keyward_core::CharClass::Lowercase, keyward_core::CharClass::Digit]
        );
        assert!(matches!(cli.command, Command::Token { bytes: 16 }));
        Ok(())
    }

    #[test]
    fn test_verify_requires_hash() {
        assert!(Cli::try_parse_from(["keyward", "verify"]).is_err());
    }

    #[test]
    fn test_min_score_out_of_range() {
        assert!(Cli::try_parse_from(["keyward", "score", "--min-score", "5"]).is_err());
    }
}
