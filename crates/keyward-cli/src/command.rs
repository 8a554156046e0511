//! Subcommand execution.

use anyhow::Context;
use keyward_core::{CredentialService, StrengthAssessment, ValidationOutcome};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::TRACING_TARGET_COMMAND;
use crate::config::Command;

/// Exit status reported by a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The command succeeded, or the checked secret was accepted.
    Accepted,
    /// The checked secret was rejected.
    Rejected,
}

impl Status {
    fn from_accepted(accepted: bool) -> Self {
        if accepted {
            Self::Accepted
        } else {
            Self::Rejected
        }
    }

    /// Process exit code for this status.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Accepted => 0,
            Self::Rejected => 1,
        }
    }
}

/// JSON report printed by `verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Whether the secret matched the stored hash.
    pub verified: bool,
    /// Set only for a matching secret whose hash uses outdated parameters.
    pub needs_rehash: bool,
}

/// Everything a command writes to stdout, rendered by [`Output::render`].
#[derive(Debug)]
pub enum Output {
    /// Plain line: a hash, password or token.
    Text(String),
    /// Result of `verify`, printed as JSON.
    Verify(VerifyReport),
    /// Result of `validate`, printed as JSON.
    Validation(ValidationOutcome),
    /// Result of `score`, printed as JSON.
    Strength(StrengthAssessment),
}

impl Output {
    /// Renders the output as it is printed to stdout.
    pub fn render(&self) -> anyhow::Result<String> {
        let rendered = match self {
            Self::Text(text) => text.clone(),
            Self::Verify(report) => serde_json::to_string_pretty(report)?,
            Self::Validation(outcome) => serde_json::to_string_pretty(outcome)?,
            Self::Strength(assessment) => serde_json::to_string_pretty(assessment)?,
        };

        Ok(rendered)
    }
}

/// Runs `command` against `service`, reading any secret from `input`.
pub async fn execute<R>(
    service: &CredentialService,
    command: &Command,
    input: R,
) -> anyhow::Result<(Output, Status)>
where
    R: AsyncRead + Unpin,
{
    let secret = if command.reads_secret() {
        read_secret(input).await?
    } else {
        String::new()
    };

    tracing::debug!(
        target: TRACING_TARGET_COMMAND,
        command = command.name(),
        secret_length = secret.chars().count(),
        "executing command"
    );

    let result = match command {
        Command::Hash => {
            let hash = service
                .hashing_pool
                .hash(secret)
                .await
                .context("failed to hash secret")?;
            (Output::Text(hash), Status::Accepted)
        }
        Command::Verify { hash } => {
            let verified = service.hashing_pool.verify(secret, hash.clone()).await;
            let needs_rehash = verified && service.password_hasher.needs_rehash(hash);
            (
                Output::Verify(VerifyReport {
                    verified,
                    needs_rehash,
                }),
                Status::from_accepted(verified),
            )
        }
        Command::Validate => {
            let outcome = service.validate(&secret);
            let status = Status::from_accepted(outcome.is_compliant());
            (Output::Validation(outcome), status)
        }
        Command::Score { min_score } => {
            let assessment = service.score(&secret);
            let accepted = min_score.is_none_or(|min| assessment.score >= min);
            (Output::Strength(assessment), Status::from_accepted(accepted))
        }
        Command::Password { length } => {
            let password = service
                .generate_temporary_password(*length)
                .context("failed to generate temporary password")?;
            (Output::Text(password), Status::Accepted)
        }
        Command::Token { bytes } => {
            let token = service
                .generate_secure_token(*bytes)
                .context("failed to generate token")?;
            (Output::Text(token), Status::Accepted)
        }
    };

    Ok(result)
}

/// Reads the first line of `input`, without its line terminator.
async fn read_secret<R>(input: R) -> anyhow::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    BufReader::new(input)
        .read_line(&mut line)
        .await
        .context("failed to read secret from stdin")?;

    let trimmed = line
        .strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(&line);

    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use keyward_core::{CredentialConfig, PolicyRule};

    use super::*;

    fn fast_service() -> anyhow::Result<CredentialService> {
        let config = CredentialConfig::builder()
            .with_work_factor(1u32)
            .with_memory_cost(1024u32)
            .build()?;
        Ok(CredentialService::from_config(&config)?)
    }

    #[tokio::test]
    async fn test_read_secret_strips_line_ending() -> anyhow::Result<()> {
        assert_eq!(read_secret(&b"Secret1!\r\nignored"[..]).await?, "Secret1!");
        assert_eq!(read_secret(&b"Secret1!\n"[..]).await?, "Secret1!");
        assert_eq!(read_secret(&b" spaced \n"[..]).await?, " spaced ");
        assert_eq!(read_secret(&b""[..]).await?, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_hash_then_verify() -> anyhow::Result<()> {
        let service = fast_service()?;

        let (output, status) = execute(&service, &Command::Hash, &b"Secret123!\n"[..]).await?;
        assert_eq!(status, Status::Accepted);
        let Output::Text(hash) = output else {
            anyhow::bail!("hash command did not print text");
        };

        let verify = Command::Verify { hash: hash.clone() };
        let (output, status) = execute(&service, &verify, &b"Secret123!\n"[..]).await?;
        assert_eq!(status, Status::Accepted);
        assert!(matches!(
            output,
            Output::Verify(VerifyReport {
                verified: true,
                needs_rehash: false
            })
        ));

        let (_, status) = execute(&service, &verify, &b"Wrong123!\n"[..]).await?;
        assert_eq!(status, Status::Rejected);
        Ok(())
    }

    #[tokio::test]
    async fn test_hash_empty_secret_fails() -> anyhow::Result<()> {
        let service = fast_service()?;
        assert!(execute(&service, &Command::Hash, &b"\n"[..]).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_validate_reports_first_violation() -> anyhow::Result<()> {
        let service = fast_service()?;

        let (output, status) = execute(&service, &Command::Validate, &b"short\n"[..]).await?;
        assert_eq!(status, Status::Rejected);
        let Output::Validation(outcome) = &output else {
            anyhow::bail!("validate command did not print an outcome");
        };
        assert_eq!(outcome.rule(), Some(PolicyRule::MinLength));

        let rendered: serde_json::Value = serde_json::from_str(&output.render()?)?;
        assert_eq!(rendered["rule"], "min_length");
        Ok(())
    }

    #[tokio::test]
    async fn test_score_threshold() -> anyhow::Result<()> {
        let service = fast_service()?;

        let strict = Command::Score { min_score: Some(4) };
        let (_, status) = execute(&service, &strict, &b"password\n"[..]).await?;
        assert_eq!(status, Status::Rejected);

        let (_, status) = execute(&service, &strict, &b"StrongPassword123!\n"[..]).await?;
        assert_eq!(status, Status::Accepted);

        let lenient = Command::Score { min_score: None };
        let (_, status) = execute(&service, &lenient, &b"\n"[..]).await?;
        assert_eq!(status, Status::Accepted);
        Ok(())
    }

    #[tokio::test]
    async fn test_generators_ignore_input() -> anyhow::Result<()> {
        let service = fast_service()?;

        let (output, _) = execute(&service, &Command::Password { length: 16 }, &b""[..]).await?;
        assert_eq!(output.render()?.chars().count(), 16);

        let (output, _) = execute(&service, &Command::Token { bytes: 8 }, &b""[..]).await?;
        assert_eq!(output.render()?.len(), 16);

        let zero = execute(&service, &Command::Token { bytes: 0 }, &b""[..]).await;
        assert!(zero.is_err());
        Ok(())
    }
}
